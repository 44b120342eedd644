pub mod app_settings;
pub mod persistence;
pub mod staff;
pub mod work_record;

pub use app_settings::{load_staff, AppSettings};
pub use persistence::Persistable;
pub use staff::{active_staff, StaffMember};
pub use work_record::{
    retention_start, WorkRecord, WorkRecordData, DEFAULT_EMPLOYEE_ID, HOLIDAY_NOTE,
};
