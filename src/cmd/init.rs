use crate::data::{
    AppSettings, Persistable, StaffMember, WorkRecord, WorkRecordData, DEFAULT_EMPLOYEE_ID,
};
use anyhow::Result;
use std::fs;
use std::path::Path;
use tracing::info;

pub fn run() -> Result<()> {
    let dir = crate::data::persistence::get_data_dir()?;
    fs::create_dir_all(&dir)?;
    run_in_dir(&dir)?;
    info!(dir = %dir.display(), "data directory initialized");
    println!("Data files initialized successfully.");
    Ok(())
}

/// Writes config.yaml and a sample record file into `dir`.
pub(crate) fn run_in_dir(dir: &Path) -> Result<()> {
    AppSettings::default().save_to(dir, &sample_staff())?;
    sample_records().save_to(dir)?;
    Ok(())
}

fn sample_staff() -> Vec<StaffMember> {
    vec![
        StaffMember::new(DEFAULT_EMPLOYEE_ID).with_name("Administrator"),
        StaffMember::new("staff-01").with_name("Night Shift").with_sort_order(1),
        StaffMember::new("staff-02").with_sort_order(2),
    ]
}

fn sample_records() -> WorkRecordData {
    let mut data = WorkRecordData::default();
    let admin = DEFAULT_EMPLOYEE_ID;
    data.upsert(
        WorkRecord::new("2025-01-06")
            .with_employee(admin)
            .with_check_in("09:00")
            .with_check_out("18:00")
            .with_break(60),
    );
    data.upsert(
        WorkRecord::new("2025-01-07")
            .with_employee(admin)
            .with_check_in("08:45")
            .with_check_out("17:30")
            .with_break(45),
    );
    data.mark_day_off("2025-01-08", admin);
    data.upsert(
        WorkRecord::new("2025-01-06")
            .with_employee("staff-01")
            .with_check_in("22:00")
            .with_check_out("06:00")
            .with_break(30),
    );
    data.upsert(WorkRecord::new("2025-01-07").with_employee("staff-01").with_check_in("22:10"));
    data
}
