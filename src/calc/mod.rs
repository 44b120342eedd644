pub mod monthly;
pub mod report;
pub mod time_calc;
pub mod work_status;

pub use monthly::{count_holidays, summarize_month, MonthlySummary};
pub use report::{build_month_report, day_headcount, roster_row, DayHeadcount, MonthReport, RosterRow};
pub use time_calc::{compute_daily_work, format_minutes_as_clock, format_optional_minutes};
pub use work_status::{classify_day_status, today_status, TodayStatus, WorkStatus};
