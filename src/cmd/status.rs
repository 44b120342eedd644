use crate::calc::{compute_daily_work, format_optional_minutes, today_status, TodayStatus};
use crate::data::{Persistable, WorkRecord, WorkRecordData};
use anyhow::Result;
use chrono::{Local, NaiveDate};

pub fn run(employee: &str) -> Result<()> {
    let data = WorkRecordData::load()?;
    let today = Local::now().date_naive();
    let status = today_status(&data.records, employee, today);
    let key = today.format("%Y-%m-%d").to_string();
    write_status(
        employee,
        today,
        &status,
        data.get(&key, employee),
        &mut std::io::stdout(),
    )
}

pub(crate) fn write_status<W: std::io::Write>(
    employee: &str,
    today: NaiveDate,
    status: &TodayStatus,
    record: Option<&WorkRecord>,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "{} on {}", employee, today.format("%Y-%m-%d (%a)"))?;
    writeln!(out, "---")?;
    writeln!(out, "{:<12} {}", "Status:", status.status.label())?;
    if let Some(detail) = &status.detail {
        writeln!(out, "{:<12} {} at {}", "", detail.label(), detail.time())?;
    }
    if let Some(r) = record.filter(|r| !r.is_day_off()) {
        let daily = compute_daily_work(r);
        writeln!(out, "{:<12} {}", "Break:", format_optional_minutes(Some(daily.break_minutes)))?;
        writeln!(out, "{:<12} {}", "Worked:", format_optional_minutes(daily.work_minutes))?;
    }
    Ok(())
}
