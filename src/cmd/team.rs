//! Admin views across the active staff directory.

use crate::calc::{
    classify_day_status, day_headcount, format_minutes_as_clock, roster_row, DayHeadcount,
    RosterRow, WorkStatus,
};
use crate::data::{active_staff, load_staff, Persistable, StaffMember, WorkRecord, WorkRecordData};
use anyhow::Result;
use chrono::{Local, NaiveDate};

/// One staff member's line in the day view.
pub(crate) struct TeamLine {
    pub employee_id: String,
    pub name: String,
    pub status: WorkStatus,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
}

/// Active directory members, or every record owner when no directory is configured.
fn roll(data: &WorkRecordData) -> Result<Vec<StaffMember>> {
    Ok(active_staff(&load_staff()?, &data.employees()))
}

pub(crate) fn team_lines(
    data: &WorkRecordData,
    staff: &[StaffMember],
    date: NaiveDate,
    today: NaiveDate,
) -> Vec<TeamLine> {
    let key = date.format("%Y-%m-%d").to_string();
    staff
        .iter()
        .map(|member| {
            let record = data.get(&key, &member.id);
            TeamLine {
                employee_id: member.id.clone(),
                name: member.label().to_string(),
                status: classify_day_status(record, today),
                check_in: record.and_then(|r| r.check_in.clone()),
                check_out: record.and_then(|r| r.check_out.clone()),
            }
        })
        .collect()
}

/// Headcount for `date` over `staff` only; members without a record count as `no_record`.
pub(crate) fn team_headcount(
    data: &WorkRecordData,
    staff: &[StaffMember],
    date: NaiveDate,
    today: NaiveDate,
) -> DayHeadcount {
    let on_day: Vec<WorkRecord> = data
        .records_on(&date.format("%Y-%m-%d").to_string())
        .into_iter()
        .filter(|r| staff.iter().any(|m| m.id == r.owner()))
        .collect();
    day_headcount(&on_day, date, staff.len() as u32, today)
}

pub fn run_day(date: NaiveDate) -> Result<()> {
    let data = WorkRecordData::load()?;
    let staff = roll(&data)?;
    let today = Local::now().date_naive();
    let lines = team_lines(&data, &staff, date, today);
    let counts = team_headcount(&data, &staff, date, today);
    write_day(date, &lines, &counts, &mut std::io::stdout())
}

pub(crate) fn write_day<W: std::io::Write>(
    date: NaiveDate,
    lines: &[TeamLine],
    counts: &DayHeadcount,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Team for {}", date.format("%Y-%m-%d (%a)"))?;
    writeln!(out, "---")?;
    for line in lines {
        let flag = if line.status.needs_attention() { " !" } else { "" };
        writeln!(
            out,
            "{:<16} {:<6} {:<6} {}{}",
            line.name,
            line.check_in.as_deref().unwrap_or("--:--"),
            line.check_out.as_deref().unwrap_or("--:--"),
            line.status.label(),
            flag
        )?;
    }
    writeln!(out, "---")?;
    writeln!(out, "{:<14} {}", "Working:", counts.working)?;
    writeln!(out, "{:<14} {}", "Done:", counts.off)?;
    writeln!(out, "{:<14} {}", "Incomplete:", counts.incomplete)?;
    writeln!(out, "{:<14} {}", "Day off:", counts.holiday)?;
    writeln!(out, "{:<14} {}", "No record:", counts.no_record)?;
    Ok(())
}

pub fn run_roster(yyyy_mm: &str) -> Result<()> {
    let data = WorkRecordData::load()?;
    let rows = roster_rows(&data, &roll(&data)?, yyyy_mm);
    write_roster(yyyy_mm, &rows, &mut std::io::stdout())
}

pub(crate) fn roster_rows(
    data: &WorkRecordData,
    staff: &[StaffMember],
    yyyy_mm: &str,
) -> Vec<RosterRow> {
    staff
        .iter()
        .map(|m| roster_row(&m.id, &data.list_by_employee(&m.id), yyyy_mm))
        .collect()
}

pub(crate) fn write_roster<W: std::io::Write>(
    yyyy_mm: &str,
    rows: &[RosterRow],
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Roster for {}", yyyy_mm)?;
    writeln!(out, "---")?;
    if rows.is_empty() {
        writeln!(out, "No staff records.")?;
        return Ok(());
    }
    writeln!(
        out,
        "{:<16} {:>5} {:>5} {:>5} {:>5} {:>8} {:>7}",
        "Staff", "Days", "Done", "Open", "Off", "Work", "Avg"
    )?;
    for r in rows {
        writeln!(
            out,
            "{:<16} {:>5} {:>5} {:>5} {:>5} {:>8} {:>7}",
            r.employee_id,
            r.days,
            r.completed_days,
            r.incomplete_days,
            r.holiday_days,
            format_minutes_as_clock(r.total_work),
            format_minutes_as_clock(r.average_work)
        )?;
    }
    Ok(())
}
