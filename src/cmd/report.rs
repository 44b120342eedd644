use crate::calc::report::DayKind;
use crate::calc::{build_month_report, format_minutes_as_clock, format_optional_minutes, MonthReport};
use crate::data::{retention_start, AppSettings, Persistable, WorkRecordData};
use anyhow::{bail, Result};
use chrono::Local;

pub fn run(employee: &str, yyyy_mm: &str, settings: &AppSettings) -> Result<()> {
    let data = WorkRecordData::load()?;
    let retention = retention_start(Local::now().date_naive(), settings.retention_days);
    let records = data.list_by_month(employee, yyyy_mm, retention);

    let report = match build_month_report(&records, employee, yyyy_mm, settings.standard_work_minutes) {
        Some(r) => r,
        None => bail!("invalid month '{}', expected YYYY-MM", yyyy_mm),
    };

    write_report(employee, &report, &mut std::io::stdout())
}

fn kind_label(kind: DayKind) -> &'static str {
    match kind {
        DayKind::Holiday => "day off",
        DayKind::Empty => "",
        DayKind::Incomplete => "missing time",
        DayKind::Complete => "",
    }
}

fn or_blank(minutes: Option<i64>) -> String {
    match minutes {
        Some(0) | None => String::new(),
        Some(m) => format_minutes_as_clock(m),
    }
}

pub(crate) fn write_report<W: std::io::Write>(
    employee: &str,
    report: &MonthReport,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Monthly Report: {} / {}", employee, report.yyyy_mm)?;
    writeln!(
        out,
        "Standard day: {}",
        format_minutes_as_clock(report.standard_minutes)
    )?;
    writeln!(out, "---")?;
    writeln!(
        out,
        "{:<16} {:<6} {:<6} {:<6} {:<6} {:<6} {:<6} {}",
        "Date", "In", "Out", "Break", "Work", "Over", "Early", "Note"
    )?;
    for row in &report.rows {
        let (work, brk) = match row.kind {
            DayKind::Holiday | DayKind::Empty => (String::new(), String::new()),
            _ => (
                format_optional_minutes(row.work_minutes),
                format_minutes_as_clock(row.break_minutes),
            ),
        };
        let line = format!(
            "{:<16} {:<6} {:<6} {:<6} {:<6} {:<6} {:<6} {}",
            row.date.format("%Y-%m-%d %a"),
            row.check_in.as_deref().unwrap_or(""),
            row.check_out.as_deref().unwrap_or(""),
            brk,
            work,
            or_blank(row.overtime_minutes),
            or_blank(row.early_leave_minutes),
            kind_label(row.kind)
        );
        writeln!(out, "{}", line.trim_end())?;
    }

    let t = &report.totals;
    writeln!(out, "---")?;
    writeln!(out, "{:<22} {}", "Days Worked:", t.work_days)?;
    writeln!(out, "{:<22} {}", "Incomplete Days:", t.incomplete_days)?;
    writeln!(out, "{:<22} {}", "Days Off:", t.holiday_days)?;
    writeln!(out, "{:<22} {}", "Total Work:", format_minutes_as_clock(t.total_work))?;
    writeln!(out, "{:<22} {}", "Total Break:", format_minutes_as_clock(t.total_break))?;
    writeln!(out, "{:<22} {}", "Total Overtime:", format_minutes_as_clock(t.total_overtime))?;
    writeln!(out, "{:<22} {}", "Total Early Leave:", format_minutes_as_clock(t.total_early_leave))?;
    Ok(())
}
