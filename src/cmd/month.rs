use crate::calc::{
    classify_day_status, compute_daily_work, count_holidays, format_minutes_as_clock,
    format_optional_minutes, summarize_month, MonthlySummary,
};
use crate::data::{retention_start, AppSettings, Persistable, WorkRecordData};
use anyhow::Result;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::debug;

/// `--json` output: the summary plus the day-off count.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MonthJson<'a> {
    #[serde(flatten)]
    summary: &'a MonthlySummary,
    holiday_days: u32,
    average_work: i64,
}

pub fn run(employee: &str, yyyy_mm: &str, json: bool, settings: &AppSettings) -> Result<()> {
    let data = WorkRecordData::load()?;
    let today = Local::now().date_naive();
    let retention = retention_start(today, settings.retention_days);
    let records = data.list_by_month(employee, yyyy_mm, retention);
    debug!(employee, yyyy_mm, count = records.len(), "month records loaded");

    let summary = summarize_month(&records, yyyy_mm);
    let holidays = count_holidays(&records, yyyy_mm);
    let mut out = std::io::stdout();
    if json {
        write_month_json(&summary, holidays, &mut out)
    } else {
        write_month(employee, &summary, holidays, today, &mut out)
    }
}

pub(crate) fn write_month_json<W: std::io::Write>(
    summary: &MonthlySummary,
    holidays: u32,
    out: &mut W,
) -> Result<()> {
    let doc = MonthJson {
        summary,
        holiday_days: holidays,
        average_work: summary.average_work(),
    };
    serde_json::to_writer_pretty(&mut *out, &doc)?;
    writeln!(out)?;
    Ok(())
}

pub(crate) fn write_month<W: std::io::Write>(
    employee: &str,
    summary: &MonthlySummary,
    holidays: u32,
    today: NaiveDate,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Attendance for {} in {}", employee, summary.yyyy_mm)?;
    writeln!(out, "---")?;
    if summary.rows.is_empty() {
        writeln!(out, "No records.")?;
    } else {
        writeln!(
            out,
            "{:<12} {:<6} {:<6} {:<6} {:<6} {}",
            "Date", "In", "Out", "Break", "Work", "Status"
        )?;
        for r in &summary.rows {
            let status = classify_day_status(Some(r), today);
            if r.is_day_off() {
                writeln!(out, "{:<12} {:<6} {:<6} {:<6} {:<6} {}", r.date, "", "", "", "", status.label())?;
                continue;
            }
            let daily = compute_daily_work(r);
            writeln!(
                out,
                "{:<12} {:<6} {:<6} {:<6} {:<6} {}",
                r.date,
                r.check_in.as_deref().unwrap_or("--:--"),
                r.check_out.as_deref().unwrap_or("--:--"),
                format_minutes_as_clock(daily.break_minutes),
                format_optional_minutes(daily.work_minutes),
                status.label()
            )?;
        }
    }
    writeln!(out, "---")?;
    writeln!(out, "{:<18} {}", "Total Work:", format_minutes_as_clock(summary.total_work))?;
    writeln!(out, "{:<18} {}", "Total Break:", format_minutes_as_clock(summary.total_break))?;
    writeln!(out, "{:<18} {}", "Work Days:", summary.work_days)?;
    writeln!(out, "{:<18} {}", "Incomplete Days:", summary.incomplete_days)?;
    writeln!(out, "{:<18} {}", "Days Off:", holidays)?;
    writeln!(out, "{:<18} {}", "Average Day:", format_minutes_as_clock(summary.average_work()))?;
    Ok(())
}
