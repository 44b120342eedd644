use crate::calc::time_calc::compute_daily_work;
use crate::data::WorkRecord;
use chrono::{Months, NaiveDate};
use serde::Serialize;

/// Totals for one calendar month of one employee's records.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub yyyy_mm: String,
    /// Every record of the month in date order, day-off records included.
    pub rows: Vec<WorkRecord>,
    pub total_work: i64,
    pub total_break: i64,
    /// Days with a resolvable work total.
    pub work_days: u32,
    /// Days with a check-in or check-out but no resolvable total.
    pub incomplete_days: u32,
}

impl MonthlySummary {
    /// Mean work minutes over complete days, rounded; 0 without any.
    pub fn average_work(&self) -> i64 {
        if self.work_days == 0 {
            return 0;
        }
        (self.total_work as f64 / f64::from(self.work_days)).round() as i64
    }
}

/// Folds the records whose date starts with `yyyy_mm` into month totals.
///
/// The month match is a plain text prefix. Day-off records (`note == "OFF"`)
/// are kept in `rows` but add nothing to the totals or day counts.
pub fn summarize_month(records: &[WorkRecord], yyyy_mm: &str) -> MonthlySummary {
    let mut rows: Vec<WorkRecord> = records
        .iter()
        .filter(|r| r.date.starts_with(yyyy_mm))
        .cloned()
        .collect();
    rows.sort_by(|a, b| a.date.cmp(&b.date));

    let mut total_work: i64 = 0;
    let mut total_break: i64 = 0;
    let mut work_days = 0;
    let mut incomplete_days = 0;

    for r in rows.iter().filter(|r| !r.is_day_off()) {
        let daily = compute_daily_work(r);
        total_break = total_break.saturating_add(daily.break_minutes);
        match daily.work_minutes {
            Some(work) => {
                total_work = total_work.saturating_add(work);
                work_days += 1;
            }
            None if r.has_check_in() || r.has_check_out() => incomplete_days += 1,
            None => {}
        }
    }

    MonthlySummary {
        yyyy_mm: yyyy_mm.to_string(),
        rows,
        total_work,
        total_break,
        work_days,
        incomplete_days,
    }
}

/// Day-off records in the month, counted with the same prefix match.
pub fn count_holidays(records: &[WorkRecord], yyyy_mm: &str) -> u32 {
    records
        .iter()
        .filter(|r| r.date.starts_with(yyyy_mm) && r.is_day_off())
        .count() as u32
}

/// First day of a strict `YYYY-MM` month.
pub fn first_of_month(yyyy_mm: &str) -> Option<NaiveDate> {
    let bytes = yyyy_mm.as_bytes();
    if bytes.len() != 7 || bytes[4] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(&format!("{yyyy_mm}-01"), "%Y-%m-%d").ok()
}

pub fn next_month_start(first: NaiveDate) -> Option<NaiveDate> {
    first.checked_add_months(Months::new(1))
}

/// Every date of the month, or `None` for a malformed month.
pub fn month_days(yyyy_mm: &str) -> Option<Vec<NaiveDate>> {
    let first = first_of_month(yyyy_mm)?;
    let end = next_month_start(first)?;
    Some(first.iter_days().take_while(|d| *d < end).collect())
}
