//! Printable month sheets and admin roll-ups built on the daily arithmetic.

use crate::calc::monthly::{count_holidays, month_days, summarize_month};
use crate::calc::time_calc::compute_daily_work;
use crate::calc::work_status::{classify_day_status, WorkStatus};
use crate::data::WorkRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

pub const STANDARD_WORK_MINUTES: i64 = 8 * 60;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    Holiday,
    Empty,
    Incomplete,
    Complete,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ReportRow {
    pub date: NaiveDate,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub break_minutes: i64,
    pub work_minutes: Option<i64>,
    pub overtime_minutes: Option<i64>,
    pub early_leave_minutes: Option<i64>,
    pub kind: DayKind,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportTotals {
    /// Days with any clock time.
    pub work_days: u32,
    pub incomplete_days: u32,
    pub holiday_days: u32,
    pub total_work: i64,
    pub total_break: i64,
    pub total_overtime: i64,
    pub total_early_leave: i64,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct MonthReport {
    pub yyyy_mm: String,
    pub standard_minutes: i64,
    pub rows: Vec<ReportRow>,
    pub totals: ReportTotals,
}

fn report_row(date: NaiveDate, record: Option<&WorkRecord>, standard_minutes: i64) -> ReportRow {
    let Some(r) = record.filter(|r| !r.is_day_off()) else {
        let kind = if record.is_some() {
            DayKind::Holiday
        } else {
            DayKind::Empty
        };
        return ReportRow {
            date,
            check_in: None,
            check_out: None,
            break_minutes: 0,
            work_minutes: None,
            overtime_minutes: None,
            early_leave_minutes: None,
            kind,
        };
    };

    let daily = compute_daily_work(r);
    let kind = match daily.work_minutes {
        Some(_) => DayKind::Complete,
        None if r.has_check_in() || r.has_check_out() => DayKind::Incomplete,
        None => DayKind::Empty,
    };

    ReportRow {
        date,
        check_in: r.check_in.clone().filter(|s| !s.is_empty()),
        check_out: r.check_out.clone().filter(|s| !s.is_empty()),
        break_minutes: daily.break_minutes,
        work_minutes: daily.work_minutes,
        overtime_minutes: daily.work_minutes.map(|w| (w - standard_minutes).max(0)),
        early_leave_minutes: daily.work_minutes.map(|w| (standard_minutes - w).max(0)),
        kind,
    }
}

/// One row per calendar day of `yyyy_mm` for `employee_id`, with overtime and
/// early leave measured against `standard_minutes`. Records owned by anyone
/// else are ignored. `None` for a malformed month.
pub fn build_month_report(
    records: &[WorkRecord],
    employee_id: &str,
    yyyy_mm: &str,
    standard_minutes: i64,
) -> Option<MonthReport> {
    let days = month_days(yyyy_mm)?;
    let by_date: HashMap<&str, &WorkRecord> = records
        .iter()
        .filter(|r| r.owner() == employee_id)
        .map(|r| (r.date.as_str(), r))
        .collect();

    let rows: Vec<ReportRow> = days
        .into_iter()
        .map(|date| {
            let key = date.format("%Y-%m-%d").to_string();
            report_row(date, by_date.get(key.as_str()).copied(), standard_minutes)
        })
        .collect();

    let mut totals = ReportTotals::default();
    for row in &rows {
        if row.kind == DayKind::Holiday {
            totals.holiday_days += 1;
            continue;
        }
        if row.check_in.is_some() || row.check_out.is_some() {
            totals.work_days += 1;
        }
        if row.kind == DayKind::Incomplete {
            totals.incomplete_days += 1;
        }
        totals.total_work = totals.total_work.saturating_add(row.work_minutes.unwrap_or(0));
        totals.total_break = totals.total_break.saturating_add(row.break_minutes);
        totals.total_overtime = totals
            .total_overtime
            .saturating_add(row.overtime_minutes.unwrap_or(0));
        totals.total_early_leave = totals
            .total_early_leave
            .saturating_add(row.early_leave_minutes.unwrap_or(0));
    }

    Some(MonthReport {
        yyyy_mm: yyyy_mm.to_string(),
        standard_minutes,
        rows,
        totals,
    })
}

/// Staff counted per status for one date of the admin calendar.
#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct DayHeadcount {
    pub holiday: u32,
    pub working: u32,
    pub off: u32,
    pub incomplete: u32,
    pub no_record: u32,
}

impl DayHeadcount {
    fn add(&mut self, status: WorkStatus) {
        match status {
            WorkStatus::Holiday => self.holiday += 1,
            WorkStatus::Working => self.working += 1,
            WorkStatus::Off => self.off += 1,
            WorkStatus::Incomplete => self.incomplete += 1,
            WorkStatus::NoRecord => self.no_record += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.holiday + self.working + self.off + self.incomplete + self.no_record
    }
}

/// Classifies every record on `date`; staff without a record count as
/// `no_record` up to `staff_count`.
pub fn day_headcount(
    records: &[WorkRecord],
    date: NaiveDate,
    staff_count: u32,
    today: NaiveDate,
) -> DayHeadcount {
    let key = date.format("%Y-%m-%d").to_string();
    let mut counts = DayHeadcount::default();
    for r in records.iter().filter(|r| r.date == key) {
        counts.add(classify_day_status(Some(r), today));
    }
    let counted = counts.total();
    if counted < staff_count {
        counts.no_record += staff_count - counted;
    }
    counts
}

/// One line of the admin month roster.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct RosterRow {
    pub employee_id: String,
    /// Non-holiday records in the month.
    pub days: u32,
    pub completed_days: u32,
    pub incomplete_days: u32,
    pub holiday_days: u32,
    pub total_work: i64,
    pub total_break: i64,
    pub average_work: i64,
}

/// `own` must already be limited to `employee_id`'s records.
pub fn roster_row(employee_id: &str, own: &[WorkRecord], yyyy_mm: &str) -> RosterRow {
    let summary = summarize_month(own, yyyy_mm);
    RosterRow {
        employee_id: employee_id.to_string(),
        days: summary.rows.iter().filter(|r| !r.is_day_off()).count() as u32,
        completed_days: summary.work_days,
        incomplete_days: summary.incomplete_days,
        holiday_days: count_holidays(own, yyyy_mm),
        total_work: summary.total_work,
        total_break: summary.total_break,
        average_work: summary.average_work(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample() -> Vec<WorkRecord> {
        vec![
            // 9h span - 1h break = 8h: no overtime, no early leave
            WorkRecord::new("2025-02-03")
                .with_check_in("09:00")
                .with_check_out("18:00")
                .with_break(60),
            // 10h net: 2h overtime
            WorkRecord::new("2025-02-04")
                .with_check_in("08:00")
                .with_check_out("18:30")
                .with_break(30),
            // 6h net: 2h early leave
            WorkRecord::new("2025-02-05")
                .with_check_in("09:00")
                .with_check_out("15:00"),
            WorkRecord::new("2025-02-06").with_check_in("09:00").with_break(45),
            WorkRecord::new("2025-02-07").with_note("OFF"),
        ]
    }

    #[test]
    fn test_malformed_month_has_no_report() {
        assert!(build_month_report(&sample(), "admin", "2025/02", STANDARD_WORK_MINUTES).is_none());
    }

    #[test]
    fn test_report_has_a_row_per_day() {
        let report = build_month_report(&sample(), "admin", "2025-02", STANDARD_WORK_MINUTES).unwrap();
        assert_eq!(report.rows.len(), 28);
        assert_eq!(report.rows[0].date, d(2025, 2, 1));
        assert_eq!(report.rows[0].kind, DayKind::Empty);
    }

    #[test]
    fn test_report_row_kinds_and_overtime() {
        let report = build_month_report(&sample(), "admin", "2025-02", STANDARD_WORK_MINUTES).unwrap();
        let row = |day: u32| &report.rows[day as usize - 1];

        assert_eq!(row(3).kind, DayKind::Complete);
        assert_eq!(row(3).overtime_minutes, Some(0));
        assert_eq!(row(3).early_leave_minutes, Some(0));

        assert_eq!(row(4).work_minutes, Some(600));
        assert_eq!(row(4).overtime_minutes, Some(120));

        assert_eq!(row(5).early_leave_minutes, Some(120));

        assert_eq!(row(6).kind, DayKind::Incomplete);
        assert_eq!(row(6).overtime_minutes, None);
        assert_eq!(row(6).break_minutes, 45);

        assert_eq!(row(7).kind, DayKind::Holiday);
        assert_eq!(row(7).break_minutes, 0);
    }

    #[test]
    fn test_report_totals() {
        let report = build_month_report(&sample(), "admin", "2025-02", STANDARD_WORK_MINUTES).unwrap();
        let t = &report.totals;
        assert_eq!(t.work_days, 4);
        assert_eq!(t.incomplete_days, 1);
        assert_eq!(t.holiday_days, 1);
        assert_eq!(t.total_work, 480 + 600 + 360);
        assert_eq!(t.total_break, 60 + 30 + 45);
        assert_eq!(t.total_overtime, 120);
        assert_eq!(t.total_early_leave, 120);
    }

    #[test]
    fn test_custom_standard_day() {
        let report = build_month_report(&sample(), "admin", "2025-02", 360).unwrap();
        assert_eq!(report.rows[4].overtime_minutes, Some(0));
        assert_eq!(report.rows[4].early_leave_minutes, Some(0));
        assert_eq!(report.totals.total_overtime, 120 + 240);
    }

    #[test]
    fn test_day_headcount_fills_missing_staff() {
        let records = vec![
            WorkRecord::new("2025-02-03").with_employee("a").with_note("OFF"),
            WorkRecord::new("2025-02-03")
                .with_employee("b")
                .with_check_in("09:00")
                .with_check_out("17:00"),
            WorkRecord::new("2025-02-03").with_employee("c").with_check_in("09:00"),
            WorkRecord::new("2025-02-04").with_employee("a").with_check_in("09:00"),
        ];
        let counts = day_headcount(&records, d(2025, 2, 3), 5, d(2025, 2, 10));
        assert_eq!(
            counts,
            DayHeadcount {
                holiday: 1,
                working: 0,
                off: 1,
                incomplete: 1,
                no_record: 2,
            }
        );
        assert_eq!(counts.total(), 5);
    }

    #[test]
    fn test_day_headcount_today_open_shift_is_working() {
        let records = vec![WorkRecord::new("2025-02-03").with_employee("c").with_check_in("09:00")];
        let counts = day_headcount(&records, d(2025, 2, 3), 1, d(2025, 2, 3));
        assert_eq!(counts.working, 1);
        assert_eq!(counts.no_record, 0);
    }

    #[test]
    fn test_report_ignores_other_owners_on_the_same_date() {
        let records = vec![
            WorkRecord::new("2025-02-03")
                .with_employee("a")
                .with_check_in("09:00")
                .with_check_out("17:00"),
            WorkRecord::new("2025-02-03").with_employee("b").with_note("OFF"),
        ];
        let report = build_month_report(&records, "a", "2025-02", STANDARD_WORK_MINUTES).unwrap();
        assert_eq!(report.rows[2].kind, DayKind::Complete);
        assert_eq!(report.rows[2].work_minutes, Some(480));
        assert_eq!(report.totals.holiday_days, 0);

        let report = build_month_report(&records, "b", "2025-02", STANDARD_WORK_MINUTES).unwrap();
        assert_eq!(report.rows[2].kind, DayKind::Holiday);
        assert_eq!(report.totals.total_work, 0);
    }

    #[test]
    fn test_report_totals_saturate_on_huge_breaks() {
        let records = vec![
            WorkRecord::new("2025-02-03").with_check_in("09:00").with_break(i64::MAX / 2 + 1),
            WorkRecord::new("2025-02-04").with_check_in("09:00").with_break(i64::MAX / 2 + 1),
        ];
        let report = build_month_report(&records, "admin", "2025-02", STANDARD_WORK_MINUTES).unwrap();
        assert_eq!(report.totals.total_break, i64::MAX);
        assert_eq!(report.totals.incomplete_days, 2);
    }

    #[test]
    fn test_roster_row() {
        let row = roster_row("admin", &sample(), "2025-02");
        assert_eq!(row.days, 4);
        assert_eq!(row.completed_days, 3);
        assert_eq!(row.incomplete_days, 1);
        assert_eq!(row.holiday_days, 1);
        assert_eq!(row.total_work, 1440);
        assert_eq!(row.average_work, 480);
    }
}
