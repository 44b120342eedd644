use crate::data::{WorkRecord, HOLIDAY_NOTE};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Attendance state of one staff member on one day.
///
/// `Off` means off the clock with the shift fully recorded; a day off is
/// `Holiday`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    Holiday,
    Working,
    Off,
    Incomplete,
    NoRecord,
}

impl WorkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkStatus::Holiday => "holiday",
            WorkStatus::Working => "working",
            WorkStatus::Off => "off",
            WorkStatus::Incomplete => "incomplete",
            WorkStatus::NoRecord => "no_record",
        }
    }

    /// Display label shared by every view.
    pub fn label(&self) -> &'static str {
        match self {
            WorkStatus::Holiday => "Day off",
            WorkStatus::Working => "Working",
            WorkStatus::Off => "Done",
            WorkStatus::Incomplete => "Incomplete",
            WorkStatus::NoRecord => "No record",
        }
    }

    /// Flagged for admin follow-up.
    pub fn needs_attention(&self) -> bool {
        matches!(self, WorkStatus::Incomplete)
    }
}

impl fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lenient sentinel check: surrounding whitespace and case are ignored.
pub fn is_holiday_note(note: Option<&str>) -> bool {
    note.is_some_and(|n| n.trim().to_uppercase() == HOLIDAY_NOTE)
}

/// Classifies a day. `today` decides whether an open shift is still running
/// or was left dangling.
pub fn classify_day_status(record: Option<&WorkRecord>, today: NaiveDate) -> WorkStatus {
    let Some(record) = record else {
        return WorkStatus::NoRecord;
    };
    if is_holiday_note(record.note.as_deref()) {
        return WorkStatus::Holiday;
    }

    match (record.has_check_in(), record.has_check_out()) {
        (true, true) => WorkStatus::Off,
        (true, false) => {
            if record.date == today.format("%Y-%m-%d").to_string() {
                WorkStatus::Working
            } else {
                WorkStatus::Incomplete
            }
        }
        (false, true) => WorkStatus::Incomplete,
        (false, false) => WorkStatus::NoRecord,
    }
}

/// The clock event that explains a status.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", content = "time", rename_all = "snake_case")]
pub enum StatusDetail {
    CheckIn(String),
    CheckOut(String),
}

impl StatusDetail {
    pub fn time(&self) -> &str {
        match self {
            StatusDetail::CheckIn(t) | StatusDetail::CheckOut(t) => t,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusDetail::CheckIn(_) => "checked in",
            StatusDetail::CheckOut(_) => "checked out",
        }
    }
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct TodayStatus {
    pub status: WorkStatus,
    pub detail: Option<StatusDetail>,
}

/// Today's status for one employee out of a mixed record list.
pub fn today_status(records: &[WorkRecord], employee_id: &str, today: NaiveDate) -> TodayStatus {
    let key = today.format("%Y-%m-%d").to_string();
    let record = records
        .iter()
        .find(|r| r.date == key && r.owner() == employee_id);
    let status = classify_day_status(record, today);

    let detail = record.and_then(|r| match status {
        WorkStatus::Off => r.check_out.clone().map(StatusDetail::CheckOut),
        WorkStatus::Working | WorkStatus::Incomplete if r.has_check_in() => {
            r.check_in.clone().map(StatusDetail::CheckIn)
        }
        _ => None,
    });

    TodayStatus { status, detail }
}
