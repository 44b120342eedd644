use crate::calc::monthly::{first_of_month, next_month_start};
use crate::calc::time_calc::parse_clock_time;
use crate::data::persistence::Persistable;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Note value that marks a record as a day off.
pub const HOLIDAY_NOTE: &str = "OFF";

/// Owner of records written before per-staff ids existed.
pub const DEFAULT_EMPLOYEE_ID: &str = "admin";

/// One staff member's attendance for one calendar date.
///
/// Field names follow the camelCase wire shape; the aliases accept rows
/// exported from the hosted `work_records` table as-is.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkRecord {
    #[serde(alias = "work_date", alias = "day")]
    pub date: String,
    #[serde(default, alias = "check_in", skip_serializing_if = "Option::is_none")]
    pub check_in: Option<String>,
    #[serde(default, alias = "check_out", skip_serializing_if = "Option::is_none")]
    pub check_out: Option<String>,
    #[serde(
        default,
        alias = "break_min",
        alias = "break_minutes",
        deserialize_with = "null_as_zero"
    )]
    pub break_min: i64,
    #[serde(default, alias = "staff_user_id", skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(default, alias = "status_note")]
    pub note: Option<String>,
}

fn null_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(0))
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid {field} time '{value}', expected HH:MM")]
    InvalidTime { field: &'static str, value: String },
}

impl WorkRecord {
    pub fn new(date: &str) -> Self {
        WorkRecord {
            date: date.to_string(),
            ..Default::default()
        }
    }

    pub fn with_check_in(mut self, time: &str) -> Self {
        self.check_in = Some(time.to_string());
        self
    }

    pub fn with_check_out(mut self, time: &str) -> Self {
        self.check_out = Some(time.to_string());
        self
    }

    pub fn with_break(mut self, minutes: i64) -> Self {
        self.break_min = minutes;
        self
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_string());
        self
    }

    pub fn with_employee(mut self, employee_id: &str) -> Self {
        self.employee_id = Some(employee_id.to_string());
        self
    }

    pub fn has_check_in(&self) -> bool {
        self.check_in.as_deref().is_some_and(|s| !s.is_empty())
    }

    pub fn has_check_out(&self) -> bool {
        self.check_out.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Exact match on the `OFF` sentinel, as the aggregators see it.
    pub fn is_day_off(&self) -> bool {
        self.note.as_deref() == Some(HOLIDAY_NOTE)
    }

    /// Employee id, falling back to the default account for owner-less rows.
    pub fn owner(&self) -> &str {
        match self.employee_id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => DEFAULT_EMPLOYEE_ID,
        }
    }

    fn belongs_to(&self, date: &str, employee_id: &str) -> bool {
        self.date == date && self.owner() == employee_id
    }

    /// Converts stored timestamps to `HH:MM` and drops empty strings.
    pub fn normalized(mut self) -> Self {
        self.check_in = self.check_in.as_deref().and_then(to_hhmm);
        self.check_out = self.check_out.as_deref().and_then(to_hhmm);
        if self.employee_id.as_deref() == Some("") {
            self.employee_id = None;
        }
        self
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        let parsed = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d");
        if self.date.len() != 10 || parsed.is_err() {
            return Err(RecordError::InvalidDate(self.date.clone()));
        }
        for (field, value) in [("check-in", &self.check_in), ("check-out", &self.check_out)] {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                if parse_clock_time(v).is_none() {
                    return Err(RecordError::InvalidTime {
                        field,
                        value: v.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// `2025-01-10T09:30:00Z` -> `09:30` (UTC), `09:30:00` -> `09:30`.
fn to_hhmm(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if value.contains('T') {
        if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
            return Some(ts.with_timezone(&Utc).format("%H:%M").to_string());
        }
    }
    Some(value.chars().take(5).collect())
}

/// Earliest date still readable under a retention window of `days`.
pub fn retention_start(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}

/// All attendance records, stored as a plain JSON array.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct WorkRecordData {
    pub records: Vec<WorkRecord>,
}

impl Persistable for WorkRecordData {
    fn filename() -> &'static str {
        "work_records.json"
    }
    fn is_json() -> bool {
        true
    }
}

impl WorkRecordData {
    pub fn get(&self, date: &str, employee_id: &str) -> Option<&WorkRecord> {
        self.records.iter().find(|r| r.belongs_to(date, employee_id))
    }

    /// Inserts or replaces the record for `(employee, date)`.
    pub fn upsert(&mut self, mut record: WorkRecord) {
        let employee_id = record.owner().to_string();
        record.employee_id = Some(employee_id.clone());
        match self
            .records
            .iter_mut()
            .find(|r| r.belongs_to(&record.date, &employee_id))
        {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    /// Returns true when a record was removed.
    pub fn delete(&mut self, date: &str, employee_id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|r| !r.belongs_to(date, employee_id));
        self.records.len() != before
    }

    pub fn mark_day_off(&mut self, date: &str, employee_id: &str) {
        self.upsert(
            WorkRecord::new(date)
                .with_employee(employee_id)
                .with_note(HOLIDAY_NOTE),
        );
    }

    pub fn list_by_employee(&self, employee_id: &str) -> Vec<WorkRecord> {
        self.records
            .iter()
            .filter(|r| r.owner() == employee_id)
            .cloned()
            .collect()
    }

    /// Records for one employee in `[month start, next month start)`, never
    /// earlier than `retention`, sorted by date. Malformed months yield nothing.
    pub fn list_by_month(
        &self,
        employee_id: &str,
        yyyy_mm: &str,
        retention: NaiveDate,
    ) -> Vec<WorkRecord> {
        let Some(first) = first_of_month(yyyy_mm) else {
            return Vec::new();
        };
        let Some(end) = next_month_start(first) else {
            return Vec::new();
        };
        let start = first.max(retention);
        if start >= end {
            return Vec::new();
        }
        let mut rows: Vec<WorkRecord> = self
            .records
            .iter()
            .filter(|r| r.owner() == employee_id)
            .filter(|r| {
                NaiveDate::parse_from_str(&r.date, "%Y-%m-%d")
                    .is_ok_and(|d| d >= start && d < end)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.date.cmp(&b.date));
        rows
    }

    pub fn records_on(&self, date: &str) -> Vec<WorkRecord> {
        self.records
            .iter()
            .filter(|r| r.date == date)
            .cloned()
            .collect()
    }

    /// Distinct owners, sorted.
    pub fn employees(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.records.iter().map(|r| r.owner().to_string()).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Stamps the default employee id on owner-less records. Returns how many changed.
    pub fn migrate_default_employee(&mut self) -> usize {
        let mut changed = 0;
        for r in &mut self.records {
            if r.employee_id.as_deref().is_none_or(str::is_empty) {
                r.employee_id = Some(DEFAULT_EMPLOYEE_ID.to_string());
                changed += 1;
            }
        }
        changed
    }

    pub fn export_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.records).context("failed to serialize records")
    }

    pub fn import_json(text: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(text).context("failed to parse import file as JSON")?;
        if !value.is_array() {
            bail!("invalid JSON: expected an array of records");
        }
        let records: Vec<WorkRecord> =
            serde_json::from_value(value).context("failed to read records from import file")?;
        Ok(WorkRecordData {
            records: records.into_iter().map(WorkRecord::normalized).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_owner_defaults_to_admin() {
        assert_eq!(WorkRecord::new("2025-01-01").owner(), "admin");
        assert_eq!(
            WorkRecord::new("2025-01-01").with_employee("s-1").owner(),
            "s-1"
        );
        let mut blank = WorkRecord::new("2025-01-01");
        blank.employee_id = Some(String::new());
        assert_eq!(blank.owner(), "admin");
    }

    #[test]
    fn test_is_day_off_is_exact() {
        assert!(WorkRecord::new("2025-01-01").with_note("OFF").is_day_off());
        assert!(!WorkRecord::new("2025-01-01").with_note("off").is_day_off());
        assert!(!WorkRecord::new("2025-01-01").with_note(" OFF ").is_day_off());
        assert!(!WorkRecord::new("2025-01-01").is_day_off());
    }

    #[test]
    fn test_empty_time_is_not_present() {
        let r = WorkRecord::new("2025-01-01").with_check_in("");
        assert!(!r.has_check_in());
        assert!(!r.has_check_out());
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{"date":"2025-01-02","checkIn":"09:00","checkOut":"18:00","breakMin":45,"employeeId":"s-1","note":null}"#;
        let r: WorkRecord = serde_json::from_str(json).unwrap();
        assert_eq!(r.check_in.as_deref(), Some("09:00"));
        assert_eq!(r.break_min, 45);
        assert_eq!(r.owner(), "s-1");
        assert_eq!(r.note, None);
    }

    #[test]
    fn test_deserialize_stored_row_aliases() {
        let json = r#"{"date":"2025-01-02","check_in":"2025-01-02T09:15:00Z","check_out":null,"break_minutes":null,"staff_user_id":"u-9"}"#;
        let r: WorkRecord = serde_json::from_str::<WorkRecord>(json).unwrap().normalized();
        assert_eq!(r.check_in.as_deref(), Some("09:15"));
        assert_eq!(r.check_out, None);
        assert_eq!(r.break_min, 0);
        assert_eq!(r.owner(), "u-9");
    }

    #[test]
    fn test_missing_break_defaults_to_zero() {
        let r: WorkRecord = serde_json::from_str(r#"{"date":"2025-01-02"}"#).unwrap();
        assert_eq!(r.break_min, 0);
    }

    #[test]
    fn test_to_hhmm_variants() {
        assert_eq!(to_hhmm("09:30:00").as_deref(), Some("09:30"));
        assert_eq!(to_hhmm("2025-01-10T23:05:00+00:00").as_deref(), Some("23:05"));
        assert_eq!(to_hhmm("2025-01-10T10:05:00+09:00").as_deref(), Some("01:05"));
        assert_eq!(to_hhmm("  ").as_deref(), None);
    }

    #[test]
    fn test_validate_accepts_good_record() {
        let r = WorkRecord::new("2025-02-28")
            .with_check_in("09:00")
            .with_check_out("17:30");
        assert_eq!(r.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_bad_date_and_time() {
        assert_eq!(
            WorkRecord::new("2025-02-30").validate(),
            Err(RecordError::InvalidDate("2025-02-30".to_string()))
        );
        assert_eq!(
            WorkRecord::new("2025-2-3").validate(),
            Err(RecordError::InvalidDate("2025-2-3".to_string()))
        );
        let r = WorkRecord::new("2025-02-03").with_check_out("25:00");
        assert_eq!(
            r.validate(),
            Err(RecordError::InvalidTime {
                field: "check-out",
                value: "25:00".to_string()
            })
        );
    }

    #[test]
    fn test_upsert_replaces_same_employee_and_date() {
        let mut data = WorkRecordData::default();
        data.upsert(WorkRecord::new("2025-01-02").with_check_in("09:00"));
        data.upsert(
            WorkRecord::new("2025-01-02")
                .with_check_in("09:00")
                .with_check_out("18:00"),
        );
        assert_eq!(data.records.len(), 1);
        assert_eq!(data.records[0].check_out.as_deref(), Some("18:00"));
        assert_eq!(data.records[0].employee_id.as_deref(), Some("admin"));
    }

    #[test]
    fn test_upsert_keeps_employees_apart() {
        let mut data = WorkRecordData::default();
        data.upsert(WorkRecord::new("2025-01-02").with_employee("a"));
        data.upsert(WorkRecord::new("2025-01-02").with_employee("b"));
        assert_eq!(data.records.len(), 2);
        assert!(data.get("2025-01-02", "a").is_some());
        assert!(data.get("2025-01-02", "b").is_some());
        assert!(data.get("2025-01-02", "c").is_none());
    }

    #[test]
    fn test_delete_reports_removal() {
        let mut data = WorkRecordData::default();
        data.upsert(WorkRecord::new("2025-01-02"));
        assert!(!data.delete("2025-01-03", "admin"));
        assert!(data.delete("2025-01-02", "admin"));
        assert!(data.records.is_empty());
    }

    #[test]
    fn test_mark_day_off_clears_times() {
        let mut data = WorkRecordData::default();
        data.upsert(
            WorkRecord::new("2025-01-02")
                .with_check_in("09:00")
                .with_break(30),
        );
        data.mark_day_off("2025-01-02", "admin");
        let r = data.get("2025-01-02", "admin").unwrap();
        assert!(r.is_day_off());
        assert_eq!(r.check_in, None);
        assert_eq!(r.break_min, 0);
    }

    #[test]
    fn test_list_by_month_filters_and_sorts() {
        let mut data = WorkRecordData::default();
        data.upsert(WorkRecord::new("2025-02-01"));
        data.upsert(WorkRecord::new("2025-01-20"));
        data.upsert(WorkRecord::new("2025-01-03"));
        data.upsert(WorkRecord::new("2025-01-31").with_employee("other"));
        data.upsert(WorkRecord::new("2024-12-31"));
        let rows = data.list_by_month("admin", "2025-01", date(2000, 1, 1));
        let dates: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-01-03", "2025-01-20"]);
    }

    #[test]
    fn test_list_by_month_respects_retention() {
        let mut data = WorkRecordData::default();
        data.upsert(WorkRecord::new("2025-01-03"));
        data.upsert(WorkRecord::new("2025-01-20"));
        let rows = data.list_by_month("admin", "2025-01", date(2025, 1, 10));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, "2025-01-20");
        assert!(data.list_by_month("admin", "2025-01", date(2025, 3, 1)).is_empty());
    }

    #[test]
    fn test_list_by_month_malformed_month_is_empty() {
        let mut data = WorkRecordData::default();
        data.upsert(WorkRecord::new("2025-01-03"));
        assert!(data.list_by_month("admin", "2025-13", date(2000, 1, 1)).is_empty());
        assert!(data.list_by_month("admin", "garbage", date(2000, 1, 1)).is_empty());
    }

    #[test]
    fn test_retention_start() {
        assert_eq!(retention_start(date(2025, 3, 1), 365), date(2024, 3, 1));
        assert_eq!(retention_start(date(2025, 3, 1), 0), date(2025, 3, 1));
    }

    #[test]
    fn test_employees_are_distinct_and_sorted() {
        let mut data = WorkRecordData::default();
        data.upsert(WorkRecord::new("2025-01-01").with_employee("b"));
        data.upsert(WorkRecord::new("2025-01-02").with_employee("a"));
        data.upsert(WorkRecord::new("2025-01-03").with_employee("b"));
        assert_eq!(data.employees(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_migrate_default_employee() {
        let mut data = WorkRecordData {
            records: vec![
                WorkRecord::new("2025-01-01"),
                WorkRecord::new("2025-01-02").with_employee("s-1"),
            ],
        };
        assert_eq!(data.migrate_default_employee(), 1);
        assert_eq!(data.records[0].employee_id.as_deref(), Some("admin"));
        assert_eq!(data.migrate_default_employee(), 0);
    }

    #[test]
    fn test_import_rejects_non_array() {
        let err = WorkRecordData::import_json(r#"{"date":"2025-01-01"}"#).unwrap_err();
        assert!(err.to_string().contains("expected an array"));
    }

    #[test]
    fn test_export_then_import_keeps_records() {
        let mut data = WorkRecordData::default();
        data.upsert(
            WorkRecord::new("2025-01-02")
                .with_check_in("09:00")
                .with_check_out("18:00")
                .with_break(60),
        );
        data.mark_day_off("2025-01-03", "admin");
        let json = data.export_json().unwrap();
        let loaded = WorkRecordData::import_json(&json).unwrap();
        assert_eq!(loaded, data);
    }
}
