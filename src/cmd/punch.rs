//! Staff self-service writes: check-in, check-out, break, day off.

use crate::calc::time_calc::{format_minutes_as_clock, parse_clock_time};
use crate::data::{Persistable, WorkRecord, WorkRecordData};
use anyhow::{bail, Result};
use chrono::{Local, NaiveDate, NaiveTime};
use tracing::{info, warn};

fn key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `--at` when given (validated), otherwise the current wall-clock minute.
pub(crate) fn resolve_time(at: Option<&str>, now: NaiveTime) -> Result<String> {
    match at {
        None => Ok(now.format("%H:%M").to_string()),
        Some(text) => match parse_clock_time(text) {
            Some(minutes) => Ok(format_minutes_as_clock(minutes)),
            None => bail!("invalid time '{}', expected HH:MM", text),
        },
    }
}

fn existing_or_new(data: &WorkRecordData, date: &str, employee: &str) -> WorkRecord {
    data.get(date, employee)
        .cloned()
        .unwrap_or_else(|| WorkRecord::new(date).with_employee(employee))
}

/// `overwrite` allows correcting a time that is already set.
pub(crate) fn apply_check_in(
    data: &mut WorkRecordData,
    employee: &str,
    date: NaiveDate,
    time: &str,
    overwrite: bool,
) -> Result<WorkRecord> {
    let date = key(date);
    let mut record = existing_or_new(data, &date, employee);
    if record.is_day_off() {
        bail!("{} is marked as a day off; clear it first", date);
    }
    if record.has_check_in() && !overwrite {
        bail!(
            "already checked in at {} on {}",
            record.check_in.as_deref().unwrap_or_default(),
            date
        );
    }
    record.check_in = Some(time.to_string());
    data.upsert(record.clone());
    Ok(record)
}

/// The day a check-out belongs to: today, or yesterday when an overnight
/// shift is still open and today has no check-in.
pub(crate) fn check_out_date(data: &WorkRecordData, employee: &str, today: NaiveDate) -> NaiveDate {
    let today_has_check_in = data
        .get(&key(today), employee)
        .is_some_and(WorkRecord::has_check_in);
    if today_has_check_in {
        return today;
    }
    match today.pred_opt() {
        Some(yesterday)
            if data
                .get(&key(yesterday), employee)
                .is_some_and(|r| r.has_check_in() && !r.has_check_out() && !r.is_day_off()) =>
        {
            yesterday
        }
        _ => today,
    }
}

pub(crate) fn apply_check_out(
    data: &mut WorkRecordData,
    employee: &str,
    date: NaiveDate,
    time: &str,
    overwrite: bool,
) -> Result<WorkRecord> {
    let date = key(date);
    let mut record = existing_or_new(data, &date, employee);
    if record.is_day_off() {
        bail!("{} is marked as a day off; clear it first", date);
    }
    if record.has_check_out() && !overwrite {
        bail!(
            "already checked out at {} on {}",
            record.check_out.as_deref().unwrap_or_default(),
            date
        );
    }
    if !record.has_check_in() {
        warn!(employee, date = %date, "check-out without a check-in");
    }
    record.check_out = Some(time.to_string());
    data.upsert(record.clone());
    Ok(record)
}

pub(crate) fn apply_break(
    data: &mut WorkRecordData,
    employee: &str,
    date: NaiveDate,
    minutes: i64,
) -> Result<WorkRecord> {
    if minutes < 0 {
        bail!("break minutes cannot be negative");
    }
    let date = key(date);
    let Some(mut record) = data.get(&date, employee).cloned() else {
        bail!("no record for {}; check in first", date);
    };
    if record.is_day_off() {
        bail!("{} is marked as a day off", date);
    }
    record.break_min = minutes;
    data.upsert(record.clone());
    Ok(record)
}

pub fn check_in(employee: &str, at: Option<&str>) -> Result<()> {
    let now = Local::now();
    let time = resolve_time(at, now.time())?;
    let mut data = WorkRecordData::load()?;
    let record = apply_check_in(&mut data, employee, now.date_naive(), &time, at.is_some())?;
    data.save()?;
    info!(employee, date = %record.date, time = %time, "check-in recorded");
    println!("Checked in at {} on {}", time, record.date);
    Ok(())
}

pub fn check_out(employee: &str, at: Option<&str>) -> Result<()> {
    let now = Local::now();
    let time = resolve_time(at, now.time())?;
    let mut data = WorkRecordData::load()?;
    let date = check_out_date(&data, employee, now.date_naive());
    let record = apply_check_out(&mut data, employee, date, &time, at.is_some())?;
    data.save()?;
    info!(employee, date = %record.date, time = %time, "check-out recorded");
    println!("Checked out at {} on {}", time, record.date);
    Ok(())
}

pub fn set_break(employee: &str, date: NaiveDate, minutes: i64) -> Result<()> {
    let mut data = WorkRecordData::load()?;
    let record = apply_break(&mut data, employee, date, minutes)?;
    data.save()?;
    info!(employee, date = %record.date, minutes, "break updated");
    println!("Break on {} set to {}", record.date, format_minutes_as_clock(minutes));
    Ok(())
}

pub fn day_off(employee: &str, date: NaiveDate) -> Result<()> {
    let mut data = WorkRecordData::load()?;
    data.mark_day_off(&key(date), employee);
    data.save()?;
    info!(employee, date = %date, "day off recorded");
    println!("{} marked as a day off", key(date));
    Ok(())
}

pub fn clear(employee: &str, date: NaiveDate) -> Result<()> {
    let mut data = WorkRecordData::load()?;
    if data.delete(&key(date), employee) {
        data.save()?;
        info!(employee, date = %date, "record cleared");
        println!("Record for {} removed", key(date));
    } else {
        warn!(employee, date = %date, "nothing to clear");
        println!("No record for {}", key(date));
    }
    Ok(())
}
