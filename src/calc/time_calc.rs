use crate::data::WorkRecord;
use serde::Serialize;

pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Net work and break minutes for one day. `work_minutes` is `None` when
/// either clock time is missing or malformed.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyWork {
    pub work_minutes: Option<i64>,
    pub break_minutes: i64,
}

/// `"09:30"` -> `Some(570)`. Accepts only zero-padded 24-hour `HH:MM`,
/// surrounding whitespace ignored.
pub fn parse_clock_time(text: &str) -> Option<i64> {
    let (hh, mm) = text.trim().split_once(':')?;
    let hours = two_digits(hh)?;
    let minutes = two_digits(mm)?;
    (hours < 24 && minutes < 60).then_some(hours * 60 + minutes)
}

fn two_digits(s: &str) -> Option<i64> {
    match s.as_bytes() {
        [a @ b'0'..=b'9', b @ b'0'..=b'9'] => Some(i64::from(a - b'0') * 10 + i64::from(b - b'0')),
        _ => None,
    }
}

fn parse_optional(text: Option<&str>) -> Option<i64> {
    text.and_then(parse_clock_time)
}

/// `570` -> `"09:30"`, `-90` -> `"-01:30"`, `1500` -> `"25:00"`.
pub fn format_minutes_as_clock(total_minutes: i64) -> String {
    let sign = if total_minutes < 0 { "-" } else { "" };
    let m = total_minutes.unsigned_abs();
    format!("{}{:02}:{:02}", sign, m / 60, m % 60)
}

/// Like `format_minutes_as_clock`, with `--:--` for an unresolved value.
pub fn format_optional_minutes(minutes: Option<i64>) -> String {
    minutes
        .map(format_minutes_as_clock)
        .unwrap_or_else(|| "--:--".to_string())
}

/// Minutes from check-in to check-out, wrapping past midnight when the
/// check-out is earlier. A shift never spans more than a day.
pub fn shift_span(check_in: i64, check_out: i64) -> i64 {
    if check_out >= check_in {
        check_out - check_in
    } else {
        check_out + MINUTES_PER_DAY - check_in
    }
}

/// Ignores `note`; callers handle day-off records themselves.
pub fn compute_daily_work(record: &WorkRecord) -> DailyWork {
    let break_minutes = record.break_min.max(0);
    let check_in = parse_optional(record.check_in.as_deref());
    let check_out = parse_optional(record.check_out.as_deref());

    let work_minutes = match (check_in, check_out) {
        (Some(start), Some(end)) => Some((shift_span(start, end) - break_minutes).max(0)),
        _ => None,
    };

    DailyWork {
        work_minutes,
        break_minutes,
    }
}
