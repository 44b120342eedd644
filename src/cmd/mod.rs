pub mod init;
pub mod month;
pub mod punch;
pub mod records;
pub mod report;
pub mod root;
pub mod status;
pub mod team;

use crate::calc::monthly::first_of_month;
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

/// Optional `YYYY-MM-DD` argument, defaulting to `today`.
pub(crate) fn resolve_date(arg: Option<&str>, today: NaiveDate) -> Result<NaiveDate> {
    match arg {
        None => Ok(today),
        Some(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid date '{}', expected YYYY-MM-DD", text)),
    }
}

/// Optional `YYYY-MM` argument, defaulting to the month of `today`.
pub(crate) fn resolve_month(arg: Option<&str>, today: NaiveDate) -> Result<String> {
    match arg {
        None => Ok(today.format("%Y-%m").to_string()),
        Some(text) => {
            let text = text.trim();
            if first_of_month(text).is_none() {
                bail!("invalid month '{}', expected YYYY-MM", text);
            }
            Ok(text.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_resolve_date_defaults_to_today() {
        assert_eq!(resolve_date(None, d(2025, 4, 2)).unwrap(), d(2025, 4, 2));
        assert_eq!(resolve_date(Some("2025-01-31"), d(2025, 4, 2)).unwrap(), d(2025, 1, 31));
    }

    #[test]
    fn test_resolve_date_rejects_garbage() {
        let err = resolve_date(Some("31/01/2025"), d(2025, 4, 2)).unwrap_err();
        assert!(err.to_string().contains("31/01/2025"));
    }

    #[test]
    fn test_resolve_month() {
        assert_eq!(resolve_month(None, d(2025, 4, 2)).unwrap(), "2025-04");
        assert_eq!(resolve_month(Some(" 2024-12 "), d(2025, 4, 2)).unwrap(), "2024-12");
        assert!(resolve_month(Some("2024-1"), d(2025, 4, 2)).is_err());
    }
}
