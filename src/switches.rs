use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime};

use crate::{AppError, Result};

/// Date rendering/parsing mode selected with `--date-format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFormat {
    #[default]
    Iso8601,
    Uk,
}

/// Name accepted on the command line, and the strftime pattern it selects.
/// Entries are in `DateFormat` declaration order.
const DATE_FORMATS: [(DateFormat, &str, &str); 2] = [
    (DateFormat::Iso8601, "ISO8601", "%Y-%m-%d"),
    (DateFormat::Uk, "UK", "%d/%m/%Y"),
];

impl DateFormat {
    #[allow(clippy::indexing_slicing)] // DateFormat discriminants are 0..2, array is size 2
    fn entry(self) -> (DateFormat, &'static str, &'static str) {
        DATE_FORMATS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.entry().1
    }

    pub fn pattern(self) -> &'static str {
        self.entry().2
    }

    /// Comma separated list of every accepted name, e.g. `ISO8601, UK`.
    pub fn options() -> String {
        DATE_FORMATS
            .iter()
            .map(|(_, name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn parse_date(self, s: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(s, self.pattern()).map_err(|_| AppError::InvalidDate {
            value: s.to_string(),
            pattern: self.pattern().to_string(),
        })
    }

    pub fn format_date(self, date: NaiveDate) -> String {
        date.format(self.pattern()).to_string()
    }

    /// Render a Slack `ts` ("1612345678.000200") as `<date> HH:MM:SS` in UTC.
    /// Unparseable timestamps are returned unchanged.
    pub fn format_ts(self, ts: &str) -> String {
        let seconds = ts.split('.').next().and_then(|s| s.parse::<i64>().ok());
        match seconds.and_then(|s| DateTime::from_timestamp(s, 0)) {
            Some(dt) => format!(
                "{} {}",
                self.format_date(dt.date_naive()),
                dt.format("%H:%M:%S")
            ),
            None => ts.to_string(),
        }
    }
}

impl FromStr for DateFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.to_uppercase();
        DATE_FORMATS
            .iter()
            .find(|(_, name, _)| *name == upper)
            .map(|(mode, _, _)| *mode)
            .ok_or_else(|| AppError::InvalidDateFormat {
                value: s.to_string(),
                options: Self::options(),
            })
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Seconds since the epoch at midnight UTC of `date`.
pub fn date_to_unix(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Convert a date into a Slack timestamp at midnight UTC.
pub fn date_to_slack_ts(date: NaiveDate) -> String {
    format!("{}.000000", date_to_unix(date))
}

/// The Slack timestamp one microsecond before midnight UTC of `date`.
pub fn slack_ts_before(date: NaiveDate) -> String {
    format!("{}.999999", date_to_unix(date) - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        for input in ["iso8601", "Iso8601", "ISO8601"] {
            assert_eq!(input.parse::<DateFormat>().unwrap(), DateFormat::Iso8601);
        }
        assert_eq!("uk".parse::<DateFormat>().unwrap(), DateFormat::Uk);
    }

    #[test]
    fn test_parse_invalid_lists_options() {
        let err = "xyz".parse::<DateFormat>().unwrap_err();
        assert!(matches!(err, AppError::InvalidDateFormat { .. }));
        assert!(err.to_string().contains("ISO8601, UK"));
    }

    #[test]
    fn test_default_is_iso8601() {
        assert_eq!(DateFormat::default(), DateFormat::Iso8601);
    }

    #[test]
    fn test_patterns() {
        assert_eq!(DateFormat::Iso8601.pattern(), "%Y-%m-%d");
        assert_eq!(DateFormat::Uk.pattern(), "%d/%m/%Y");
    }

    #[test]
    fn test_display_uses_name() {
        assert_eq!(DateFormat::Uk.to_string(), "UK");
    }

    #[test]
    fn test_parse_date_with_uk_format() {
        let date = DateFormat::Uk.parse_date("25/12/2023").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2023, 12, 25).unwrap());
    }

    #[test]
    fn test_parse_date_wrong_format() {
        let err = DateFormat::Iso8601.parse_date("25/12/2023").unwrap_err();
        assert!(matches!(err, AppError::InvalidDate { .. }));
    }

    #[test]
    fn test_format_ts() {
        assert_eq!(
            DateFormat::Iso8601.format_ts("1700000000.000100"),
            "2023-11-14 22:13:20"
        );
        assert_eq!(
            DateFormat::Uk.format_ts("1700000000.000100"),
            "14/11/2023 22:13:20"
        );
    }

    #[test]
    fn test_format_ts_invalid_passthrough() {
        assert_eq!(DateFormat::Iso8601.format_ts("not-a-ts"), "not-a-ts");
    }

    #[test]
    fn test_date_to_slack_ts() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(date_to_slack_ts(date), "1704067200.000000");
    }

    #[test]
    fn test_slack_ts_before() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(slack_ts_before(date), "1704067199.999999");
    }
}
