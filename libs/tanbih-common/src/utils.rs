//! Formatting and parsing utilities shared by the tanbih crates

use chrono::{NaiveDate, NaiveDateTime};

use crate::constants::{DATE_FORMAT, REMINDER_DATETIME_FORMAT};

/// Format a calendar date for display
#[must_use]
pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Format a reminder date+time at minute precision
#[must_use]
pub fn format_reminder_datetime(dt: &NaiveDateTime) -> String {
    dt.format(REMINDER_DATETIME_FORMAT).to_string()
}

/// Parse a date string in YYYY-MM-DD format
///
/// # Errors
/// Returns `chrono::ParseError` if the date string is not in the expected format
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str, DATE_FORMAT)
}

/// Parse a reminder date+time string in YYYY-MM-DDTHH:MM format
///
/// # Errors
/// Returns `chrono::ParseError` if the string is not in the expected format
pub fn parse_reminder_datetime(dt_str: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(dt_str, REMINDER_DATETIME_FORMAT)
}

/// Truncate a string to a maximum number of characters.
///
/// Counts characters, not bytes; reminder text is routinely Arabic and byte
/// slicing would split a multi-byte character.
#[must_use]
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Format the delay until a due instant as a short human-readable phrase.
///
/// Negative delays read as "passed"; sub-minute delays as "any moment now".
#[must_use]
pub fn format_countdown(seconds: i64) -> String {
    if seconds < 0 {
        return "passed".to_string();
    }
    if seconds < 60 {
        return "any moment now".to_string();
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("in {} minute{}", minutes, if minutes == 1 { "" } else { "s" });
    }
    let hours = minutes / 60;
    let rem_minutes = minutes % 60;
    if hours < 24 {
        return if rem_minutes > 0 {
            format!(
                "in {} hour{} {} minute{}",
                hours,
                if hours == 1 { "" } else { "s" },
                rem_minutes,
                if rem_minutes == 1 { "" } else { "s" }
            )
        } else {
            format!("in {} hour{}", hours, if hours == 1 { "" } else { "s" })
        };
    }
    let days = hours / 24;
    let rem_hours = hours % 24;
    if rem_hours > 0 {
        format!(
            "in {} day{} {} hour{}",
            days,
            if days == 1 { "" } else { "s" },
            rem_hours,
            if rem_hours == 1 { "" } else { "s" }
        )
    } else {
        format!("in {} day{}", days, if days == 1 { "" } else { "s" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 22).unwrap();
        assert_eq!(format_date(&date), "2024-01-22");
    }

    #[test]
    fn test_format_date_edge_cases() {
        // January 1st
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(format_date(&date), "2024-01-01");

        // December 31st
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(format_date(&date), "2023-12-31");

        // Leap day
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(format_date(&date), "2024-02-29");
    }

    #[test]
    fn test_format_reminder_datetime() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        assert_eq!(format_reminder_datetime(&dt), "2024-01-01T08:00");
    }

    #[test]
    fn test_format_reminder_datetime_drops_seconds() {
        let dt = NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(format_reminder_datetime(&dt), "2024-06-15T23:59");
    }

    #[test]
    fn test_parse_date_valid() {
        let date = parse_date("2024-04-30").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 4);
        assert_eq!(date.day(), 30);
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date("2024/04/30").is_err());
        assert!(parse_date("2024-13-01").is_err());
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("").is_err());
        assert!(parse_date("not-a-date").is_err());
    }

    #[test]
    fn test_parse_reminder_datetime_valid() {
        let dt = parse_reminder_datetime("2024-01-31T09:00").unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(dt.hour(), 9);
        assert_eq!(dt.minute(), 0);
        assert_eq!(dt.second(), 0);
    }

    #[test]
    fn test_parse_reminder_datetime_invalid() {
        // Seconds are not part of the format
        assert!(parse_reminder_datetime("2024-01-31T09:00:00").is_err());
        assert!(parse_reminder_datetime("2024-01-31 09:00").is_err());
        assert!(parse_reminder_datetime("2024-01-31").is_err());
        assert!(parse_reminder_datetime("").is_err());
    }

    #[test]
    fn test_datetime_round_trip() {
        let original = "2024-01-01T08:00";
        let parsed = parse_reminder_datetime(original).unwrap();
        assert_eq!(format_reminder_datetime(&parsed), original);
    }

    #[test]
    fn test_truncate_string_short() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_string_long() {
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("this is a very long string", 10), "this is...");
    }

    #[test]
    fn test_truncate_string_edge_cases() {
        assert_eq!(truncate_string("hello", 0), "...");
        assert_eq!(truncate_string("hello", 3), "...");
        assert_eq!(truncate_string("hello", 4), "h...");
        assert_eq!(truncate_string("", 10), "");
    }

    #[test]
    fn test_truncate_string_arabic() {
        // Character counting must not split multi-byte text
        let text = "واجب: رياضيات (سارة)";
        let truncated = truncate_string(text, 10);
        assert_eq!(truncated.chars().count(), 10);
        assert!(truncated.ends_with("..."));

        let short = "تذكير";
        assert_eq!(truncate_string(short, 10), short);
    }

    #[test]
    fn test_format_countdown_boundaries() {
        assert_eq!(format_countdown(-5), "passed");
        assert_eq!(format_countdown(0), "any moment now");
        assert_eq!(format_countdown(59), "any moment now");
        assert_eq!(format_countdown(60), "in 1 minute");
        assert_eq!(format_countdown(120), "in 2 minutes");
        assert_eq!(format_countdown(3600), "in 1 hour");
        assert_eq!(format_countdown(3660), "in 1 hour 1 minute");
        assert_eq!(format_countdown(7320), "in 2 hours 2 minutes");
        assert_eq!(format_countdown(86400), "in 1 day");
        assert_eq!(format_countdown(90000), "in 1 day 1 hour");
    }
}
