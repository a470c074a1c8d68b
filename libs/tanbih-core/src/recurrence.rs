//! Recurring-reminder expansion
//!
//! Turns a reminder template plus a recurrence configuration into the
//! ordered list of concrete occurrence timestamps. Pure calendar
//! arithmetic: no clock access and no identity assignment happen here.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Timelike, Weekday};

use crate::error::{Result, TanbihError};
use crate::models::ReminderTemplate;
use tanbih_common::{format_date, format_reminder_datetime};

/// Hard cap on emitted occurrences for daily and weekly cadences
pub const MAX_STEPPED_OCCURRENCES: usize = 365;

/// Hard cap on scanned months for the monthly cadence
pub const MAX_SCANNED_MONTHS: usize = 60;

/// Rank of a weekday within its month; rank 5 means "last"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekRank {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl WeekRank {
    /// Every rank, in order
    pub const ALL: [Self; 5] = [Self::First, Self::Second, Self::Third, Self::Fourth, Self::Last];

    /// Build a rank from its 1-based number; 5 is "last"
    #[must_use]
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::First),
            2 => Some(Self::Second),
            3 => Some(Self::Third),
            4 => Some(Self::Fourth),
            5 => Some(Self::Last),
            _ => None,
        }
    }

    /// The 1-based rank number
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
            Self::Fourth => 4,
            Self::Last => 5,
        }
    }

    /// Whole weeks past the first occurrence; `None` for "last"
    fn offset_weeks(self) -> Option<u32> {
        match self {
            Self::First => Some(0),
            Self::Second => Some(1),
            Self::Third => Some(2),
            Self::Fourth => Some(3),
            Self::Last => None,
        }
    }
}

/// Flavor of a monthly recurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthlyMode {
    /// A fixed day-of-month, clamped to the month's length
    SpecificDate { day: u8 },
    /// The Nth (or last) occurrence of a weekday within each month
    RelativeWeekday { rank: WeekRank, weekday: Weekday },
}

/// Recurrence step unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Daily,
    Weekly,
    Monthly(MonthlyMode),
}

/// Recurrence configuration supplied alongside a reminder template.
///
/// `start` and `end_date` stay optional because they come straight from the
/// reminder form; their absence is a validation failure, not a type error.
#[derive(Debug, Clone, Copy)]
pub struct RecurrenceConfig {
    /// Step unit, with the monthly flavor when applicable
    pub cadence: Cadence,
    /// First occurrence's date and time-of-day; the time-of-day is reused
    /// for every generated occurrence
    pub start: Option<NaiveDateTime>,
    /// Inclusive last calendar date; normalized to end-of-day internally
    pub end_date: Option<NaiveDate>,
}

/// Result of one expansion call
#[derive(Debug, Clone)]
pub struct Expansion {
    /// Occurrence timestamps in ascending chronological order
    pub occurrences: Vec<NaiveDateTime>,
    /// True when an iteration cap cut the sequence short of the end date
    pub truncated: bool,
}

/// Expand a recurrence configuration into concrete occurrence timestamps.
///
/// Timestamps are taken at minute precision, the precision the reminder
/// form and the bundle carry.
///
/// # Errors
/// - `InvalidInput` when the template text is empty, the start is unset, or
///   a specific-date day lies outside 1..=31
/// - `MissingEndDate` when no end date is given
/// - `InvalidRange` when the end date (end of day) precedes the start
pub fn expand(template: &ReminderTemplate, config: &RecurrenceConfig) -> Result<Expansion> {
    let start = match config.start {
        Some(start) if !template.text.trim().is_empty() => start,
        _ => {
            return Err(TanbihError::invalid_input(
                "reminder text and start time are required",
            ));
        }
    };
    if let Cadence::Monthly(MonthlyMode::SpecificDate { day }) = config.cadence {
        if !(1..=31).contains(&day) {
            return Err(TanbihError::invalid_input(
                "day of month must be between 1 and 31",
            ));
        }
    }

    let Some(end_date) = config.end_date else {
        return Err(TanbihError::MissingEndDate);
    };

    let start = truncate_to_minute(start);
    let end = end_of_day(end_date);
    if end < start {
        return Err(TanbihError::invalid_range(
            format_reminder_datetime(&start),
            format_date(&end_date),
        ));
    }

    Ok(match config.cadence {
        Cadence::Daily => expand_stepped(start, end, 1),
        Cadence::Weekly => expand_stepped(start, end, 7),
        Cadence::Monthly(mode) => expand_monthly(start, end_date, end, mode),
    })
}

/// Daily/weekly expansion: emit, then advance by whole calendar days so the
/// time-of-day survives DST transitions
fn expand_stepped(start: NaiveDateTime, end: NaiveDateTime, step_days: u64) -> Expansion {
    let mut occurrences = Vec::new();
    let mut current = start;

    while current <= end && occurrences.len() < MAX_STEPPED_OCCURRENCES {
        occurrences.push(current);
        match current.checked_add_days(Days::new(step_days)) {
            Some(next) => current = next,
            // Calendar range exhausted; nothing further could be emitted
            None => return Expansion { occurrences, truncated: false },
        }
    }

    Expansion {
        truncated: current <= end,
        occurrences,
    }
}

/// Monthly expansion: scan each month from the start month through the
/// month containing the end date, emitting at most one occurrence per month
fn expand_monthly(
    start: NaiveDateTime,
    end_date: NaiveDate,
    end: NaiveDateTime,
    mode: MonthlyMode,
) -> Expansion {
    let fire_time = start.time();
    let mut occurrences = Vec::new();
    let mut truncated = false;
    let mut year = start.year();
    let mut month = start.month();
    let mut scanned = 0;

    loop {
        let Some(first_of_month) = NaiveDate::from_ymd_opt(year, month, 1) else {
            break;
        };
        if first_of_month > end_date {
            break;
        }
        if scanned >= MAX_SCANNED_MONTHS {
            truncated = true;
            break;
        }
        let Some(days) = days_in_month(year, month) else {
            break;
        };

        let target_day = match mode {
            MonthlyMode::SpecificDate { day } => Some(u32::from(day).min(days)),
            MonthlyMode::RelativeWeekday { rank, weekday } => {
                relative_weekday_day(first_of_month, days, rank, weekday)
            }
        };

        if let Some(day) = target_day {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                let candidate = date.and_time(fire_time);
                // The start month may produce a date before the start
                // instant; the end month one past the end of day
                if candidate >= start && candidate <= end {
                    occurrences.push(candidate);
                }
            }
        }

        scanned += 1;
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }

    Expansion {
        occurrences,
        truncated,
    }
}

/// Day-of-month of the requested occurrence of `weekday`, or `None` when
/// that rank does not exist in the month (the month is then skipped)
fn relative_weekday_day(
    first_of_month: NaiveDate,
    days_in_month: u32,
    rank: WeekRank,
    weekday: Weekday,
) -> Option<u32> {
    let first_dow = first_of_month.weekday().num_days_from_sunday();
    let target_dow = weekday.num_days_from_sunday();
    let first_occurrence = 1 + (target_dow + 7 - first_dow) % 7;

    match rank.offset_weeks() {
        // "Last": the largest 7-day multiple past the first occurrence that
        // stays inside the month
        None => {
            let mut day = first_occurrence;
            while day + 7 <= days_in_month {
                day += 7;
            }
            Some(day)
        }
        Some(weeks) => {
            let day = first_occurrence + weeks * 7;
            (day <= days_in_month).then_some(day)
        }
    }
}

/// Number of days in a month, via the first of the following month
fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    Some(first_of_next.pred_opt()?.day())
}

/// Inclusive end-of-day instant for an end date
fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(23, 59, 59)
        .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN))
}

fn truncate_to_minute(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(dt)
}
