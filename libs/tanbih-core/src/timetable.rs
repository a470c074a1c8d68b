//! School timetables: one subject grid per child
//!
//! The school week runs Sunday through Thursday with a fixed number of
//! periods per day. Bundles keep the Arabic day names the app displays,
//! so the JSON field names below are the display names.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TanbihError};
use tanbih_common::constants::PERIODS_PER_DAY;

/// A day of the school week
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchoolDay {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
}

impl SchoolDay {
    /// School days in week order, Sunday first
    pub const ALL: [Self; 5] = [
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
    ];

    /// Arabic display name, also the bundle field name
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Sunday => "الأحد",
            Self::Monday => "الاثنين",
            Self::Tuesday => "الثلاثاء",
            Self::Wednesday => "الأربعاء",
            Self::Thursday => "الخميس",
        }
    }
}

fn blank_day() -> Vec<String> {
    vec![String::new(); PERIODS_PER_DAY]
}

/// One child's subject grid for the school week.
///
/// Every day holds [`PERIODS_PER_DAY`] slots; an empty string is a free
/// period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSchedule {
    /// Sunday's subjects by period
    #[serde(rename = "الأحد", default = "blank_day")]
    pub sunday: Vec<String>,
    /// Monday's subjects by period
    #[serde(rename = "الاثنين", default = "blank_day")]
    pub monday: Vec<String>,
    /// Tuesday's subjects by period
    #[serde(rename = "الثلاثاء", default = "blank_day")]
    pub tuesday: Vec<String>,
    /// Wednesday's subjects by period
    #[serde(rename = "الأربعاء", default = "blank_day")]
    pub wednesday: Vec<String>,
    /// Thursday's subjects by period
    #[serde(rename = "الخميس", default = "blank_day")]
    pub thursday: Vec<String>,
}

impl WeekSchedule {
    /// A fresh grid of free periods. Every call builds an independent
    /// value; grids are never shared between children.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            sunday: blank_day(),
            monday: blank_day(),
            tuesday: blank_day(),
            wednesday: blank_day(),
            thursday: blank_day(),
        }
    }

    /// Subjects of one day by period
    #[must_use]
    pub fn day(&self, day: SchoolDay) -> &[String] {
        match day {
            SchoolDay::Sunday => &self.sunday,
            SchoolDay::Monday => &self.monday,
            SchoolDay::Tuesday => &self.tuesday,
            SchoolDay::Wednesday => &self.wednesday,
            SchoolDay::Thursday => &self.thursday,
        }
    }

    fn day_mut(&mut self, day: SchoolDay) -> &mut Vec<String> {
        match day {
            SchoolDay::Sunday => &mut self.sunday,
            SchoolDay::Monday => &mut self.monday,
            SchoolDay::Tuesday => &mut self.tuesday,
            SchoolDay::Wednesday => &mut self.wednesday,
            SchoolDay::Thursday => &mut self.thursday,
        }
    }

    /// Subject in a 1-based period slot; free periods read as "".
    ///
    /// # Errors
    /// `InvalidPeriod` when `period` is outside `1..=PERIODS_PER_DAY`.
    pub fn subject(&self, day: SchoolDay, period: usize) -> Result<&str> {
        let slot = check_period(period)?;
        Ok(self.day(day).get(slot).map_or("", String::as_str))
    }

    /// Write a subject into a 1-based period slot, trimming surrounding
    /// whitespace. A day loaded short from an old bundle is padded back to
    /// full length first.
    ///
    /// # Errors
    /// `InvalidPeriod` when `period` is outside `1..=PERIODS_PER_DAY`.
    pub fn set_subject(&mut self, day: SchoolDay, period: usize, subject: &str) -> Result<()> {
        let slot = check_period(period)?;
        let slots = self.day_mut(day);
        if slots.len() < PERIODS_PER_DAY {
            slots.resize(PERIODS_PER_DAY, String::new());
        }
        slots[slot] = subject.trim().to_string();
        Ok(())
    }

    /// Clear a 1-based period slot back to a free period.
    ///
    /// # Errors
    /// `InvalidPeriod` when `period` is outside `1..=PERIODS_PER_DAY`.
    pub fn clear_subject(&mut self, day: SchoolDay, period: usize) -> Result<()> {
        self.set_subject(day, period, "")
    }
}

impl Default for WeekSchedule {
    fn default() -> Self {
        Self::blank()
    }
}

fn check_period(period: usize) -> Result<usize> {
    if (1..=PERIODS_PER_DAY).contains(&period) {
        Ok(period - 1)
    } else {
        Err(TanbihError::InvalidPeriod { period })
    }
}

/// One child and their week grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildSchedule {
    /// Child's display name
    pub name: String,
    /// Subject grid for the school week
    #[serde(default)]
    pub week: WeekSchedule,
}

impl ChildSchedule {
    /// A child with an all-free week
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            week: WeekSchedule::blank(),
        }
    }
}

/// What a timetable-sourced reminder is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    Homework,
    Exam,
}

impl ReminderKind {
    /// Arabic label used in reminder text
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Homework => "واجب",
            Self::Exam => "اختبار",
        }
    }
}

/// Reminder text for a subject taken from a child's timetable
#[must_use]
pub fn subject_reminder(kind: ReminderKind, subject: &str, child: &str) -> String {
    format!("{}: {} ({})", kind.label(), subject, child)
}
