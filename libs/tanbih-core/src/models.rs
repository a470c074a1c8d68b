//! Data models for reminders and the per-user bundle

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::notify::{SoundCue, VibrationPattern};
use crate::timetable::ChildSchedule;

/// Serde adapter for the minute-precision reminder timestamp format
/// (`YYYY-MM-DDTHH:MM`), the shape the bundle has always stored.
pub mod minute_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};
    use tanbih_common::REMINDER_DATETIME_FORMAT;

    /// Serialize a timestamp as `YYYY-MM-DDTHH:MM`
    ///
    /// # Errors
    /// Forwards serializer errors
    pub fn serialize<S>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&dt.format(REMINDER_DATETIME_FORMAT).to_string())
    }

    /// Deserialize a `YYYY-MM-DDTHH:MM` timestamp
    ///
    /// # Errors
    /// Fails when the string does not match the format
    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, REMINDER_DATETIME_FORMAT)
            .map_err(serde::de::Error::custom)
    }
}

/// User input for a reminder, not yet dated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderTemplate {
    /// Display text
    pub text: String,
    /// Audio cue key
    pub sound: SoundCue,
    /// Vibration pattern key
    pub vibration: VibrationPattern,
}

impl ReminderTemplate {
    /// Create a template with the default sound and vibration cues
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sound: SoundCue::default(),
            vibration: VibrationPattern::default(),
        }
    }

    /// Create a template with explicit cues
    #[must_use]
    pub fn with_cues(
        text: impl Into<String>,
        sound: SoundCue,
        vibration: VibrationPattern,
    ) -> Self {
        Self {
            text: text.into(),
            sound,
            vibration,
        }
    }
}

/// A concrete reminder instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    /// Unique identifier, wall-clock milliseconds scale, strictly increasing
    pub id: i64,
    /// Display text
    pub text: String,
    /// Due date and time, minute precision, local wall clock
    #[serde(with = "minute_format")]
    pub date_time: NaiveDateTime,
    /// Audio cue key
    pub sound: SoundCue,
    /// Vibration pattern key
    pub vibration: VibrationPattern,
    /// Completion flag, starts false
    pub completed: bool,
    /// Shared tag linking all instances of one recurrence expansion; absent
    /// for single reminders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
}

impl Reminder {
    /// Whether this reminder still needs a scheduled callback: not completed
    /// and due strictly after `now`
    #[must_use]
    pub fn is_pending(&self, now: NaiveDateTime) -> bool {
        !self.completed && self.date_time > now
    }
}

/// UI theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Theme {
    #[default]
    #[serde(rename = "sky")]
    Sky,
    #[serde(rename = "emerald")]
    Emerald,
    #[serde(rename = "rose")]
    Rose,
}

impl Theme {
    /// Stable key used in the bundle and on the CLI
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sky => "sky",
            Self::Emerald => "emerald",
            Self::Rose => "rose",
        }
    }
}

/// Per-user persisted bundle; every field defaults so partially written or
/// older bundles load cleanly
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserData {
    /// Reminder collection, sorted ascending by due time
    #[serde(default)]
    pub reminders: Vec<Reminder>,
    /// Per-child school timetables
    #[serde(default)]
    pub schedules: Vec<ChildSchedule>,
    /// UI theme preference
    #[serde(default)]
    pub theme: Theme,
}
