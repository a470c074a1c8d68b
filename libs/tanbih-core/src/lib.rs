//! Tanbih Core - Reminder scheduling, school timetables and Hijri date tools
//!
//! This library holds everything behind the tanbih CLI: per-user data
//! bundles, recurring-reminder expansion, notification delivery and
//! calendar conversion.
//!
//! # Features
//!
//! - **Recurring Reminders**: Daily, weekly and monthly series, including
//!   day-of-month clamping and Nth/last-weekday rules
//! - **Notification Scheduling**: One tokio timer per pending reminder,
//!   re-armed after every change and gated on a runtime permission
//! - **Per-User Bundles**: Atomic JSON persistence of reminders,
//!   timetables and the color theme
//! - **School Timetables**: A Sunday-to-Thursday subject grid per child,
//!   feeding homework and exam reminders
//! - **Hijri Conversion**: Umm al-Qura calendar conversions through a
//!   schema-constrained language-model endpoint
//!
//! # Quick Start
//!
//! ```no_run
//! use tanbih_core::{ReminderTemplate, Session, TanbihConfig};
//!
//! # fn example() -> tanbih_core::Result<()> {
//! let config = TanbihConfig::from_env();
//! let mut session = Session::register(&config, "um_sara", "s3cret")?;
//!
//! let when = chrono::NaiveDate::from_ymd_opt(2030, 9, 1)
//!     .and_then(|d| d.and_hms_opt(7, 30, 0))
//!     .unwrap_or_default();
//! session.add_reminder(&ReminderTemplate::new("تطعيم المدرسة"), when)?;
//! println!("{} reminders saved", session.reminders().len());
//! # Ok(())
//! # }
//! ```
//!
//! # Crate Features
//!
//! - `test-utils`: Enable test utilities (for testing only)

pub mod config;
pub mod convert;
pub mod error;
pub mod models;
pub mod notify;
pub mod recurrence;
pub mod scheduler;
pub mod session;
pub mod storage;
pub mod store;
pub mod timetable;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::TanbihConfig;
pub use convert::{CalendarConverter, ConvertedDate, GeminiConverter};
pub use error::{Result, TanbihError};
pub use models::{Reminder, ReminderTemplate, Theme, UserData};
pub use notify::{Notifier, Permission, SoundCue, TerminalNotifier, VibrationPattern};
pub use recurrence::{
    expand, Cadence, Expansion, MonthlyMode, RecurrenceConfig, WeekRank, MAX_SCANNED_MONTHS,
    MAX_STEPPED_OCCURRENCES,
};
pub use scheduler::NotificationScheduler;
pub use session::{RecurringOutcome, Session};
pub use storage::{AccountStore, UserVault};
pub use store::{IdAllocator, ReminderStore};
pub use timetable::{
    subject_reminder, ChildSchedule, ReminderKind, SchoolDay, WeekSchedule,
};

/// Re-export commonly used types
pub use chrono::{NaiveDate, NaiveDateTime, Weekday};
pub use serde::{Deserialize, Serialize};
