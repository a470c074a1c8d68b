//! Constants shared across the tanbih crates

/// Credential store filename inside the data directory
pub const USERS_FILENAME: &str = "users.json";

/// Per-user bundle filename prefix; the full name is `data_<username>.json`
pub const BUNDLE_PREFIX: &str = "data_";

/// Per-user bundle filename extension
pub const BUNDLE_EXTENSION: &str = "json";

/// Data directory name under the platform data root
pub const DATA_DIR_NAME: &str = "tanbih";

/// Reminder date+time format, minute precision
pub const REMINDER_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Calendar date format
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Lesson periods per school day
pub const PERIODS_PER_DAY: usize = 7;

/// School days per week (Sunday through Thursday)
pub const SCHOOL_DAYS_PER_WEEK: usize = 5;
