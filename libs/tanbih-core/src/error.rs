//! Error types for the tanbih core library

use thiserror::Error;

/// Result type alias for tanbih operations
pub type Result<T> = std::result::Result<T, TanbihError>;

/// Main error type for tanbih operations
#[derive(Error, Debug)]
pub enum TanbihError {
    /// Reminder text empty or start date/time unset
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Recurrence requested without an end date
    #[error("An end date is required for recurring reminders")]
    MissingEndDate,

    /// End date falls before the start date/time
    #[error("Invalid range: end date {end} is before the start {start}")]
    InvalidRange { start: String, end: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Conversion service returned an empty or unusable payload
    #[error("Calendar conversion failed: {message}")]
    Conversion { message: String },

    #[error("Account already exists: {username}")]
    AccountExists { username: String },

    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Usernames name bundle files on disk, so the charset is restricted
    #[error("Invalid username: {username}")]
    InvalidUsername { username: String },

    #[error("No reminder with id {id}")]
    UnknownReminder { id: i64 },

    #[error("No schedule for child: {name}")]
    UnknownChild { name: String },

    #[error("Lesson period out of range: {period}")]
    InvalidPeriod { period: usize },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl TanbihError {
    /// Create an invalid-input validation error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an invalid-range validation error
    pub fn invalid_range(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self::InvalidRange {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Create a conversion-service error
    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Whether this error is a user mistake (bad reminder form input) rather
    /// than an operational fault
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. } | Self::MissingEndDate | Self::InvalidRange { .. }
        )
    }

    /// The message shown to the user for this failure
    #[must_use]
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_serialization_error_from_serde() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error: TanbihError = json_error.into();

        match error {
            TanbihError::Serialization(_) => (),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_io_error_from_std() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: TanbihError = io_error.into();

        match error {
            TanbihError::Io(_) => (),
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_invalid_input_helper() {
        let error = TanbihError::invalid_input("reminder text is empty");

        match error {
            TanbihError::InvalidInput { message } => {
                assert_eq!(message, "reminder text is empty");
            }
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_invalid_range_helper() {
        let error = TanbihError::invalid_range("2024-05-01T08:00", "2024-04-30");

        match &error {
            TanbihError::InvalidRange { start, end } => {
                assert_eq!(start, "2024-05-01T08:00");
                assert_eq!(end, "2024-04-30");
            }
            _ => panic!("Expected InvalidRange error"),
        }
        assert!(error.to_string().contains("2024-04-30"));
        assert!(error.to_string().contains("2024-05-01T08:00"));
    }

    #[test]
    fn test_missing_end_date_display() {
        let error = TanbihError::MissingEndDate;
        assert!(error.to_string().contains("end date"));
    }

    #[test]
    fn test_conversion_helper() {
        let error = TanbihError::conversion("empty response");

        match error {
            TanbihError::Conversion { message } => {
                assert_eq!(message, "empty response");
            }
            _ => panic!("Expected Conversion error"),
        }
    }

    #[test]
    fn test_configuration_helper() {
        let error = TanbihError::configuration("no data directory");

        match error {
            TanbihError::Configuration { message } => {
                assert_eq!(message, "no data directory");
            }
            _ => panic!("Expected Configuration error"),
        }
    }

    #[test]
    fn test_account_errors_display() {
        let exists = TanbihError::AccountExists {
            username: "um_sara".to_string(),
        };
        assert!(exists.to_string().contains("um_sara"));

        let invalid = TanbihError::InvalidUsername {
            username: "../evil".to_string(),
        };
        assert!(invalid.to_string().contains("../evil"));

        let creds = TanbihError::InvalidCredentials;
        assert!(creds.to_string().contains("username or password"));
    }

    #[test]
    fn test_timetable_errors_display() {
        let child = TanbihError::UnknownChild {
            name: "سارة".to_string(),
        };
        assert!(child.to_string().contains("سارة"));

        let period = TanbihError::InvalidPeriod { period: 9 };
        assert!(period.to_string().contains('9'));
    }

    #[test]
    fn test_lookup_errors_display() {
        let reminder = TanbihError::UnknownReminder { id: 1706000000000 };
        assert!(reminder.to_string().contains("1706000000000"));
    }

    #[test]
    fn test_user_message_matches_display() {
        let error = TanbihError::MissingEndDate;
        assert_eq!(error.user_message(), error.to_string());
    }

    #[test]
    fn test_is_validation() {
        assert!(TanbihError::invalid_input("x").is_validation());
        assert!(TanbihError::MissingEndDate.is_validation());
        assert!(TanbihError::invalid_range("a", "b").is_validation());

        assert!(!TanbihError::InvalidCredentials.is_validation());
        assert!(!TanbihError::configuration("x").is_validation());
        let io_error: TanbihError = io::Error::new(io::ErrorKind::Other, "boom").into();
        assert!(!io_error.is_validation());
    }

    #[test]
    fn test_error_display_formatting() {
        let errors = vec![
            TanbihError::invalid_input("empty text"),
            TanbihError::MissingEndDate,
            TanbihError::invalid_range("2024-05-01T08:00", "2024-04-30"),
            TanbihError::conversion("empty response"),
            TanbihError::AccountExists {
                username: "user".to_string(),
            },
            TanbihError::InvalidCredentials,
            TanbihError::InvalidUsername {
                username: "a b".to_string(),
            },
            TanbihError::UnknownChild {
                name: "omar".to_string(),
            },
            TanbihError::InvalidPeriod { period: 7 },
            TanbihError::configuration("bad dir"),
        ];

        for error in errors {
            let error_string = error.to_string();
            assert!(!error_string.is_empty());
            assert!(error_string.len() > 10); // Should have meaningful content
        }
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_error() -> Result<String> {
            Err(TanbihError::invalid_input("test error"))
        }

        match returns_error() {
            Err(TanbihError::InvalidInput { message }) => {
                assert_eq!(message, "test error");
            }
            _ => panic!("Expected InvalidInput error"),
        }
    }
}
