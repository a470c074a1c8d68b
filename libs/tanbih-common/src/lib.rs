//! Tanbih Common - Shared constants and formatting utilities
//!
//! This crate provides the constants and small helpers shared between the
//! core library and the CLI.
//!
//! # Examples
//!
//! ```
//! use tanbih_common::{USERS_FILENAME, parse_reminder_datetime, truncate_string};
//!
//! // Use constants
//! assert_eq!(USERS_FILENAME, "users.json");
//!
//! // Use utility functions
//! let dt = parse_reminder_datetime("2024-01-01T08:00").unwrap();
//! assert_eq!(dt.format("%H:%M").to_string(), "08:00");
//!
//! let truncated = truncate_string("hello world", 5);
//! assert_eq!(truncated, "he...");
//! ```

pub mod constants;
pub mod utils;

pub use constants::*;
pub use utils::*;
