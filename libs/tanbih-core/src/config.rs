//! Configuration management for tanbih data storage

use std::path::{Path, PathBuf};

use tanbih_common::DATA_DIR_NAME;

/// Configuration for the tanbih data directory
#[derive(Debug, Clone)]
pub struct TanbihConfig {
    /// Directory holding the credential store and the per-user bundles
    pub data_dir: PathBuf,
}

impl TanbihConfig {
    /// Create a configuration with a custom data directory
    #[must_use]
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// Create a configuration with the platform default data directory
    #[must_use]
    pub fn with_default_dir() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
        }
    }

    /// Resolve the default data directory.
    ///
    /// Uses `$XDG_DATA_HOME/tanbih`, then `$HOME/.local/share/tanbih`. With
    /// neither variable set the directory is relative to the working
    /// directory, which keeps containerized runs working.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            if !xdg.is_empty() {
                return PathBuf::from(xdg).join(DATA_DIR_NAME);
            }
        }
        if let Ok(home) = std::env::var("HOME") {
            if !home.is_empty() {
                return PathBuf::from(home)
                    .join(".local")
                    .join("share")
                    .join(DATA_DIR_NAME);
            }
        }
        PathBuf::from(DATA_DIR_NAME)
    }

    /// Create configuration from environment variables
    ///
    /// Reads `TANBIH_DATA_DIR`, falling back to the default directory chain
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var("TANBIH_DATA_DIR")
            .map_or_else(|_| Self::with_default_dir(), Self::new)
    }
}

impl Default for TanbihConfig {
    fn default() -> Self {
        Self::with_default_dir()
    }
}
