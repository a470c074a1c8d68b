//! On-disk persistence: per-user data bundles and the account registry
//!
//! Each user owns one JSON bundle under the data directory. Writes go
//! through a temp file and an atomic rename so an interrupted save never
//! leaves a half-written bundle behind.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::TanbihConfig;
use crate::error::{Result, TanbihError};
use crate::models::UserData;
use tanbih_common::constants::{BUNDLE_EXTENSION, BUNDLE_PREFIX, USERS_FILENAME};

/// Loads and saves one user's data bundle
#[derive(Debug, Clone)]
pub struct UserVault {
    data_dir: PathBuf,
}

impl UserVault {
    /// Vault rooted at the configured data directory
    #[must_use]
    pub fn new(config: &TanbihConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
        }
    }

    /// Path of a user's bundle file
    #[must_use]
    pub fn bundle_path(&self, username: &str) -> PathBuf {
        self.data_dir
            .join(format!("{BUNDLE_PREFIX}{username}.{BUNDLE_EXTENSION}"))
    }

    /// Load a user's bundle; a missing file yields an empty default bundle.
    ///
    /// # Errors
    /// `Io` on unreadable files, `Serialization` on malformed JSON.
    pub fn load(&self, username: &str) -> Result<UserData> {
        validate_username(username)?;
        let path = self.bundle_path(username);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(username, "no bundle on disk, starting empty");
                return Ok(UserData::default());
            }
            Err(err) => return Err(err.into()),
        };
        let data: UserData = serde_json::from_str(&raw)?;
        debug!(username, reminders = data.reminders.len(), "bundle loaded");
        Ok(data)
    }

    /// Save a user's bundle atomically.
    ///
    /// # Errors
    /// `Io` when the directory or file cannot be written, `Serialization`
    /// when the bundle cannot be encoded.
    pub fn save(&self, username: &str, data: &UserData) -> Result<()> {
        validate_username(username)?;
        let raw = serde_json::to_string_pretty(data)?;
        write_atomic(&self.bundle_path(username), &raw)?;
        debug!(username, reminders = data.reminders.len(), "bundle saved");
        Ok(())
    }
}

/// Registered accounts, one shared JSON file.
///
/// Passwords are stored and compared verbatim; the registry only guards a
/// local data directory.
#[derive(Debug)]
pub struct AccountStore {
    path: PathBuf,
    accounts: BTreeMap<String, String>,
}

impl AccountStore {
    /// Open the registry under the configured data directory; a missing
    /// file yields an empty registry.
    ///
    /// # Errors
    /// `Io` on unreadable files, `Serialization` on malformed JSON.
    pub fn open(config: &TanbihConfig) -> Result<Self> {
        let path = config.data_dir.join(USERS_FILENAME);
        let accounts = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, accounts })
    }

    /// Create an account and persist the registry.
    ///
    /// # Errors
    /// `InvalidUsername` for unusable names, `AccountExists` for taken
    /// ones, plus persistence errors.
    pub fn register(&mut self, username: &str, password: &str) -> Result<()> {
        validate_username(username)?;
        if self.accounts.contains_key(username) {
            return Err(TanbihError::AccountExists {
                username: username.to_string(),
            });
        }
        self.accounts
            .insert(username.to_string(), password.to_string());
        self.persist()?;
        debug!(username, "account registered");
        Ok(())
    }

    /// Check a username and password pair.
    ///
    /// # Errors
    /// `InvalidCredentials` when the pair does not match a registered
    /// account; unknown usernames report the same error as wrong passwords.
    pub fn verify(&self, username: &str, password: &str) -> Result<()> {
        match self.accounts.get(username) {
            Some(stored) if stored == password => Ok(()),
            _ => Err(TanbihError::InvalidCredentials),
        }
    }

    /// True when an account with this name exists
    #[must_use]
    pub fn exists(&self, username: &str) -> bool {
        self.accounts.contains_key(username)
    }

    /// All registered usernames in sorted order
    #[must_use]
    pub fn usernames(&self) -> Vec<String> {
        self.accounts.keys().cloned().collect()
    }

    /// Number of registered accounts
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// True when no accounts are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn persist(&self) -> Result<()> {
        let raw = serde_json::to_string_pretty(&self.accounts)?;
        write_atomic(&self.path, &raw)
    }
}

/// Usernames become file names, so they are limited to letters, digits,
/// underscore and hyphen; path separators and dots are rejected.
fn validate_username(username: &str) -> Result<()> {
    let usable = !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-');
    if usable {
        Ok(())
    } else {
        Err(TanbihError::InvalidUsername {
            username: username.to_string(),
        })
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_user_data;
    use tempfile::tempdir;

    fn config_in(dir: &Path) -> TanbihConfig {
        TanbihConfig::new(dir)
    }

    #[test]
    fn test_load_missing_bundle_yields_default() {
        let dir = tempdir().unwrap();
        let vault = UserVault::new(&config_in(dir.path()));
        let data = vault.load("sara").unwrap();
        assert!(data.reminders.is_empty());
        assert!(data.schedules.is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let vault = UserVault::new(&config_in(dir.path()));
        let data = sample_user_data();

        vault.save("sara", &data).unwrap();
        let loaded = vault.load("sara").unwrap();
        assert_eq!(loaded.reminders.len(), 3);
        assert_eq!(loaded.reminders[0].text, "دواء الضغط");
        assert_eq!(loaded.theme, data.theme);
    }

    #[test]
    fn test_save_creates_missing_data_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("deep").join("tanbih");
        let vault = UserVault::new(&config_in(&nested));
        vault.save("omar", &UserData::default()).unwrap();
        assert!(vault.bundle_path("omar").exists());
    }

    #[test]
    fn test_bundle_path_shape() {
        let vault = UserVault::new(&config_in(Path::new("/tmp/tanbih")));
        assert_eq!(
            vault.bundle_path("sara"),
            PathBuf::from("/tmp/tanbih/data_sara.json")
        );
    }

    #[test]
    fn test_corrupt_bundle_is_a_serialization_error() {
        let dir = tempdir().unwrap();
        let vault = UserVault::new(&config_in(dir.path()));
        fs::write(vault.bundle_path("sara"), "{not json").unwrap();
        let result = vault.load("sara");
        assert!(matches!(result, Err(TanbihError::Serialization(_))));
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let vault = UserVault::new(&config_in(dir.path()));
        vault.save("sara", &UserData::default()).unwrap();
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry.file_name().to_string_lossy().ends_with(".tmp")
            })
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_register_and_verify() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let mut accounts = AccountStore::open(&config).unwrap();

        accounts.register("sara", "s3cret").unwrap();
        assert!(accounts.exists("sara"));
        accounts.verify("sara", "s3cret").unwrap();

        let wrong = accounts.verify("sara", "other");
        assert!(matches!(wrong, Err(TanbihError::InvalidCredentials)));
        let unknown = accounts.verify("omar", "s3cret");
        assert!(matches!(unknown, Err(TanbihError::InvalidCredentials)));
    }

    #[test]
    fn test_register_duplicate_is_rejected() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let mut accounts = AccountStore::open(&config).unwrap();

        accounts.register("sara", "one").unwrap();
        let result = accounts.register("sara", "two");
        assert!(matches!(result, Err(TanbihError::AccountExists { .. })));
        // The original password must survive the rejected attempt
        accounts.verify("sara", "one").unwrap();
    }

    #[test]
    fn test_usernames_listed_sorted() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let mut accounts = AccountStore::open(&config).unwrap();

        accounts.register("omar", "pw").unwrap();
        accounts.register("abu-bakr", "pw").unwrap();
        accounts.register("sara", "pw").unwrap();

        assert_eq!(accounts.usernames(), vec!["abu-bakr", "omar", "sara"]);
    }

    #[test]
    fn test_registry_survives_reopen() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        {
            let mut accounts = AccountStore::open(&config).unwrap();
            accounts.register("sara", "s3cret").unwrap();
        }
        let reopened = AccountStore::open(&config).unwrap();
        assert_eq!(reopened.len(), 1);
        reopened.verify("sara", "s3cret").unwrap();
    }

    #[test]
    fn test_username_charset() {
        for bad in ["", "a/b", "../etc", "a b", "dot.name", "semi;colon"] {
            assert!(
                matches!(validate_username(bad), Err(TanbihError::InvalidUsername { .. })),
                "expected rejection for {bad:?}"
            );
        }
        for good in ["sara", "omar_123", "abu-bakr", "أحمد"] {
            validate_username(good).unwrap();
        }
    }

    #[test]
    fn test_vault_rejects_path_traversal_names() {
        let dir = tempdir().unwrap();
        let vault = UserVault::new(&config_in(dir.path()));
        let result = vault.load("../outside");
        assert!(matches!(result, Err(TanbihError::InvalidUsername { .. })));
    }
}
