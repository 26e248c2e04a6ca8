//! Store configuration.
//!
//! # Responsibility
//! - Carry the database location and busy timeout into [`crate::ApplicationStore`].
//! - Resolve the default location from the environment.
//!
//! # Invariants
//! - No process-wide path state; every store owns its own config.

use crate::db::DEFAULT_BUSY_TIMEOUT;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the default database path.
pub const DB_PATH_ENV: &str = "OUTREACH_DB_PATH";

/// Database file used when neither a path nor the env override is given.
pub const DEFAULT_DB_FILE_NAME: &str = "professor_applications.db";

/// Storage handle configuration passed to the store at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    /// How long a write waits on another process's file lock.
    pub busy_timeout: Duration,
}

impl StoreConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Uses `OUTREACH_DB_PATH` when set and non-blank, else
    /// `professor_applications.db` in the working directory.
    pub fn from_env() -> Self {
        Self::new(resolve_db_path(std::env::var(DB_PATH_ENV).ok().as_deref()))
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

fn resolve_db_path(raw: Option<&str>) -> PathBuf {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => PathBuf::from(DEFAULT_DB_FILE_NAME),
    }
}
