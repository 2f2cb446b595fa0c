//! Runtime configuration for hosts embedding the menu cache.
//!
//! # Responsibility
//! - Resolve the database path and logging settings from explicit values,
//!   then environment, then defaults.
//!
//! # Invariants
//! - Blank values count as unset.
//! - The resolved log level is always one `init_logging` accepts when taken
//!   from the default.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "DINING_CACHE_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "DINING_CACHE_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "DINING_CACHE_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "dining_cache.sqlite3";

/// Resolved cache settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
}

impl CacheConfig {
    /// Resolves settings from the process environment.
    pub fn from_env() -> Self {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup`, which maps an environment key to
    /// its value.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(default_db_path),
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
        }
    }

    /// Applies explicit overrides on top of resolved values.
    pub fn with_overrides(
        mut self,
        db_path: Option<PathBuf>,
        log_level: Option<String>,
        log_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(path) = db_path {
            self.db_path = path;
        }
        if let Some(level) = log_level {
            self.log_level = level;
        }
        if log_dir.is_some() {
            self.log_dir = log_dir;
        }
        self
    }
}

/// Database file used when nothing else is configured.
pub fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}
