use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub mod migrate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_max_freeze_days")]
    pub max_freeze_days: i64,
    #[serde(default = "default_cancel_cutoff_hours")]
    pub cancel_cutoff_hours: i64,
    #[serde(default = "default_gym_capacity")]
    pub gym_capacity: i64,
    #[serde(default = "default_peak_window_days")]
    pub peak_window_days: i64,
    #[serde(default = "default_expiring_notice_days")]
    pub expiring_notice_days: i64,
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_max_freeze_days() -> i64 {
    30
}
fn default_cancel_cutoff_hours() -> i64 {
    24
}
fn default_gym_capacity() -> i64 {
    50
}
fn default_peak_window_days() -> i64 {
    30
}
fn default_expiring_notice_days() -> i64 {
    7
}
fn default_busy_timeout_ms() -> u64 {
    crate::db::pool::DEFAULT_BUSY_TIMEOUT_MS
}

/// Keys every config file should carry (`config --check`).
pub const CONFIG_KEYS: &[&str] = &[
    "database",
    "max_freeze_days",
    "cancel_cutoff_hours",
    "gym_capacity",
    "peak_window_days",
    "expiring_notice_days",
    "busy_timeout_ms",
];

impl Default for Config {
    fn default() -> Self {
        Self::with_database(Self::database_file().to_string_lossy().to_string())
    }
}

impl Config {
    fn with_database(database: String) -> Self {
        Self {
            database,
            max_freeze_days: default_max_freeze_days(),
            cancel_cutoff_hours: default_cancel_cutoff_hours(),
            gym_capacity: default_gym_capacity(),
            peak_window_days: default_peak_window_days(),
            expiring_notice_days: default_expiring_notice_days(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }

    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("gymledger")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".gymledger")
        }
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join("gymledger.conf")
    }

    pub fn database_file() -> PathBuf {
        Self::config_dir().join("gymledger.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        let yaml = serde_yaml::to_string(self).map_err(|_| AppError::ConfigSave)?;
        fs::write(path, yaml).map_err(|_| AppError::ConfigSave)
    }

    /// Create the config directory, the config file (unless `is_test`) and an
    /// empty database file. Returns the database path.
    pub fn init_all(custom_db: Option<&str>, is_test: bool) -> AppResult<PathBuf> {
        let dir = Self::config_dir();
        if !is_test {
            fs::create_dir_all(&dir)?;
        }

        let db_path = match custom_db {
            Some(name) => {
                let p = crate::utils::path::expand_tilde(name);
                if p.is_absolute() { p } else { dir.join(p) }
            }
            None => Self::database_file(),
        };

        if !is_test {
            let config = Self::with_database(db_path.to_string_lossy().to_string());
            config.save(&Self::config_file())?;
            success(format!("Config file: {}", Self::config_file().display()));
        }

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        Ok(db_path)
    }
}
