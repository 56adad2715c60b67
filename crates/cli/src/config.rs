//! CLI configuration: four keys, stored as TOML at `~/.dispatchq/config.toml`.
//!
//! Loaded once per invocation and threaded explicitly through constructors;
//! there is deliberately no global config singleton.

use serde::{Deserialize, Serialize};

use dispatchq_core::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default tolerated failures before the DLQ
    pub max_retries: i32,
    /// Base for exponential backoff
    pub backoff_base: f64,
    /// Path to the SQLite database
    pub db_path: String,
    /// Default number of workers
    pub worker_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base: 2.0,
            db_path: shellexpand::tilde("~/.dispatchq/jobs.db").into_owned(),
            worker_count: 1,
        }
    }
}

pub const CONFIG_KEYS: [&str; 4] = ["max_retries", "backoff_base", "db_path", "worker_count"];

impl Config {
    pub fn path() -> String {
        shellexpand::tilde("~/.dispatchq/config.toml").into_owned()
    }

    /// Load from the config file, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        let path = Self::path();
        match std::fs::read_to_string(&path) {
            Ok(raw) => toml::from_str(&raw)
                .map_err(|e| AppError::Config(format!("invalid config file {path}: {e}"))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(AppError::Config(format!("failed to read {path}: {e}"))),
        }
    }

    /// Persist to the config file, creating the directory if needed
    pub fn save(&self) -> Result<()> {
        let path = Self::path();
        if let Some(parent) = std::path::Path::new(&path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(&path, raw)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "max_retries" => Ok(self.max_retries.to_string()),
            "backoff_base" => Ok(self.backoff_base.to_string()),
            "db_path" => Ok(self.db_path.clone()),
            "worker_count" => Ok(self.worker_count.to_string()),
            other => Err(unknown_key(other)),
        }
    }

    /// Update one key from its string form (does not persist)
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "max_retries" => {
                let parsed: i32 = value
                    .parse()
                    .map_err(|_| AppError::Validation("max_retries must be an integer".into()))?;
                if parsed < 0 {
                    return Err(AppError::Validation(
                        "max_retries cannot be negative".into(),
                    ));
                }
                self.max_retries = parsed;
            }
            "backoff_base" => {
                self.backoff_base = value
                    .parse()
                    .map_err(|_| AppError::Validation("backoff_base must be a number".into()))?;
            }
            "db_path" => {
                self.db_path = shellexpand::tilde(value).into_owned();
            }
            "worker_count" => {
                let parsed: usize = value
                    .parse()
                    .map_err(|_| AppError::Validation("worker_count must be an integer".into()))?;
                if parsed < 1 {
                    return Err(AppError::Validation(
                        "worker_count must be at least 1".into(),
                    ));
                }
                self.worker_count = parsed;
            }
            other => return Err(unknown_key(other)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> AppError {
    AppError::Validation(format!(
        "unknown config key: {key} (valid: {})",
        CONFIG_KEYS.join(", ")
    ))
}
