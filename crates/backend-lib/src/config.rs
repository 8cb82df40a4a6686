// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::password::{scrypt_params, PasswordRequirements, TEMPORARY_PASSWORD_LENGTH};
use crate::validation::MAX_PASSWORD_LENGTH;

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "timeclock.toml";

/// Prefix of environment overrides, e.g. `TIMECLOCK_PASSWORD__SCRYPT_LOG_N`
pub const ENV_PREFIX: &str = "TIMECLOCK_";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("invalid scrypt cost log_n = {0}")]
    InvalidHashCost(u8),
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Directory holding the flat-file employee records
    pub data_dir: PathBuf,
    /// Log level, overridden by `RUST_LOG`
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Upper bound of every storage round trip
    pub storage_timeout_ms: u64,
    /// Refuse logins of disabled employees
    pub enforce_disabled: bool,
    /// Origins allowed by CORS
    pub allowed_origins: Vec<String>,
    pub password: PasswordSettings,
}

/// Password hashing and policy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordSettings {
    /// scrypt cost as log2(N)
    pub scrypt_log_n: u8,
    /// Length of generated temporary passwords
    pub temporary_length: usize,
    /// Reject new passwords failing `requirements`
    pub enforce_strength: bool,
    pub requirements: PasswordRequirements,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            log_json: false,
            storage_timeout_ms: 5_000,
            enforce_disabled: false,
            allowed_origins: vec!["http://localhost:4200".to_string()],
            password: PasswordSettings::default(),
        }
    }
}

impl Default for PasswordSettings {
    fn default() -> Self {
        Self {
            scrypt_log_n: scrypt::Params::RECOMMENDED_LOG_N,
            temporary_length: TEMPORARY_PASSWORD_LENGTH,
            enforce_strength: false,
            requirements: PasswordRequirements::default(),
        }
    }
}

impl Settings {
    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms)
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "log_level must be one of {LOG_LEVELS:?}, got {:?}",
                self.log_level
            )));
        }

        if self.storage_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "storage_timeout_ms must be greater than zero".to_string(),
            ));
        }

        if !(8..=MAX_PASSWORD_LENGTH).contains(&self.password.temporary_length) {
            return Err(ConfigError::Invalid(format!(
                "password.temporary_length must be between 8 and {MAX_PASSWORD_LENGTH}"
            )));
        }

        if self.password.enforce_strength && self.password.requirements.min_length < 8 {
            return Err(ConfigError::Invalid(
                "password.requirements.min_length must be at least 8".to_string(),
            ));
        }

        scrypt_params(self.password.scrypt_log_n)
            .map_err(|_| ConfigError::InvalidHashCost(self.password.scrypt_log_n))?;

        Ok(())
    }

    /// Layered sources: defaults, then `path`, then the environment
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load settings from the default file and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Load settings from `path` and the environment.
    ///
    /// A missing file is not an error; its layer is simply empty.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings: Settings = Self::figment(path).extract()?;
        settings.validate()?;
        Ok(settings)
    }
}
