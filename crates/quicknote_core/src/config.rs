//! Core configuration.
//!
//! Loaded with figment from, in increasing precedence:
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. environment variables prefixed with `QUICKNOTE_`, nested with `__`
//!    (for example `QUICKNOTE_STORAGE__BACKEND=sqlite`)

use crate::logging::{default_log_level, normalize_level};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Slot name used by the web build.
pub const DEFAULT_STORAGE_KEY: &str = "notes-app-data";

const DEFAULT_DATA_DIR: &str = "quicknote-data";
const ENV_PREFIX: &str = "QUICKNOTE_";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(Box<figment::Error>),
    #[error("invalid configuration: {message}")]
    Validation { message: String },
}

impl From<figment::Error> for ConfigError {
    fn from(value: figment::Error) -> Self {
        Self::Load(Box::new(value))
    }
}

/// Top-level configuration for the notes core.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Which slot backend the store persists through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    File,
    Sqlite,
    None,
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::Sqlite => "sqlite",
            Self::None => "none",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Slot directory for `file`, database file for `sqlite`.
    pub path: PathBuf,
    /// Slot name holding the serialized collection.
    pub key: String,
    /// Byte quota, honored by the `memory` backend only.
    pub quota_bytes: Option<usize>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: PathBuf::from(DEFAULT_DATA_DIR),
            key: DEFAULT_STORAGE_KEY.to_string(),
            quota_bytes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of `trace|debug|info|warn|error`.
    pub level: String,
    /// Absolute log directory. File logging stays off when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

impl CoreConfig {
    /// Loads defaults and environment overrides.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(None)
    }

    /// Loads defaults, then `config_file` when given, then the environment.
    ///
    /// A missing file is ignored.
    pub fn load_from(config_file: Option<&Path>) -> ConfigResult<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(CoreConfig::default()));
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }
        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extracts and validates a configuration from a prepared figment.
    pub fn extract(figment: Figment) -> ConfigResult<Self> {
        let config: CoreConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.storage.key.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: "storage.key cannot be empty".to_string(),
            });
        }

        normalize_level(&self.logging.level)
            .map_err(|err| ConfigError::Validation {
                message: format!("logging.level: {err}"),
            })?;

        if let Some(dir) = &self.logging.dir {
            if !dir.is_absolute() {
                return Err(ConfigError::Validation {
                    message: format!(
                        "logging.dir must be an absolute path, got `{}`",
                        dir.display()
                    ),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_use_file_backend_and_web_slot_name() {
        let config = CoreConfig::default();
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.key, "notes-app-data");
        assert!(config.logging.dir.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn toml_file_and_env_override_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "quicknote.toml",
                r#"
                [storage]
                backend = "sqlite"
                path = "notes.db"

                [logging]
                level = "warn"
                "#,
            )?;
            jail.set_env("QUICKNOTE_STORAGE__KEY", "custom-slot");

            let config = CoreConfig::load_from(Some(Path::new("quicknote.toml")))
                .map_err(|err| err.to_string())?;
            assert_eq!(config.storage.backend, StorageBackend::Sqlite);
            assert_eq!(config.storage.path, PathBuf::from("notes.db"));
            assert_eq!(config.storage.key, "custom-slot");
            assert_eq!(config.logging.level, "warn");
            Ok(())
        });
    }

    #[test]
    fn validation_rejects_relative_log_dir() {
        let mut config = CoreConfig::default();
        config.logging.dir = Some(PathBuf::from("logs"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn validation_rejects_unknown_level_and_blank_key() {
        let mut config = CoreConfig::default();
        config.logging.level = "loud".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { .. })
        ));

        let mut config = CoreConfig::default();
        config.storage.key = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { .. })
        ));
    }
}
