/// CLI configuration
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file, read from the working directory if present
pub const DEFAULT_CONFIG_FILE: &str = "derd.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DerdConfig {
    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default)]
    pub user: UserSettings,

    #[serde(default = "default_network")]
    pub network: NetworkSettings,

    #[serde(default = "default_sync")]
    pub sync: SyncSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    /// Holds `device.json` (local key-value store) and `remote.json`
    /// (stand-in for the cloud document store)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserSettings {
    /// Signed-in user; journal commands need one
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkSettings {
    #[serde(default = "default_online")]
    pub online: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncSettings {
    /// Flush queued entries before running a command when online
    #[serde(default = "default_flush_on_start")]
    pub flush_on_start: bool,
}

impl DerdConfig {
    /// Load configuration from file and environment
    ///
    /// `path` must exist when given; otherwise `derd.toml` is used if present.
    /// `DERD_`-prefixed variables override both, with `__` between section
    /// and key (`DERD_USER__ID`, `DERD_NETWORK__ONLINE`).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("DERD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Ok(settings.build()?.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "storage.data_dir cannot be empty".to_string(),
            ));
        }

        if let Some(id) = &self.user.id {
            if id.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "user.id cannot be blank (unset it to stay signed out)".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn device_store_path(&self) -> PathBuf {
        self.storage.data_dir.join("device.json")
    }

    pub fn remote_store_path(&self) -> PathBuf {
        self.storage.data_dir.join("remote.json")
    }
}

impl Default for DerdConfig {
    fn default() -> Self {
        Self {
            storage: default_storage(),
            user: UserSettings::default(),
            network: default_network(),
            sync: default_sync(),
        }
    }
}

// Default values
fn default_storage() -> StorageSettings {
    StorageSettings {
        data_dir: default_data_dir(),
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./.derd")
}

fn default_network() -> NetworkSettings {
    NetworkSettings {
        online: default_online(),
    }
}

fn default_online() -> bool {
    true
}

fn default_sync() -> SyncSettings {
    SyncSettings {
        flush_on_start: default_flush_on_start(),
    }
}

fn default_flush_on_start() -> bool {
    true
}
