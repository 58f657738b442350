use std::path::PathBuf;

use serde::Deserialize;
use vitrine_core::Limits;
use vitrine_core::render::DEFAULT_CURRENCY;

use crate::store::{StoreType, default_store_path};

/// Byte budget of the local store, the usual browser local-storage size.
pub const DEFAULT_STORE_CAPACITY: u64 = 5 * 1024 * 1024;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub limits: Limits,
    pub currency: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            limits: Limits::default(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub r#type: StoreType,
    pub path: Option<PathBuf>,
    #[serde(default = "default_capacity")]
    pub capacity: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            r#type: StoreType::default(),
            path: None,
            capacity: DEFAULT_STORE_CAPACITY,
        }
    }
}

fn default_capacity() -> u64 {
    DEFAULT_STORE_CAPACITY
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("vitrine").join("config.toml"))
}

pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };

    let Ok(content) = std::fs::read_to_string(path) else {
        return Config::default();
    };

    parse_config(&content)
}

/// Parses a config file, falling back to defaults if it is malformed.
pub fn parse_config(content: &str) -> Config {
    match toml::from_str(content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(error = %err, "Ignoring malformed config file");
            Config::default()
        }
    }
}

/// Where and how the catalog is stored, after CLI overrides.
#[derive(Debug, PartialEq, Eq)]
pub struct StoreSettings {
    pub store_type: StoreType,
    pub path: PathBuf,
    pub capacity: u64,
}

pub fn resolve_store_config(config: &Config, cli_type: Option<StoreType>, cli_path: Option<PathBuf>) -> StoreSettings {
    StoreSettings {
        store_type: cli_type.unwrap_or(config.store.r#type),
        path: cli_path
            .or_else(|| config.store.path.clone())
            .unwrap_or_else(default_store_path),
        capacity: config.store.capacity,
    }
}
