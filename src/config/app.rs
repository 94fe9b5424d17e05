// src/config/app.rs
use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;
use tracing::warn;

use super::defaults::*;
use crate::error::{Result, VaultError};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_keys")]
    pub keys: Keys,
    #[serde(default = "default_paths")]
    pub paths: Paths,
    #[serde(default = "default_features")]
    pub features: Features,
    #[serde(default = "default_share")]
    pub share: Share,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Keys {
    pub store_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paths {
    pub secret_db: PathBuf,
    pub scratch_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Features {
    pub use_dev_keys: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Share {
    pub token_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            keys: default_keys(),
            paths: default_paths(),
            features: default_features(),
            share: default_share(),
        }
    }
}

impl Config {
    /// Parse a TOML config file; missing sections fall back to defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
            .map_err(|e| VaultError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml(content: &str) -> Result<Config> {
        let conf: Config =
            toml::from_str(content).map_err(|e| VaultError::Config(e.to_string()))?;
        if conf.share.token_bytes == 0 {
            return Err(VaultError::Config("share.token_bytes must be > 0".into()));
        }
        Ok(conf)
    }

    /// Apply `SFV_SECRET_DB`, `SFV_SCRATCH_DIR` and `SFV_STORE_KEY` overrides
    pub fn with_env_overrides(mut self) -> Config {
        if let Ok(db) = env::var("SFV_SECRET_DB") {
            self.paths.secret_db = db.into();
        }
        if let Ok(dir) = env::var("SFV_SCRATCH_DIR") {
            self.paths.scratch_dir = dir.into();
        }
        if let Ok(key) = env::var("SFV_STORE_KEY") {
            self.keys.store_key = key;
            self.features.use_dev_keys = false;
        }
        self
    }

    /// The passphrase protecting the secret store.
    ///
    /// Outside dev mode the built-in key is refused and `SFV_STORE_KEY` must
    /// have supplied one.
    pub fn store_key(&self) -> Result<&str> {
        if !self.features.use_dev_keys && self.keys.store_key == DEFAULT_STORE_KEY {
            return Err(VaultError::Config(
                "SFV_STORE_KEY required when use_dev_keys = false".into(),
            ));
        }
        Ok(&self.keys.store_key)
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Load config once per process, falling back to defaults if missing or invalid
pub fn load() -> &'static Config {
    CONFIG.get_or_init(|| {
        let config_path =
            env::var("SFV_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let conf = if Path::new(&config_path).exists() {
            Config::from_file(&config_path).unwrap_or_else(|e| {
                warn!(path = %config_path, error = %e, "invalid config, using built-in defaults");
                Config::default()
            })
        } else {
            warn!(path = %config_path, "config file not found, using built-in defaults");
            Config::default()
        };

        conf.with_env_overrides()
    })
}
