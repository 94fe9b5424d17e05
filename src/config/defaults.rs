// src/config/defaults.rs
use std::path::PathBuf;

use crate::config::app::{Features, Keys, Paths, Share};
use crate::consts::DEFAULT_SHARE_TOKEN_BYTES;

pub const DEFAULT_CONFIG_FILE: &str = "sfv-config.toml";
pub const DEFAULT_STORE_KEY: &str = "dev-secret-store-password-2025";

/// `<local data dir>/sealed-file-vault`, or `./.sfv` when the platform has none
pub fn data_root() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("sealed-file-vault"))
        .unwrap_or_else(|| PathBuf::from(".sfv"))
}

pub fn default_keys() -> Keys {
    Keys {
        store_key: DEFAULT_STORE_KEY.into(),
    }
}

pub fn default_paths() -> Paths {
    let root = data_root();
    Paths {
        secret_db: root.join("secrets.db"),
        scratch_dir: root.join("temp"),
    }
}

pub fn default_features() -> Features {
    Features { use_dev_keys: true }
}

pub fn default_share() -> Share {
    Share {
        token_bytes: DEFAULT_SHARE_TOKEN_BYTES,
    }
}
