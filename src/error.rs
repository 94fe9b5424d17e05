// src/error.rs
//! Public error types for the entire crate

use thiserror::Error;

use crate::file_id::FileId;

/// Failure reported by a [`SecretStore`](crate::secret_store::SecretStore) backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("no secret stored at {0}")]
    NotFound(String),

    #[error("secret store unreachable: {0}")]
    Unreachable(String),
}

/// Every way a seal or unseal can fail
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("no encryption key stored for file {0}")]
    KeyNotFound(FileId),

    // One message for every cause: wrong key, tampering, truncation, stale path.
    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("malformed envelope: {len} bytes is shorter than nonce + tag")]
    MalformedEnvelope { len: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("secret store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("stored key material for file {0} is not a 256-bit key")]
    InvalidKeyMaterial(FileId),

    #[error("encryption failed")]
    EncryptionFailed,

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, VaultError>;
