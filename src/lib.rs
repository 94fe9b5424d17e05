// src/lib.rs
//! sealed-file-vault: encryption at rest for stored files
//!
//! Features:
//! - AES-256-GCM envelopes bound to the file's storage path
//! - One random key per file, held by an external secret store
//! - Crash-safe write-then-rename transforms
//! - Per-file locking around key creation and plaintext serving

pub mod aliases;
pub mod cipher;
pub mod config;
pub mod consts;
pub mod error;
pub mod file_id;
pub mod file_ops;
pub mod key_manager;
pub mod key_ops;
pub mod locks;
pub mod pipeline;
pub mod secret_store;
pub mod share;

// Re-export everything users need at the crate root
pub use aliases::{FileKey32, PlainText, SecureRandomExt};
pub use config::{load as load_config, Config};
pub use error::{Result, StoreError, VaultError};
pub use file_id::FileId;
pub use key_manager::KeyManager;
pub use pipeline::VaultPipeline;
pub use secret_store::{MemorySecretStore, SecretStore, SqlCipherSecretStore};
pub use share::ShareToken;
