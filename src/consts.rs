// src/consts.rs
//! Shared constants: envelope layout and storage conventions

/// AES-GCM nonce length (96 bits)
pub const NONCE_LEN: usize = 12;

/// AES-GCM authentication tag length
pub const TAG_LEN: usize = 16;

/// Shortest possible envelope: nonce + tag over an empty plaintext
pub const MIN_ENVELOPE_LEN: usize = NONCE_LEN + TAG_LEN;

/// Symmetric key length in bytes
pub const KEY_LEN: usize = 32;

/// Suffix appended to a target path while its replacement is being written
pub const PENDING_SUFFIX: &str = ".tmp";

/// Secret-store namespace under which per-file keys live
pub const KEY_PATH_PREFIX: &str = "secret/data/file-encryption-key";

/// Default entropy of a share-link token (matches `token_urlsafe(32)`)
pub const DEFAULT_SHARE_TOKEN_BYTES: usize = 32;

/// Random characters in the name of each scratch directory
pub const SCRATCH_RAND_CHARS: usize = 16;

/// Prefix of each scratch directory created to serve a shared copy
pub const SCRATCH_PREFIX: &str = "share-";
