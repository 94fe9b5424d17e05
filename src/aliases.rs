// src/aliases.rs
//! Re-exports secure-gate's ergonomic secret types
//!
//! These are the canonical secret types used throughout sealed-file-vault.

pub use secure_gate::{fixed_alias, SecureRandomExt};

use zeroize::Zeroizing;

// Fixed-size secrets
fixed_alias!(FileKey32, 32); // 256-bit AES-GCM per-file key

/// Decrypted file content, wiped from memory on drop
pub type PlainText = Zeroizing<Vec<u8>>;
