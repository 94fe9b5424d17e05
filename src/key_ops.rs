// src/key_ops.rs
//! Key generation and store-boundary representation
//!
//! Keys are raw 32-byte arrays everywhere inside the crate. Only when they
//! cross into a (text-oriented) secret store are they encoded: hex on the way
//! out, hex or standard base64 accepted on the way back in.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use zeroize::Zeroizing;

use crate::aliases::{FileKey32, SecureRandomExt};
use crate::consts::KEY_LEN;

pub type Key = FileKey32;

/// Generate a new random 256-bit file key
#[inline]
pub fn generate_key() -> Key {
    Key::random()
}

/// Encode a key for storage (lowercase hex, 64 chars)
pub fn encode_key(key: &Key) -> Zeroizing<String> {
    Zeroizing::new(hex::encode(key.expose_secret()))
}

/// Decode a stored key value; `None` if it is not exactly 256 bits of hex or base64
pub fn decode_key(stored: &[u8]) -> Option<Key> {
    let text = std::str::from_utf8(stored).ok()?.trim();

    let raw = Zeroizing::new(if text.len() == KEY_LEN * 2 {
        hex::decode(text).ok()?
    } else {
        STANDARD.decode(text).ok()?
    });

    let bytes: [u8; KEY_LEN] = raw.as_slice().try_into().ok()?;
    Some(Key::new(bytes))
}
