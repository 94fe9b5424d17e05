// src/share.rs
//! Unguessable share-link tokens
//!
//! A token is N bytes from the OS-seeded CSPRNG rendered as URL-safe base64
//! without padding; 32 bytes give a 43-character token. Tokens compare in
//! constant time so a lookup cannot be timed character by character.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::consts::DEFAULT_SHARE_TOKEN_BYTES;

#[derive(Clone, Eq)]
pub struct ShareToken(String);

impl ShareToken {
    /// Fresh token over `bytes` random bytes
    pub fn generate(bytes: usize) -> Self {
        let mut raw = Zeroizing::new(vec![0u8; bytes]);
        rand::rng().fill_bytes(raw.as_mut_slice());
        Self(URL_SAFE_NO_PAD.encode(raw.as_slice()))
    }

    /// Accept `s` only if it decodes to exactly `bytes` bytes of URL-safe base64
    pub fn parse(s: &str, bytes: usize) -> Option<Self> {
        let decoded = Zeroizing::new(URL_SAFE_NO_PAD.decode(s).ok()?);
        (decoded.len() == bytes).then(|| Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ShareToken {
    fn default() -> Self {
        Self::generate(DEFAULT_SHARE_TOKEN_BYTES)
    }
}

impl PartialEq for ShareToken {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl fmt::Display for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Tokens grant access; keep them out of logs.
impl fmt::Debug for ShareToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ShareToken([REDACTED])")
    }
}
