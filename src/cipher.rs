// src/cipher.rs
//! AES-256-GCM sealing of whole buffers
//!
//! Envelope format (binary, no header or version byte):
//! ```text
//! [12 bytes: random nonce][N bytes: ciphertext][16 bytes: GCM tag]
//! ```
//!
//! The caller's associated data is authenticated but not stored. Opening an
//! envelope with different associated data fails exactly like a wrong key or
//! a flipped bit does.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key as GcmKey, Nonce};
use rand::RngCore;
use tracing::debug;

use crate::aliases::{FileKey32, PlainText};
use crate::consts::{MIN_ENVELOPE_LEN, NONCE_LEN};
use crate::error::{Result, VaultError};

/// Encrypt `plaintext` under `key` with a fresh random nonce.
///
/// Returns `nonce || ciphertext || tag`. Two calls with identical inputs
/// produce different envelopes.
pub fn seal(key: &FileKey32, plaintext: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(GcmKey::<Aes256Gcm>::from_slice(key.expose_secret()));

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad: associated_data,
            },
        )
        .map_err(|_| VaultError::EncryptionFailed)?;

    let mut envelope = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    envelope.extend_from_slice(&nonce_bytes);
    envelope.extend_from_slice(&ciphertext);
    Ok(envelope)
}

/// Verify and decrypt an envelope produced by [`seal`].
///
/// Anything shorter than nonce + tag is rejected as
/// [`VaultError::MalformedEnvelope`] without touching the cipher. Every
/// verification failure is reported as [`VaultError::AuthenticationFailed`].
pub fn unseal(key: &FileKey32, envelope: &[u8], associated_data: &[u8]) -> Result<PlainText> {
    if envelope.len() < MIN_ENVELOPE_LEN {
        debug!(len = envelope.len(), "envelope too short");
        return Err(VaultError::MalformedEnvelope {
            len: envelope.len(),
        });
    }

    let (nonce_bytes, ciphertext) = envelope.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new(GcmKey::<Aes256Gcm>::from_slice(key.expose_secret()));

    cipher
        .decrypt(
            Nonce::from_slice(nonce_bytes),
            Payload {
                msg: ciphertext,
                aad: associated_data,
            },
        )
        .map(PlainText::new)
        .map_err(|_| {
            debug!(
                envelope_len = envelope.len(),
                aad_len = associated_data.len(),
                "tag verification failed: wrong key, altered envelope or associated data mismatch"
            );
            VaultError::AuthenticationFailed
        })
}
