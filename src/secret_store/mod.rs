// src/secret_store/mod.rs
//! Key custody backends
//!
//! The vault never keeps file keys itself. It hands them to a keyed secret
//! service and fetches them back by path. Anything that can `put` and `get`
//! small blobs under a string key can serve as that service.

use std::sync::Arc;

use zeroize::Zeroizing;

use crate::error::StoreError;

mod memory;
mod sqlcipher;

pub use memory::MemorySecretStore;
pub use sqlcipher::SqlCipherSecretStore;

/// Keyed get/put of small binary secrets.
///
/// `put` is an upsert. `get` fails with [`StoreError::NotFound`] when nothing
/// is stored under `key` and with [`StoreError::Unreachable`] when the backend
/// cannot answer at all.
pub trait SecretStore: Send + Sync {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    fn get(&self, key: &str) -> Result<Zeroizing<Vec<u8>>, StoreError>;
}

impl<S: SecretStore + ?Sized> SecretStore for Arc<S> {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn get(&self, key: &str) -> Result<Zeroizing<Vec<u8>>, StoreError> {
        (**self).get(key)
    }
}

impl<S: SecretStore + ?Sized> SecretStore for Box<S> {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn get(&self, key: &str) -> Result<Zeroizing<Vec<u8>>, StoreError> {
        (**self).get(key)
    }
}
