// src/secret_store/memory.rs
//! In-process secret store for tests and single-process tooling.
//!
//! NOT durable: every secret is lost when the store is dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use zeroize::Zeroizing;

use super::SecretStore;
use crate::error::StoreError;

#[derive(Debug)]
pub struct MemorySecretStore {
    secrets: RwLock<HashMap<String, Zeroizing<Vec<u8>>>>,
    online: AtomicBool,
    puts: AtomicUsize,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self {
            secrets: RwLock::new(HashMap::new()),
            online: AtomicBool::new(true),
            puts: AtomicUsize::new(0),
        }
    }

    /// Simulate the backend dropping off the network (or coming back)
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Number of successful `put` calls so far
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.secrets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unreachable("memory store is offline".into()))
        }
    }
}

impl Default for MemorySecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for MemorySecretStore {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.check_online()?;
        self.secrets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), Zeroizing::new(value.to_vec()));
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Zeroizing<Vec<u8>>, StoreError> {
        self.check_online()?;
        self.secrets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_owned()))
    }
}
