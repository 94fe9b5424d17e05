// src/key_manager.rs
//! Per-file key custody
//!
//! Exactly one 256-bit key is bound to each [`FileId`]. It is created on the
//! first seal, written to the [`SecretStore`] *before* anything is encrypted
//! under it, and fetched (never regenerated) from then on.

use tracing::{debug, warn};

use crate::consts::KEY_PATH_PREFIX;
use crate::error::{Result, StoreError, VaultError};
use crate::file_id::FileId;
use crate::key_ops::{decode_key, encode_key, generate_key, Key};
use crate::locks::LockTable;
use crate::secret_store::SecretStore;

pub struct KeyManager<S> {
    store: S,
    creation_locks: LockTable,
}

impl<S: SecretStore> KeyManager<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            creation_locks: LockTable::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Where the key for `id` lives in the secret store
    pub fn secret_path(id: &FileId) -> String {
        format!("{KEY_PATH_PREFIX}/{id}")
    }

    /// Fetch the key for `id`, generating and persisting one if none can be fetched.
    ///
    /// Absent and unreachable both lead to generation; if the store is really
    /// down the subsequent `put` fails and surfaces as `StoreUnavailable`.
    /// Creation is serialized per id, so racing callers all end up with the
    /// key that was stored first.
    pub fn get_or_create_key(&self, id: &FileId) -> Result<Key> {
        self.creation_locks.with_lock(id, || match self.fetch(id) {
            Ok(key) => Ok(key),
            Err(FetchError::Vault(e)) => Err(e),
            Err(FetchError::Store(e)) => {
                if let StoreError::Unreachable(reason) = &e {
                    warn!(file_id = %id, %reason, "key fetch failed, generating a new key");
                }
                self.create(id)
            }
        })
    }

    /// Fetch-only: never creates a key
    pub fn get_existing_key(&self, id: &FileId) -> Result<Key> {
        self.fetch(id).map_err(|e| match e {
            FetchError::Vault(e) => e,
            FetchError::Store(StoreError::NotFound(_)) => VaultError::KeyNotFound(id.clone()),
            FetchError::Store(StoreError::Unreachable(reason)) => {
                VaultError::StoreUnavailable(reason)
            }
        })
    }

    /// Persist a caller-provided key for `id`, replacing any previous one
    pub fn store_key(&self, id: &FileId, key: &Key) -> Result<()> {
        self.creation_locks.with_lock(id, || self.persist(id, key))
    }

    /// Generate a fresh key for `id` and persist it, replacing any previous one
    pub fn generate_and_store(&self, id: &FileId) -> Result<Key> {
        self.creation_locks.with_lock(id, || self.create(id))
    }

    fn create(&self, id: &FileId) -> Result<Key> {
        let key = generate_key();
        self.persist(id, &key)?;
        debug!(file_id = %id, "generated new file key");
        Ok(key)
    }

    fn persist(&self, id: &FileId, key: &Key) -> Result<()> {
        let encoded = encode_key(key);
        self.store
            .put(&Self::secret_path(id), encoded.as_bytes())
            .map_err(|e| VaultError::StoreUnavailable(e.to_string()))
    }

    fn fetch(&self, id: &FileId) -> std::result::Result<Key, FetchError> {
        let stored = self
            .store
            .get(&Self::secret_path(id))
            .map_err(FetchError::Store)?;
        debug!(file_id = %id, "fetched file key");
        decode_key(&stored).ok_or_else(|| FetchError::Vault(VaultError::InvalidKeyMaterial(id.clone())))
    }
}

enum FetchError {
    Store(StoreError),
    Vault(VaultError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret_store::MemorySecretStore;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn secret_path_uses_file_encryption_key_namespace() {
        assert_eq!(
            KeyManager::<MemorySecretStore>::secret_path(&FileId::from(42u64)),
            "secret/data/file-encryption-key/42"
        );
    }

    #[test]
    fn sequential_get_or_create_returns_identical_keys() {
        let km = KeyManager::new(MemorySecretStore::new());
        let id = FileId::from("doc");
        let a = km.get_or_create_key(&id).unwrap();
        let b = km.get_or_create_key(&id).unwrap();
        assert_eq!(a.expose_secret(), b.expose_secret());
        assert_eq!(km.store().put_count(), 1);
    }

    #[test]
    fn key_is_stored_hex_encoded() {
        let km = KeyManager::new(MemorySecretStore::new());
        let id = FileId::from("hex");
        let key = km.get_or_create_key(&id).unwrap();
        let raw = km.store().get(&KeyManager::<MemorySecretStore>::secret_path(&id)).unwrap();
        assert_eq!(raw.as_slice(), hex::encode(key.expose_secret()).as_bytes());
    }

    #[test]
    fn get_existing_key_never_creates() {
        let km = KeyManager::new(MemorySecretStore::new());
        let err = km.get_existing_key(&FileId::from("ghost")).unwrap_err();
        assert!(matches!(err, VaultError::KeyNotFound(id) if id.as_str() == "ghost"));
        assert!(km.store().is_empty());
    }

    #[test]
    fn get_existing_key_reports_unreachable_store() {
        let km = KeyManager::new(MemorySecretStore::new());
        km.store().set_online(false);
        let err = km.get_existing_key(&FileId::from("x")).unwrap_err();
        assert!(matches!(err, VaultError::StoreUnavailable(_)));
    }

    #[test]
    fn get_or_create_fails_when_store_cannot_persist() {
        let km = KeyManager::new(MemorySecretStore::new());
        km.store().set_online(false);
        let err = km.get_or_create_key(&FileId::from("x")).unwrap_err();
        assert!(matches!(err, VaultError::StoreUnavailable(_)));
    }

    #[test]
    fn corrupt_stored_key_is_not_replaced() {
        let km = KeyManager::new(MemorySecretStore::new());
        let id = FileId::from("bad");
        km.store()
            .put(&KeyManager::<MemorySecretStore>::secret_path(&id), b"zz")
            .unwrap();
        assert!(matches!(
            km.get_or_create_key(&id),
            Err(VaultError::InvalidKeyMaterial(_))
        ));
        assert_eq!(km.store().put_count(), 1);
    }

    #[test]
    fn concurrent_first_use_agrees_on_one_key() {
        let km = Arc::new(KeyManager::new(MemorySecretStore::new()));
        let id = FileId::from("race");

        let keys: Vec<[u8; 32]> = (0..16)
            .map(|_| {
                let km = Arc::clone(&km);
                let id = id.clone();
                thread::spawn(move || *km.get_or_create_key(&id).unwrap().expose_secret())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect();

        assert!(keys.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(km.store().put_count(), 1);
    }
}
