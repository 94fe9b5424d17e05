// src/pipeline.rs
//! Seal and unseal stored files
//!
//! `VaultPipeline` ties key custody, the AEAD envelope and the crash-safe
//! file transform together. The file's storage path is the associated data,
//! so a sealed file only opens at the location it was sealed at.
//!
//! All operations on one [`FileId`] are serialized through a per-id lock.
//! Serving plaintext to a consumer happens inside that lock, and the file is
//! re-sealed (or the scratch copy removed) on every way out of it.

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::cipher;
use crate::config::Config;
use crate::consts::{SCRATCH_PREFIX, SCRATCH_RAND_CHARS};
use crate::error::Result;
use crate::file_id::FileId;
use crate::file_ops::{apply_in_place, apply_to_new_location};
use crate::key_manager::KeyManager;
use crate::locks::LockTable;
use crate::secret_store::SecretStore;

pub struct VaultPipeline<S> {
    keys: KeyManager<S>,
    file_locks: LockTable,
    scratch_dir: PathBuf,
}

impl<S: SecretStore> VaultPipeline<S> {
    /// Pipeline over `store`, serving shared copies from the system temp dir
    pub fn new(store: S) -> Self {
        Self {
            keys: KeyManager::new(store),
            file_locks: LockTable::new(),
            scratch_dir: std::env::temp_dir().join("sealed-file-vault"),
        }
    }

    pub fn from_config(store: S, config: &Config) -> Self {
        Self::new(store).with_scratch_dir(&config.paths.scratch_dir)
    }

    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    pub fn key_manager(&self) -> &KeyManager<S> {
        &self.keys
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Encrypt `path` in place under the key of `id`, creating the key if needed.
    ///
    /// Returns the size of the written envelope. Sealing an already sealed
    /// file wraps the envelope once more; nothing here detects that.
    pub fn seal(&self, id: impl Into<FileId>, path: impl AsRef<Path>) -> Result<u64> {
        let id = id.into();
        self.file_locks
            .with_lock(&id, || self.seal_unlocked(&id, path.as_ref()))
    }

    /// Decrypt `path` with the existing key of `id`.
    ///
    /// With no `destination` the stored file itself becomes plaintext until
    /// it is sealed again. With a `destination` the plaintext is written there,
    /// owner-only (mode 0600 on unix), and `path` keeps its ciphertext.
    /// Returns the plaintext size.
    pub fn unseal(
        &self,
        id: impl Into<FileId>,
        path: impl AsRef<Path>,
        destination: Option<&Path>,
    ) -> Result<u64> {
        let id = id.into();
        self.file_locks
            .with_lock(&id, || self.unseal_unlocked(&id, path.as_ref(), destination))
    }

    /// Decrypt `path` in place, hand it to `consumer`, then seal it again.
    ///
    /// The re-seal runs whether the consumer succeeds, fails or panics. If
    /// the re-seal itself fails that error wins, since plaintext is then
    /// still at rest.
    ///
    /// `consumer` runs under the lock for `id`. It must not call `seal`,
    /// `unseal` or a `serve_*` method for the same `id`: the lock is not
    /// re-entrant and that call deadlocks.
    pub fn serve_in_place<T>(
        &self,
        id: impl Into<FileId>,
        path: impl AsRef<Path>,
        consumer: impl FnOnce(&Path) -> Result<T>,
    ) -> Result<T> {
        let id = id.into();
        let path = path.as_ref();

        self.file_locks.with_lock(&id, || {
            self.unseal_unlocked(&id, path, None)?;

            let reseal = ResealGuard {
                pipeline: self,
                id: &id,
                path,
                armed: true,
            };
            let served = consumer(path);
            reseal.finish()?;
            served
        })
    }

    /// Decrypt a copy of `path` into a fresh scratch directory and hand it to `consumer`.
    ///
    /// The copy is named after the last component of `file_name`. The stored
    /// ciphertext is never modified and the scratch directory is removed
    /// when this returns or unwinds. The copy is written owner-only.
    ///
    /// As with [`serve_in_place`](Self::serve_in_place), `consumer` holds the
    /// lock for `id` and must not re-enter the pipeline for the same `id`.
    pub fn serve_copy<T>(
        &self,
        id: impl Into<FileId>,
        path: impl AsRef<Path>,
        file_name: &str,
        consumer: impl FnOnce(&Path) -> Result<T>,
    ) -> Result<T> {
        let id = id.into();
        let path = path.as_ref();

        self.file_locks.with_lock(&id, || {
            std::fs::create_dir_all(&self.scratch_dir)?;
            let scratch = tempfile::Builder::new()
                .prefix(SCRATCH_PREFIX)
                .rand_bytes(SCRATCH_RAND_CHARS)
                .tempdir_in(&self.scratch_dir)?;

            let name = Path::new(file_name)
                .file_name()
                .unwrap_or_else(|| "file".as_ref());
            let copy = scratch.path().join(name);

            self.unseal_unlocked(&id, path, Some(&copy))?;
            consumer(&copy)
        })
    }

    fn seal_unlocked(&self, id: &FileId, path: &Path) -> Result<u64> {
        // The key is in the store before anything is encrypted under it.
        let key = self.keys.get_or_create_key(id)?;
        let aad = associated_data(path);

        let written = apply_in_place(path, |plaintext| cipher::seal(&key, plaintext, aad))?;
        info!(file_id = %id, path = %path.display(), bytes = written, "sealed");
        Ok(written)
    }

    fn unseal_unlocked(&self, id: &FileId, path: &Path, destination: Option<&Path>) -> Result<u64> {
        let key = self.keys.get_existing_key(id)?;
        let aad = associated_data(path);
        let open = |envelope: &[u8]| cipher::unseal(&key, envelope, aad);

        let written = match destination {
            None => apply_in_place(path, open)?,
            Some(dest) => apply_to_new_location(path, dest, open)?,
        };
        info!(
            file_id = %id,
            path = %path.display(),
            destination = ?destination.map(Path::display),
            bytes = written,
            "unsealed"
        );
        Ok(written)
    }
}

/// Associated data for a file stored at `path`: its path bytes (UTF-8 on every
/// platform where the path is valid UTF-8)
pub fn associated_data(path: &Path) -> &[u8] {
    path.as_os_str().as_encoded_bytes()
}

/// Re-seals a file that was unsealed in place, even if the consumer panicked
struct ResealGuard<'a, S: SecretStore> {
    pipeline: &'a VaultPipeline<S>,
    id: &'a FileId,
    path: &'a Path,
    armed: bool,
}

impl<S: SecretStore> ResealGuard<'_, S> {
    fn finish(mut self) -> Result<u64> {
        self.armed = false;
        self.pipeline
            .seal_unlocked(self.id, self.path)
            .inspect_err(|e| {
                error!(file_id = %self.id, path = %self.path.display(), error = %e, "re-seal failed, plaintext left at rest");
            })
    }
}

impl<S: SecretStore> Drop for ResealGuard<'_, S> {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = self.pipeline.seal_unlocked(self.id, self.path) {
                error!(file_id = %self.id, path = %self.path.display(), error = %e, "re-seal after unwind failed");
            }
        }
    }
}
