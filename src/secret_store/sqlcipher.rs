// src/secret_store/sqlcipher.rs
//! SQLCipher-backed secret store
//!
//! One encrypted SQLite file holds every file key. The whole database is
//! keyed with a passphrase, so the hex key values are never on disk in clear.

use std::fs;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use zeroize::Zeroizing;

use super::SecretStore;
use crate::config::Config;
use crate::error::{Result, StoreError, VaultError};

/// Recommended KDF iterations for SQLCipher databases (2025+)
// ~0.1–0.2s on modern hardware
pub const DB_KDF_ITERATIONS: u32 = 256_000;

#[derive(Debug)]
pub struct SqlCipherSecretStore {
    conn: Mutex<Connection>,
}

impl SqlCipherSecretStore {
    /// Open (creating if needed) the store at `db_path`
    pub fn open(db_path: impl AsRef<Path>, passphrase: &str) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path).map_err(unavailable)?;
        Self::init(conn, passphrase)
    }

    /// Open the store named by the config's `paths.secret_db`
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::open(&config.paths.secret_db, config.store_key()?)
    }

    fn init(conn: Connection, passphrase: &str) -> Result<Self> {
        let quoted = Zeroizing::new(passphrase.replace('\'', "''"));
        conn.execute_batch(&format!("PRAGMA key = '{}';", quoted.as_str()))
            .map_err(unavailable)?;

        conn.execute_batch(&format!(
            r#"
            PRAGMA cipher_page_size = 4096;
            PRAGMA kdf_iter = {DB_KDF_ITERATIONS};
            PRAGMA cipher_hmac_algorithm = HMAC_SHA512;
            PRAGMA cipher_kdf_algorithm = PBKDF2_HMAC_SHA512;
            PRAGMA cipher_plaintext_header_size = 0;

            CREATE TABLE IF NOT EXISTS secrets (
                path       TEXT PRIMARY KEY,
                value      BLOB NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT
            );
            "#
        ))
        .map_err(unavailable)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SecretStore for SqlCipherSecretStore {
    fn put(&self, key: &str, value: &[u8]) -> std::result::Result<(), StoreError> {
        self.conn()
            .execute(
                r#"
                INSERT INTO secrets (path, value) VALUES (?1, ?2)
                ON CONFLICT(path) DO UPDATE
                    SET value = excluded.value, updated_at = datetime('now')
                "#,
                params![key, value],
            )
            .map_err(|e| StoreError::Unreachable(e.to_string()))?;
        debug!(path = key, "secret stored");
        Ok(())
    }

    fn get(&self, key: &str) -> std::result::Result<Zeroizing<Vec<u8>>, StoreError> {
        self.conn()
            .query_row(
                "SELECT value FROM secrets WHERE path = ?1",
                [key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()
            .map_err(|e| StoreError::Unreachable(e.to_string()))?
            .map(Zeroizing::new)
            .ok_or_else(|| StoreError::NotFound(key.to_owned()))
    }
}

fn unavailable(err: rusqlite::Error) -> VaultError {
    VaultError::StoreUnavailable(err.to_string())
}
