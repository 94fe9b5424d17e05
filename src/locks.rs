// src/locks.rs
//! Per-identifier mutual exclusion, created on demand
//!
//! Each `FileId` maps to its own mutex. Entries are dropped again once no
//! caller holds or waits on them, so the table only ever contains ids that
//! are in use right now.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::file_id::FileId;

#[derive(Debug, Default)]
pub struct LockTable {
    locks: Mutex<HashMap<FileId, Arc<Mutex<()>>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `id`.
    ///
    /// The lock is released when `f` returns or unwinds. Poisoning is ignored:
    /// the mutex guards no data, only the critical section itself. The lock
    /// is not re-entrant; calling back in for the same `id` from `f` deadlocks.
    pub fn with_lock<R>(&self, id: &FileId, f: impl FnOnce() -> R) -> R {
        let entry = Entry {
            table: self,
            id,
            lock: self.get_lock(id),
        };
        let _guard = entry.lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Number of ids currently held or awaited
    pub fn active(&self) -> usize {
        self.table().len()
    }

    fn get_lock(&self, id: &FileId) -> Arc<Mutex<()>> {
        self.table()
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn table(&self) -> std::sync::MutexGuard<'_, HashMap<FileId, Arc<Mutex<()>>>> {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One caller's claim on a table entry; gives the entry back on drop
struct Entry<'a> {
    table: &'a LockTable,
    id: &'a FileId,
    lock: Arc<Mutex<()>>,
}

impl Drop for Entry<'_> {
    fn drop(&mut self) {
        let mut table = self.table.table();
        // Table's reference plus ours: nobody else holds or waits.
        if table
            .get(self.id)
            .is_some_and(|l| Arc::ptr_eq(l, &self.lock) && Arc::strong_count(l) == 2)
        {
            table.remove(self.id);
        }
    }
}
