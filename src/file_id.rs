// src/file_id.rs
//! Opaque, stable identifier of one stored file

use std::fmt;

/// Names one stored file; doubles as the secret-store lookup key.
///
/// Integer ids from a metadata database and string ids are both accepted and
/// normalised to their decimal / literal text form, so `FileId::from(42)` and
/// `FileId::from("42")` address the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(String);

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for FileId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&FileId> for FileId {
    fn from(id: &FileId) -> Self {
        id.clone()
    }
}

impl From<u64> for FileId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<i64> for FileId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<u32> for FileId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}
