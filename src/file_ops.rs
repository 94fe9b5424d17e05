// src/file_ops.rs
//! Crash-safe whole-file transforms
//!
//! Read a file fully into memory, run a transform over the bytes, write the
//! result next to the target as `<target>.tmp`, fsync it, then atomically
//! rename it over the target. A reader of the target sees either the old
//! content or the new content, never a mix, even if the process dies
//! mid-write. On every failure path the `.tmp` artifact is removed.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::consts::PENDING_SUFFIX;
use crate::error::Result;

/// Replace the content of `path` with `transform(content)`.
///
/// If reading, the transform or writing fails, `path` keeps its original
/// bytes and the error is returned unchanged.
pub fn apply_in_place<F, B>(path: impl AsRef<Path>, transform: F) -> Result<u64>
where
    F: FnOnce(&[u8]) -> Result<B>,
    B: AsRef<[u8]>,
{
    let path = path.as_ref();
    transform_file(path, path, transform, commit)
}

/// Write `transform(content of path)` to `destination`, leaving `path` untouched.
///
/// The result is still staged as `<destination>.tmp` and renamed into place,
/// so `destination` never holds a partial file either.
pub fn apply_to_new_location<F, B>(
    path: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    transform: F,
) -> Result<u64>
where
    F: FnOnce(&[u8]) -> Result<B>,
    B: AsRef<[u8]>,
{
    transform_file(path.as_ref(), destination.as_ref(), transform, commit)
}

/// The scratch path (`<target>.tmp`) a transform of `target` writes to
pub fn pending_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(PENDING_SUFFIX);
    PathBuf::from(name)
}

/// The in-progress output of a transform.
///
/// Removed on drop unless [`PendingWrite::commit`] succeeded.
#[derive(Debug)]
pub(crate) struct PendingWrite {
    path: PathBuf,
    committed: bool,
}

impl PendingWrite {
    pub(crate) fn for_target(target: &Path) -> Self {
        Self {
            path: pending_path(target),
            committed: false,
        }
    }

    /// Write and fsync `bytes`. The file takes the permissions of `like`,
    /// or is owner-only when there is nothing to copy them from.
    fn write(&self, bytes: &[u8], like: Option<&fs::Metadata>) -> std::io::Result<()> {
        let mut file = create_owner_only(&self.path)?;
        if let Some(meta) = like {
            file.set_permissions(meta.permissions())?;
        }
        file.write_all(bytes)?;
        file.sync_all()
    }

    fn commit(
        mut self,
        target: &Path,
        rename: impl FnOnce(&Path, &Path) -> std::io::Result<()>,
    ) -> std::io::Result<()> {
        rename(&self.path, target)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PendingWrite {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed pending write"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove pending write"),
        }
    }
}

fn transform_file<F, B, C>(source: &Path, target: &Path, transform: F, rename: C) -> Result<u64>
where
    F: FnOnce(&[u8]) -> Result<B>,
    B: AsRef<[u8]>,
    C: FnOnce(&Path, &Path) -> std::io::Result<()>,
{
    let pending = PendingWrite::for_target(target);

    let input = Zeroizing::new(fs::read(source)?);
    let output = transform(input.as_slice())?;
    let output = output.as_ref();

    let existing = if source == target {
        Some(fs::metadata(target)?)
    } else {
        None
    };
    pending.write(output, existing.as_ref())?;
    pending.commit(target, rename)?;

    debug!(
        source = %source.display(),
        target = %target.display(),
        bytes_in = input.len(),
        bytes_out = output.len(),
        "file transform committed"
    );
    Ok(output.len() as u64)
}

#[cfg(unix)]
fn create_owner_only(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation; a stale pending file keeps its own.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn create_owner_only(path: &Path) -> std::io::Result<File> {
    File::create(path)
}

fn commit(from: &Path, to: &Path) -> std::io::Result<()> {
    fs::rename(from, to)?;
    sync_parent(to)
}

#[cfg(unix)]
fn sync_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => File::open(dir)?.sync_all(),
        _ => Ok(()),
    }
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
