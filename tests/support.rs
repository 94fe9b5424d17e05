// tests/support.rs
//! Test fixtures: a pipeline over an in-memory secret store in a temp dir

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use sealed_file_vault::{MemorySecretStore, VaultPipeline};
use tempfile::{tempdir, TempDir};

#[allow(dead_code)] // not every test binary uses every field
pub struct Fixture {
    pub dir: TempDir,
    pub store: Arc<MemorySecretStore>,
    pub vault: VaultPipeline<Arc<MemorySecretStore>>,
}

#[allow(dead_code)]
impl Fixture {
    pub fn new() -> Self {
        let dir = tempdir().expect("create temp dir");
        let store = Arc::new(MemorySecretStore::new());
        let vault =
            VaultPipeline::new(Arc::clone(&store)).with_scratch_dir(dir.path().join("scratch"));
        Self { dir, store, vault }
    }

    /// Write `content` to `<tempdir>/<name>` and return the path
    pub fn file(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).expect("write fixture file");
        path
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Names of everything directly inside the temp dir, sorted
    pub fn listing(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.dir.path())
            .expect("read temp dir")
            .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
