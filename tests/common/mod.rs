use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary working directory for CLI tests.
pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Return the path to the beacon binary (built via cargo).
    pub fn beacon_bin() -> PathBuf {
        // assert_cmd finds the binary automatically via cargo
        PathBuf::from(env!("CARGO_BIN_EXE_beacon"))
    }
}
