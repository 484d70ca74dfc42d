//! Testing utilities and fixtures
//!
//! Mock executors and temporary configuration files for unit and
//! integration tests.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub mod fixtures;
pub mod mocks;

/// Temporary directory for configuration files written during a test
pub struct TestContext {
    pub temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `contents` to `name` inside the temp dir and return its path
    pub fn write_file(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}
