//! Common test utilities for rust-csv2sql tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Test context with temporary directory for isolated test execution
pub struct TestContext {
    /// Kept to prevent temp directory cleanup until TestContext is dropped
    _temp_dir: TempDir,
    pub dir: PathBuf,
}

impl TestContext {
    /// Create an empty context
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let dir = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            dir,
        }
    }

    /// Create a context holding a copy of one fixture file
    pub fn with_fixture(fixture_name: &str) -> Self {
        let ctx = Self::new();
        fs::copy(fixture_path(fixture_name), ctx.path(fixture_name)).expect("Failed to copy fixture");
        ctx
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Write `contents` to `name` inside the context and return its path
    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).expect("Failed to write test file");
        path
    }

    pub fn read(&self, name: &str) -> String {
        read(&self.path(name))
    }
}

/// Get the path to a test fixture
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}

/// Lines of a script that are INSERT statements
pub fn insert_lines(sql: &str) -> Vec<&str> {
    sql.lines().filter(|l| l.starts_with("INSERT INTO")).collect()
}
