//! Testing utilities and fixtures for wharf
//!
//! This crate provides temporary directory helpers, server data fixtures and
//! archive assertions shared by the wharf test suites.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub mod assertions;
pub mod fixtures;

/// Creates a temporary test directory with cleanup on drop
pub struct TestDir {
    dir: TempDir,
}

impl TestDir {
    /// Creates a new temporary test directory
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    /// Returns the path to the temporary directory
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Creates a file with the given name and content in the test directory
    pub fn create_file(&self, name: &str, content: &[u8]) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Creates a directory with the given name in the test directory
    pub fn create_dir(&self, name: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(&path)?;
        Ok(path)
    }
}

/// Layout of a server host inside a [`TestDir`]:
/// `volumes/<id>` for data and `archives/` for archives.
pub struct ServerLayout {
    pub test_dir: TestDir,
    pub id: String,
}

impl ServerLayout {
    /// Creates the layout with an empty data directory for `id`
    pub fn new(id: &str) -> Result<Self> {
        let test_dir = TestDir::new()?;
        test_dir.create_dir(&format!("volumes/{}", id))?;
        Ok(Self {
            test_dir,
            id: id.to_string(),
        })
    }

    pub fn volumes_dir(&self) -> PathBuf {
        self.test_dir.path().join("volumes")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.volumes_dir().join(&self.id)
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.test_dir.path().join("archives")
    }

    /// Creates a file relative to the server's data directory
    pub fn create_data_file(&self, name: &str, content: &[u8]) -> Result<PathBuf> {
        self.test_dir
            .create_file(&format!("volumes/{}/{}", self.id, name), content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_dir() {
        let test_dir = TestDir::new().unwrap();
        assert!(test_dir.path().exists());
    }

    #[test]
    fn test_create_file() {
        let test_dir = TestDir::new().unwrap();
        let file_path = test_dir.create_file("test.txt", b"Hello, World!").unwrap();
        assert!(file_path.exists());
        assert_eq!(std::fs::read(&file_path).unwrap(), b"Hello, World!");
    }

    #[test]
    fn test_server_layout() {
        let layout = ServerLayout::new("alpha").unwrap();
        assert!(layout.data_dir().is_dir());
        assert!(!layout.archive_dir().exists());

        let file = layout.create_data_file("world/level.dat", b"x").unwrap();
        assert!(file.starts_with(layout.data_dir()));
    }
}
