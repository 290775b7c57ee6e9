//! Configuration module

use crate::archiver::Archiver;
use crate::codec::{TarGzCompressor, DEFAULT_LEVEL};
use crate::server::ServerId;
use crate::{Error, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Archive storage settings
    #[serde(default)]
    pub archive: ArchiveConfig,
}

/// Archive storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Directory holding one `<id>.tar.gz` per server
    pub archive_directory: PathBuf,
    /// Root of the server data directories; each server uses `<root>/<id>`
    pub data_directory: PathBuf,
    /// Gzip compression level (0-9)
    pub compression_level: u32,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            archive_directory: PathBuf::from("/var/lib/wharf/archives"),
            data_directory: PathBuf::from("/var/lib/wharf/volumes"),
            compression_level: DEFAULT_LEVEL,
        }
    }
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = config_dir().ok_or_else(|| {
            Error::Config("Unable to determine config directory".to_string())
        })?;

        Ok(config_dir.join("wharf").join("config.toml"))
    }

    /// Get default configuration content with comments
    pub fn default_config_content() -> String {
        r#"# Wharf Configuration File

[archive]
# Directory where server archives (<server id>.tar.gz) are stored
archive_directory = "/var/lib/wharf/archives"
# Root directory holding one data directory per server (<root>/<server id>)
data_directory = "/var/lib/wharf/volumes"
# Gzip compression level, 0 (store) to 9 (best)
compression_level = 6
"#
        .to_string()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        debug!(path = ?path, "Loaded configuration");
        Ok(config)
    }

    /// Load configuration from the default location, or defaults if there is no file
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Save configuration to a file, creating parent directories
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.archive.compression_level > 9 {
            return Err(Error::Config(format!(
                "compression_level must be between 0 and 9, got {}",
                self.archive.compression_level
            )));
        }
        if self.archive.archive_directory.as_os_str().is_empty() {
            return Err(Error::Config("archive_directory is empty".to_string()));
        }
        if self.archive.data_directory.as_os_str().is_empty() {
            return Err(Error::Config("data_directory is empty".to_string()));
        }
        Ok(())
    }

    /// Data directory of one server
    pub fn server_data_dir(&self, server: &ServerId) -> PathBuf {
        self.archive.data_directory.join(server.as_str())
    }

    /// Build the archiver for `server` with this configuration's directories
    pub fn archiver_for(&self, server: &ServerId) -> Result<Archiver> {
        self.validate()?;
        Ok(Archiver::new(
            server.clone(),
            self.server_data_dir(server),
            self.archive.archive_directory.clone(),
        )
        .with_compressor(TarGzCompressor::new(self.archive.compression_level)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.archive.compression_level, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_content_matches_defaults() {
        let parsed: Config = toml::from_str(&Config::default_config_content()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str(
            r#"
            [archive]
            archive_directory = "/tmp/archives"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.archive.archive_directory, PathBuf::from("/tmp/archives"));
        assert_eq!(parsed.archive.compression_level, 6);
    }

    #[test]
    fn test_invalid_level() {
        let mut config = Config::default();
        config.archive.compression_level = 12;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
        assert!(config
            .archiver_for(&ServerId::new("alpha").unwrap())
            .is_err());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.archive.archive_directory = temp_dir.path().join("archives");
        config.save_to(&path).unwrap();

        assert_eq!(Config::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_from_file_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[archive\nbroken").unwrap();
        assert!(matches!(Config::from_file(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_archiver_for() {
        let mut config = Config::default();
        config.archive.archive_directory = PathBuf::from("/srv/archives");
        config.archive.data_directory = PathBuf::from("/srv/volumes");

        let server = ServerId::new("alpha").unwrap();
        let archiver = config.archiver_for(&server).unwrap();
        assert_eq!(archiver.data_dir(), Path::new("/srv/volumes/alpha"));
        assert_eq!(archiver.archive_path(), PathBuf::from("/srv/archives/alpha.tar.gz"));
    }
}
