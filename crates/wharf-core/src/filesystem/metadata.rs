//! Stat of already-trusted paths

use super::ResolvedPath;
use crate::{Error, Result};
use std::fs::{self, Metadata};
use std::time::SystemTime;

/// Size, timestamps and type information for a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    /// Final path component
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Last modification time, if the platform reports one
    pub modified: Option<SystemTime>,
    /// Unix permission bits
    pub mode: Option<u32>,
    pub is_dir: bool,
    /// Whether the path itself is a symlink (the other fields describe its target)
    pub is_symlink: bool,
}

impl FileStat {
    fn from_metadata(name: String, metadata: &Metadata, is_symlink: bool) -> Self {
        Self {
            name,
            size: metadata.len(),
            modified: metadata.modified().ok(),
            #[cfg(unix)]
            mode: {
                use std::os::unix::fs::PermissionsExt;
                Some(metadata.permissions().mode())
            },
            #[cfg(not(unix))]
            mode: None,
            is_dir: metadata.is_dir(),
            is_symlink,
        }
    }
}

/// Stats paths that were already validated.
///
/// No safety checks happen here. Only [`ResolvedPath`] values are accepted,
/// which either came out of a [`super::PathResolver`] or were built internally.
pub trait MetadataProvider: Send + Sync {
    fn stat(&self, path: &ResolvedPath) -> Result<FileStat>;
}

/// Metadata provider backed by the real filesystem. Follows symlinks.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMetadata;

impl MetadataProvider for FsMetadata {
    fn stat(&self, path: &ResolvedPath) -> Result<FileStat> {
        let link_meta = fs::symlink_metadata(path).map_err(|e| Error::from_io(e, path))?;
        let is_symlink = link_meta.file_type().is_symlink();
        let metadata = if is_symlink {
            fs::metadata(path).map_err(|e| Error::from_io(e, path))?
        } else {
            link_meta
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(FileStat::from_metadata(name, &metadata, is_symlink))
    }
}
