//! Filesystem capabilities used by the archiver
//!
//! Two capabilities with different trust contracts live here:
//!
//! - [`PathResolver`] turns a raw entry name into a [`ResolvedPath`],
//!   rejecting anything that would leave its trusted base directory.
//! - [`MetadataProvider`] stats a [`ResolvedPath`] without validating it again.
//!
//! Because `stat` only accepts a `ResolvedPath`, unvalidated input has no way
//! to reach the metadata provider.

pub mod metadata;
pub mod resolver;

pub use metadata::{FileStat, FsMetadata, MetadataProvider};
pub use resolver::{PathResolver, SafeResolver};

use std::fmt;
use std::ops::Deref;
use std::path::{Path, PathBuf};

/// An absolute path that is known to stay inside a trusted directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResolvedPath(PathBuf);

impl ResolvedPath {
    /// Marks `path` as trusted without any validation.
    ///
    /// Only for paths the caller built itself from trusted parts, or for
    /// [`PathResolver`] implementations after they finished their checks.
    pub fn new_unchecked(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

impl Deref for ResolvedPath {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.display().fmt(f)
    }
}
