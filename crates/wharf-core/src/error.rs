//! Error types for wharf-core

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Core error types for the wharf library
#[derive(Error, Debug)]
pub enum Error {
    /// The archive (or another stat target) does not exist
    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A directory entry resolves outside of its trusted root
    #[error("Path traversal: {} escapes {}", .path.display(), .base.display())]
    PathTraversal { base: PathBuf, path: PathBuf },

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Writing the compressed archive failed
    #[error("Compression error: {0}")]
    Compression(String),

    /// Server identity cannot be used to name an archive
    #[error("Invalid server identity: {0}")]
    InvalidIdentity(String),

    /// Configuration-related error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Converts an I/O error on `path`, keeping "not found" distinct from other failures.
    pub fn from_io(err: io::Error, path: impl AsRef<Path>) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            Error::NotFound(path.as_ref().to_path_buf())
        } else {
            Error::Io(err)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
