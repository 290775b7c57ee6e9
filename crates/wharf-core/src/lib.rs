//! Wharf - per-server backup archive management
//!
//! Each managed server owns a single `.tar.gz` archive of its data directory.
//! This library creates and replaces that archive, reports on it, deletes it
//! and computes its SHA-256 checksum.

pub mod archiver;
pub mod checksum;
pub mod codec;
pub mod config;
pub mod error;
pub mod filesystem;
pub mod server;

pub use error::{Error, Result};

// Re-export commonly used types
pub use archiver::Archiver;
pub use codec::{Compressor, TarGzCompressor};
pub use config::Config;
pub use filesystem::{FileStat, MetadataProvider, PathResolver, ResolvedPath};
pub use server::ServerId;
