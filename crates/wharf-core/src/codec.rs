//! Compression capability: turns a set of paths into one archive stream

use crate::filesystem::ResolvedPath;
use crate::{Error, Result};
use flate2::write::GzEncoder;
use flate2::Compression as GzCompression;
use std::io::Write;
use std::path::Path;
use tar::Builder;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Default gzip level used when none is configured
pub const DEFAULT_LEVEL: u32 = 6;

/// Writes a set of source paths into a single compressed archive.
pub trait Compressor: Send + Sync {
    /// File extension (without leading dot) of the archives this compressor writes
    fn extension(&self) -> &'static str;

    /// Archive every source, recursively, into `writer`.
    ///
    /// Each source becomes a top-level entry named after its final path component.
    fn create_archive(&self, sources: &[ResolvedPath], writer: &mut dyn Write) -> Result<()>;

}

/// Gzip-compressed tar archives (`.tar.gz`).
///
/// Symlinks are stored as links and never followed. Entries are written in
/// sorted order and the gzip header carries no timestamp, so unchanged input
/// produces byte-identical output.
#[derive(Debug, Clone, Copy)]
pub struct TarGzCompressor {
    level: GzCompression,
}

impl TarGzCompressor {
    /// Create a compressor with the given gzip level (clamped to 0-9)
    pub fn new(level: u32) -> Self {
        Self {
            level: GzCompression::new(level.min(9)),
        }
    }

    pub fn level(&self) -> u32 {
        self.level.level()
    }
}

impl Default for TarGzCompressor {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL)
    }
}

impl Compressor for TarGzCompressor {
    fn extension(&self) -> &'static str {
        "tar.gz"
    }

    fn create_archive(&self, sources: &[ResolvedPath], writer: &mut dyn Write) -> Result<()> {
        let encoder = GzEncoder::new(writer, self.level);
        let mut builder = Builder::new(encoder);
        builder.follow_symlinks(false);

        let mut sources: Vec<&ResolvedPath> = sources.iter().collect();
        sources.sort();

        for source in &sources {
            append_source(&mut builder, source)?;
        }

        let encoder = builder
            .into_inner()
            .map_err(|e| Error::Compression(format!("failed to finish tar stream: {}", e)))?;
        encoder
            .finish()
            .map_err(|e| Error::Compression(format!("failed to finish gzip stream: {}", e)))?;

        info!(sources = sources.len(), "Wrote tar.gz archive");
        Ok(())
    }
}

/// Add one source, and everything below it, to the builder
fn append_source<W: Write>(builder: &mut Builder<W>, source: &Path) -> Result<()> {
    let base = source.parent().unwrap_or(Path::new(""));
    if source.file_name().is_none() {
        return Err(Error::Compression(format!(
            "{} has no file name",
            source.display()
        )));
    }

    let walker = WalkDir::new(source)
        .follow_links(false)
        .follow_root_links(false)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            Error::Compression(format!("failed to read {}: {}", path.display(), e))
        })?;
        let path = entry.path();
        let name = path.strip_prefix(base).map_err(|_| {
            Error::Compression(format!("{} is outside of {}", path.display(), base.display()))
        })?;

        let file_type = entry.file_type();
        if file_type.is_dir() {
            debug!("Adding directory: {:?}", name);
            builder
                .append_dir(name, path)
                .map_err(|e| compression_error(path, e))?;
        } else if file_type.is_file() || file_type.is_symlink() {
            debug!("Adding entry: {:?}", name);
            builder
                .append_path_with_name(path, name)
                .map_err(|e| compression_error(path, e))?;
        } else {
            warn!("Skipping special file: {:?}", path);
        }
    }

    Ok(())
}

/// Failure writing to or reading for the archive at `path`
pub(crate) fn compression_error(path: &Path, err: std::io::Error) -> Error {
    Error::Compression(format!("{}: {}", path.display(), err))
}
