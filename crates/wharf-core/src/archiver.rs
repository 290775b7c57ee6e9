//! Archive lifecycle for a single server
//!
//! Every server owns exactly one archive at `<archive dir>/<id>.tar.gz`.
//! [`Archiver`] can report whether it exists, stat it, (re)create it from the
//! server's data directory, delete it and compute its SHA-256 checksum.
//!
//! New archives are written to a temporary file next to the final path and
//! renamed into place, so a successful run never exposes a missing or
//! half-written archive. A failed run removes the previous archive: once
//! `archive()` has failed there is no valid archive until it succeeds.
//!
//! No locking happens here; callers run at most one `archive()` per server
//! at a time.

use crate::checksum::{is_sha256_hex, sha256_hex};
use crate::codec::{compression_error, Compressor, TarGzCompressor};
use crate::filesystem::{
    FileStat, FsMetadata, MetadataProvider, PathResolver, ResolvedPath, SafeResolver,
};
use crate::server::ServerId;
use crate::{Error, Result};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Permission bits of a finished archive
#[cfg(unix)]
const ARCHIVE_MODE: u32 = 0o644;

/// Manages the archive of one server
pub struct Archiver {
    server: ServerId,
    data_dir: PathBuf,
    archive_dir: PathBuf,
    resolver: Box<dyn PathResolver>,
    metadata: Box<dyn MetadataProvider>,
    compressor: Box<dyn Compressor>,
}

impl Archiver {
    /// Create an archiver for `server`, reading from `data_dir` and storing
    /// the archive in `archive_dir`.
    pub fn new(
        server: ServerId,
        data_dir: impl Into<PathBuf>,
        archive_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            server,
            data_dir: data_dir.into(),
            archive_dir: archive_dir.into(),
            resolver: Box::new(SafeResolver),
            metadata: Box::new(FsMetadata),
            compressor: Box::new(TarGzCompressor::default()),
        }
    }

    pub fn with_resolver(mut self, resolver: impl PathResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn with_metadata_provider(mut self, metadata: impl MetadataProvider + 'static) -> Self {
        self.metadata = Box::new(metadata);
        self
    }

    pub fn with_compressor(mut self, compressor: impl Compressor + 'static) -> Self {
        self.compressor = Box::new(compressor);
        self
    }

    pub fn server(&self) -> &ServerId {
        &self.server
    }

    /// Directory whose top-level entries go into the archive
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    /// File name of the archive, e.g. `<id>.tar.gz`
    pub fn archive_name(&self) -> String {
        format!("{}.{}", self.server, self.compressor.extension())
    }

    /// Full path of the archive. Pure; touches no files.
    pub fn archive_path(&self) -> PathBuf {
        self.archive_dir.join(self.archive_name())
    }

    // The archive path is assembled from configuration and a validated
    // identity, never from request input.
    fn trusted_archive_path(&self) -> ResolvedPath {
        ResolvedPath::new_unchecked(self.archive_path())
    }

    /// Whether an archive is present.
    ///
    /// A missing archive is `Ok(false)`; any other stat failure is returned.
    pub fn exists(&self) -> Result<bool> {
        match self.stat() {
            Ok(_) => Ok(true),
            Err(Error::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Size, modification time and type of the archive file
    pub fn stat(&self) -> Result<FileStat> {
        self.metadata.stat(&self.trusted_archive_path())
    }

    /// Create the archive, replacing any previous one.
    pub fn archive(&self) -> Result<()> {
        info!(server = %self.server, data_dir = ?self.data_dir, "Archiving server");

        let result = self
            .collect_sources()
            .and_then(|sources| self.write_archive(&sources));

        if let Err(e) = &result {
            warn!(server = %self.server, error = %e, "Archiving failed, removing previous archive");
            if let Err(cleanup) = self.delete_if_exists() {
                warn!(server = %self.server, error = %cleanup, "Failed to remove previous archive");
            }
        }

        result
    }

    /// Resolve every top-level entry of the data directory.
    ///
    /// Any entry that escapes the data directory aborts the whole listing.
    fn collect_sources(&self) -> Result<Vec<ResolvedPath>> {
        let entries =
            fs::read_dir(&self.data_dir).map_err(|e| Error::from_io(e, &self.data_dir))?;

        let mut sources = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = PathBuf::from(entry.file_name());
            sources.push(self.resolver.safe_join(&self.data_dir, &name)?);
        }

        debug!(server = %self.server, entries = sources.len(), "Collected archive sources");
        Ok(sources)
    }

    // Every failure to stage or place the new archive is a compression
    // failure, the same as a failure while writing it.
    fn write_archive(&self, sources: &[ResolvedPath]) -> Result<()> {
        let path = self.archive_path();
        fs::create_dir_all(&self.archive_dir)
            .map_err(|e| compression_error(&self.archive_dir, e))?;

        let mut temp = tempfile::Builder::new()
            .prefix(&format!(".{}.", self.archive_name()))
            .suffix(".tmp")
            .tempfile_in(&self.archive_dir)
            .map_err(|e| compression_error(&self.archive_dir, e))?;
        let staging = temp.path().to_path_buf();

        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            self.compressor.create_archive(sources, &mut writer)?;
            writer.flush().map_err(|e| compression_error(&staging, e))?;
        }
        temp.as_file()
            .sync_all()
            .map_err(|e| compression_error(&staging, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            temp.as_file()
                .set_permissions(fs::Permissions::from_mode(ARCHIVE_MODE))
                .map_err(|e| compression_error(&staging, e))?;
        }

        let replacing = self.exists()?;
        temp.persist(&path).map_err(|e| compression_error(&path, e.error))?;

        if replacing {
            info!(server = %self.server, path = ?path, "Replaced existing archive");
        } else {
            info!(server = %self.server, path = ?path, "Created archive");
        }
        Ok(())
    }

    /// Delete the archive. A missing archive is not an error.
    pub fn delete_if_exists(&self) -> Result<()> {
        if !self.exists()? {
            return Ok(());
        }

        let path = self.archive_path();
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(server = %self.server, path = ?path, "Deleted archive");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Lower-case hex SHA-256 of the archive's current contents.
    pub fn checksum(&self) -> Result<String> {
        let path = self.archive_path();
        let file = File::open(&path).map_err(|e| Error::from_io(e, &path))?;
        let digest = sha256_hex(file)?;

        debug!(server = %self.server, checksum = %digest, "Computed archive checksum");
        Ok(digest)
    }

    /// Compare the archive's checksum against `expected` (hex, any case).
    ///
    /// An `expected` value that is not a hex SHA-256 digest never matches.
    pub fn verify_checksum(&self, expected: &str) -> Result<bool> {
        let expected = expected.trim();
        let actual = self.checksum()?;
        Ok(is_sha256_hex(expected) && actual.eq_ignore_ascii_case(expected))
    }
}

impl fmt::Debug for Archiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Archiver")
            .field("server", &self.server)
            .field("data_dir", &self.data_dir)
            .field("archive_dir", &self.archive_dir)
            .finish_non_exhaustive()
    }
}
