//! Safe resolution of directory entries against a trusted root

use super::ResolvedPath;
use crate::{Error, Result};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, error};

/// Resolves entry names against a trusted base directory.
pub trait PathResolver: Send + Sync {
    /// Join `name` onto `base`, failing with [`Error::PathTraversal`] if the
    /// result (after following symlinks) would end up outside of `base`.
    fn safe_join(&self, base: &Path, name: &Path) -> Result<ResolvedPath>;
}

/// Resolver backed by the real filesystem.
///
/// Names are checked lexically first (no `..`, no absolute paths, no
/// prefixes), then the joined path is canonicalized so that symlinks are
/// judged by where they actually point. The returned path is the joined
/// path itself, not the symlink target.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafeResolver;

impl PathResolver for SafeResolver {
    fn safe_join(&self, base: &Path, name: &Path) -> Result<ResolvedPath> {
        let canonical_base = base.canonicalize().map_err(|e| Error::from_io(e, base))?;

        let mut joined = canonical_base.clone();
        for component in name.components() {
            match component {
                Component::Normal(part) => joined.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    error!(base = ?base, name = ?name, "Entry name leaves its base directory");
                    return Err(traversal(base, name));
                }
            }
        }

        let target = match joined.canonicalize() {
            Ok(target) => target,
            Err(e) if e.kind() == io::ErrorKind::NotFound => dangling_target(&joined)?,
            Err(e) => return Err(Error::Io(e)),
        };

        if !target.starts_with(&canonical_base) {
            error!(
                base = ?canonical_base,
                path = ?joined,
                target = ?target,
                "Entry resolves outside of its base directory"
            );
            return Err(traversal(base, name));
        }

        debug!(path = ?joined, "Resolved entry");
        Ok(ResolvedPath(joined))
    }
}

fn traversal(base: &Path, name: &Path) -> Error {
    Error::PathTraversal {
        base: base.to_path_buf(),
        path: name.to_path_buf(),
    }
}

/// Where a path that could not be canonicalized would point.
///
/// For a broken symlink this is the lexically normalized link target; for a
/// path that simply does not exist yet it is the path itself.
fn dangling_target(joined: &Path) -> Result<PathBuf> {
    let meta = match fs::symlink_metadata(joined) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(joined.to_path_buf()),
        Err(e) => return Err(Error::Io(e)),
    };
    if !meta.file_type().is_symlink() {
        return Ok(joined.to_path_buf());
    }

    let link = fs::read_link(joined)?;
    let absolute = match joined.parent() {
        Some(parent) if link.is_relative() => parent.join(link),
        _ => link,
    };
    Ok(normalize(&absolute))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_safe_join_normal() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("server.properties"), "motd=hi").unwrap();

        let resolved = SafeResolver
            .safe_join(temp_dir.path(), Path::new("server.properties"))
            .unwrap();
        let base = temp_dir.path().canonicalize().unwrap();
        assert_eq!(resolved.as_path(), base.join("server.properties"));
    }

    #[test]
    fn test_safe_join_missing_entry_is_allowed() {
        let temp_dir = TempDir::new().unwrap();
        let resolved = SafeResolver
            .safe_join(temp_dir.path(), Path::new("not-yet"))
            .unwrap();
        assert!(resolved.ends_with("not-yet"));
    }

    #[test]
    fn test_safe_join_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let err = SafeResolver
            .safe_join(temp_dir.path(), Path::new("../etc/passwd"))
            .unwrap_err();
        assert!(matches!(err, Error::PathTraversal { .. }));
    }

    #[test]
    fn test_safe_join_absolute() {
        let temp_dir = TempDir::new().unwrap();
        let err = SafeResolver
            .safe_join(temp_dir.path(), Path::new("/etc/passwd"))
            .unwrap_err();
        assert!(matches!(err, Error::PathTraversal { .. }));
    }

    #[test]
    fn test_safe_join_missing_base() {
        let temp_dir = TempDir::new().unwrap();
        let err = SafeResolver
            .safe_join(&temp_dir.path().join("nope"), Path::new("file"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[cfg(unix)]
    #[test]
    fn test_safe_join_symlink_escape() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        symlink(outside.path(), temp_dir.path().join("evil")).unwrap();

        let err = SafeResolver
            .safe_join(temp_dir.path(), Path::new("evil"))
            .unwrap_err();
        assert!(matches!(err, Error::PathTraversal { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_safe_join_symlink_inside() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("world")).unwrap();
        symlink("world", temp_dir.path().join("latest")).unwrap();

        let resolved = SafeResolver
            .safe_join(temp_dir.path(), Path::new("latest"))
            .unwrap();
        assert!(resolved.ends_with("latest"));
    }

    #[cfg(unix)]
    #[test]
    fn test_safe_join_dangling_symlink_escape() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        symlink("../../nowhere/secret", temp_dir.path().join("broken")).unwrap();

        let err = SafeResolver
            .safe_join(temp_dir.path(), Path::new("broken"))
            .unwrap_err();
        assert!(matches!(err, Error::PathTraversal { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_safe_join_dangling_symlink_inside() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        symlink("logs/latest.log", temp_dir.path().join("current.log")).unwrap();

        assert!(SafeResolver
            .safe_join(temp_dir.path(), Path::new("current.log"))
            .is_ok());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(Path::new("/srv/data/./a/../b")),
            PathBuf::from("/srv/data/b")
        );
    }
}
