#[cfg(unix)]
mod traversal_tests {
    use std::fs;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;
    use wharf_core::{Archiver, Error, ServerId};
    use wharf_testing::assertions::read_tar_gz;
    use wharf_testing::fixtures::{create_escaping_symlink, create_hello_world};
    use wharf_testing::ServerLayout;

    fn archiver(layout: &ServerLayout) -> Archiver {
        Archiver::new(
            ServerId::new(&layout.id).unwrap(),
            layout.data_dir(),
            layout.archive_dir(),
        )
    }

    #[test]
    fn test_symlink_to_etc_is_rejected() {
        let layout = ServerLayout::new("alpha").unwrap();
        create_hello_world(&layout).unwrap();
        symlink("/etc", layout.data_dir().join("evil")).unwrap();
        let archiver = archiver(&layout);

        let err = archiver.archive().unwrap_err();
        assert!(matches!(err, Error::PathTraversal { .. }), "got {:?}", err);
        assert!(!archiver.exists().unwrap());
    }

    #[test]
    fn test_failed_archive_removes_previous_archive() {
        let layout = ServerLayout::new("alpha").unwrap();
        create_hello_world(&layout).unwrap();
        let archiver = archiver(&layout);
        archiver.archive().unwrap();
        assert!(archiver.exists().unwrap());

        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret"), "top secret").unwrap();
        create_escaping_symlink(&layout, outside.path()).unwrap();

        assert!(matches!(
            archiver.archive(),
            Err(Error::PathTraversal { .. })
        ));
        assert!(!archiver.exists().unwrap());
        assert!(archiver.checksum().unwrap_err().is_not_found());
    }

    #[test]
    fn test_relative_symlink_escape_is_rejected() {
        let layout = ServerLayout::new("alpha").unwrap();
        layout
            .test_dir
            .create_file("volumes/beta/secret.txt", b"beta's data")
            .unwrap();
        symlink("../beta", layout.data_dir().join("neighbour")).unwrap();

        assert!(matches!(
            archiver(&layout).archive(),
            Err(Error::PathTraversal { .. })
        ));
    }

    #[test]
    fn test_internal_symlink_is_kept_as_link() {
        let layout = ServerLayout::new("alpha").unwrap();
        layout.create_data_file("world/level.dat", b"level").unwrap();
        symlink("world", layout.data_dir().join("current")).unwrap();
        let archiver = archiver(&layout);

        archiver.archive().unwrap();
        let files = read_tar_gz(&archiver.archive_path()).unwrap();
        assert_eq!(files.get("world/level.dat").map(Vec::as_slice), Some(&b"level"[..]));
        assert!(files.keys().all(|name| !name.starts_with("current/")));
    }

    #[test]
    fn test_nested_symlink_is_not_followed() {
        let layout = ServerLayout::new("alpha").unwrap();
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret"), "top secret").unwrap();
        fs::create_dir(layout.data_dir().join("plugins")).unwrap();
        symlink(outside.path(), layout.data_dir().join("plugins/escape")).unwrap();
        let archiver = archiver(&layout);

        archiver.archive().unwrap();
        let files = read_tar_gz(&archiver.archive_path()).unwrap();
        assert!(files.keys().all(|name| !name.contains("secret")));
    }

    #[test]
    fn test_unreadable_file_is_compression_error() {
        use std::os::unix::fs::PermissionsExt;

        let layout = ServerLayout::new("alpha").unwrap();
        let locked = layout.create_data_file("locked.dat", b"private").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // root can read anything regardless of mode bits
        if fs::read(&locked).is_ok() {
            return;
        }

        let archiver = archiver(&layout);
        assert!(matches!(archiver.archive(), Err(Error::Compression(_))));
        assert!(!archiver.exists().unwrap());
    }
}

// Dummy test for non-Unix platforms
#[cfg(not(unix))]
#[test]
fn test_symlinks_not_supported() {
    assert!(true);
}
