//! Common assertions for wharf testing

use anyhow::Result;
use flate2::read::GzDecoder;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Reads every regular file entry of a `.tar.gz` into `name -> content`
pub fn read_tar_gz(archive: &Path) -> Result<BTreeMap<String, Vec<u8>>> {
    let mut archive = tar::Archive::new(GzDecoder::new(File::open(archive)?));
    let mut files = BTreeMap::new();

    for entry in archive.entries()? {
        let mut entry = entry?;
        if entry.header().entry_type() != tar::EntryType::Regular {
            continue;
        }
        let name = entry.path()?.to_string_lossy().into_owned();
        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;
        files.insert(name, content);
    }

    Ok(files)
}

/// Lists every entry name (files, directories and links) of a `.tar.gz`
pub fn list_tar_gz(archive: &Path) -> Result<Vec<String>> {
    let mut archive = tar::Archive::new(GzDecoder::new(File::open(archive)?));
    let mut names = Vec::new();
    for entry in archive.entries()? {
        let entry = entry?;
        names.push(entry.path()?.to_string_lossy().into_owned());
    }
    Ok(names)
}

/// Asserts that a `.tar.gz` contains `name` with exactly `expected` as content
pub fn assert_archive_contains(archive: &Path, name: &str, expected: &[u8]) -> Result<()> {
    let files = read_tar_gz(archive)?;
    let content = files
        .get(name)
        .unwrap_or_else(|| panic!("{} not found in {:?}: {:?}", name, archive, files.keys()));

    assert_eq!(
        content.as_slice(),
        expected,
        "Content mismatch for {} in {:?}",
        name,
        archive
    );
    Ok(())
}

/// Asserts that `checksum` looks like a lower-case hex SHA-256 digest
pub fn assert_sha256_hex(checksum: &str) {
    assert_eq!(checksum.len(), 64, "checksum has wrong length: {}", checksum);
    assert!(
        checksum
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)),
        "checksum is not lower-case hex: {}",
        checksum
    );
}
