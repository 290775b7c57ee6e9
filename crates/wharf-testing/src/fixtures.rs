//! Common server data fixtures

use crate::ServerLayout;
use anyhow::Result;
use filetime::FileTime;
use std::path::Path;
use walkdir::WalkDir;

/// Fixed modification time applied by [`pin_mtimes`]
pub const PINNED_MTIME: i64 = 1_700_000_000;

/// `a.txt` = "hello" and `b.txt` = "world"
pub fn create_hello_world(layout: &ServerLayout) -> Result<()> {
    layout.create_data_file("a.txt", b"hello")?;
    layout.create_data_file("b.txt", b"world")?;
    Ok(())
}

/// A small game-server style tree with nested directories
pub fn create_server_files(layout: &ServerLayout) -> Result<()> {
    layout.create_data_file("server.properties", b"motd=A wharf test server\nmax-players=20\n")?;
    layout.create_data_file("eula.txt", b"eula=true\n")?;
    layout.create_data_file("world/level.dat", &[0x0A, 0x00, 0x00, 0x01, 0x02, 0x03])?;
    layout.create_data_file("world/region/r.0.0.mca", &vec![0x5Au8; 16 * 1024])?;
    layout.create_data_file("plugins/config.yml", b"enabled: true\n")?;
    layout.create_data_file("logs/latest.log", b"[00:00:00] Done\n")?;
    Ok(())
}

/// A data directory containing `evil -> <outside>` (Unix only)
#[cfg(unix)]
pub fn create_escaping_symlink(layout: &ServerLayout, outside: &Path) -> Result<()> {
    std::os::unix::fs::symlink(outside, layout.data_dir().join("evil"))?;
    Ok(())
}

/// Set every file and directory under `root` to [`PINNED_MTIME`]
pub fn pin_mtimes(root: &Path) -> Result<()> {
    let mtime = FileTime::from_unix_time(PINNED_MTIME, 0);
    for entry in WalkDir::new(root).contents_first(true) {
        let entry = entry?;
        if !entry.path_is_symlink() {
            filetime::set_file_mtime(entry.path(), mtime)?;
        }
    }
    Ok(())
}
