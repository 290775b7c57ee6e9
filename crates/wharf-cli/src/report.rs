//! Human and JSON rendering of archive metadata

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use wharf_core::FileStat;

/// Archive metadata as printed by `wharf stat`
#[derive(Debug, Serialize)]
pub struct StatReport {
    pub name: String,
    pub path: String,
    pub size: u64,
    pub modified: Option<String>,
    pub mode: Option<String>,
    pub is_symlink: bool,
}

impl StatReport {
    pub fn new(path: &Path, stat: &FileStat) -> Self {
        Self {
            name: stat.name.clone(),
            path: path.display().to_string(),
            size: stat.size,
            modified: stat
                .modified
                .map(|time| DateTime::<Utc>::from(time).to_rfc3339()),
            mode: stat.mode.map(|mode| format!("{:o}", mode & 0o7777)),
            is_symlink: stat.is_symlink,
        }
    }

    pub fn to_text(&self) -> String {
        let mut lines = vec![
            format!("name:     {}", self.name),
            format!("path:     {}", self.path),
            format!("size:     {} ({} bytes)", human_size(self.size), self.size),
        ];
        if let Some(modified) = &self.modified {
            lines.push(format!("modified: {}", modified));
        }
        if let Some(mode) = &self.mode {
            lines.push(format!("mode:     {}", mode));
        }
        lines.join("\n")
    }
}

/// Format a byte count with binary units
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(1023), "1023 B");
        assert_eq!(human_size(1536), "1.5 KiB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.0 MiB");
    }

    #[test]
    fn test_report_formats_time_and_mode() {
        let stat = FileStat {
            name: "alpha.tar.gz".to_string(),
            size: 2048,
            modified: Some(UNIX_EPOCH + Duration::from_secs(1_700_000_000)),
            mode: Some(0o100644),
            is_dir: false,
            is_symlink: false,
        };

        let report = StatReport::new(Path::new("/srv/archives/alpha.tar.gz"), &stat);
        assert_eq!(report.modified.as_deref(), Some("2023-11-14T22:13:20+00:00"));
        assert_eq!(report.mode.as_deref(), Some("644"));
        assert!(report.to_text().contains("2.0 KiB (2048 bytes)"));
    }
}
