//! Pre-update record snapshots

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::Result;

/// File stem for a record URI: `/repositories/2/archival_objects/5` -> `repositories_2_archival_objects_5`
pub fn backup_stem(uri: &str) -> String {
    uri.trim_start_matches('/').replace('/', "_")
}

/// Write `record` as pretty JSON into `dir`, named after its URI
///
/// An existing snapshot of the same record is kept; the new one gets a
/// timestamp suffix.
pub fn write_backup(dir: &Path, uri: &str, record: &Value) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let stem = backup_stem(uri);
    let mut path = dir.join(format!("{}.json", stem));
    if path.exists() {
        let stamp = chrono::Local::now().format("%Y%m%dT%H%M%S%3f");
        path = dir.join(format!("{}_{}.json", stem, stamp));
    }

    let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
    let json = serde_json::to_string_pretty(record)?;
    file.write_all(json.as_bytes())?;
    file.write_all(b"\n")?;

    log::debug!("Backed up {} to {}", uri, path.display());
    Ok(path)
}
