//! Artifact collection: walk the export directories and parse every
//! record into memory. Pure I/O; no merging happens here.

use std::path::Path;

use log::warn;
use walkdir::WalkDir;

use crate::records::{read_tca_records, read_vignetting_records, TcaRecord, VignettingRecord};

/// Read every `.tca` artifact under `dir`, sorted by file name so the
/// later fold is deterministic. Unreadable artifacts are skipped with
/// a warning; a missing directory simply yields no records.
pub fn collect_tca_records(dir: &Path) -> Vec<TcaRecord> {
    collect(dir, "tca", read_tca_records)
}

/// Read every `.vig` artifact under `dir`; same contract as
/// [`collect_tca_records`].
pub fn collect_vignetting_records(dir: &Path) -> Vec<VignettingRecord> {
    collect(dir, "vig", read_vignetting_records)
}

fn collect<T, E: std::fmt::Display>(
    dir: &Path,
    extension: &str,
    read: impl Fn(&Path) -> Result<Vec<T>, E>,
) -> Vec<T> {
    let mut out = Vec::new();
    if !dir.is_dir() {
        return out;
    }
    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        match read(path) {
            Ok(records) => out.extend(records),
            Err(err) => warn!("skipping {}: {err}", path.display()),
        }
    }
    out
}
