//! Destination folders and collision-free file names.
//!
//! Files land in `base/Category/YYYY/Mon/`, e.g. `Pictures/2025/Dec/`.
//! A name that is already taken becomes `name(1).ext`, `name(2).ext`, ...

use chrono::{Datelike, NaiveDate};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// `Category/YYYY/Mon` relative to the base directory
pub fn destination_relative(category: &str, date: NaiveDate) -> PathBuf {
    let year = format!("{:04}", date.year());
    let month = date.format("%b").to_string();
    Path::new(category).join(year).join(month)
}

/// Create `base/category/YYYY/Mon` if missing and return it.
///
/// Idempotent: existing segments are left alone, concurrent callers are fine.
pub fn ensure_destination_dir(base: &Path, category: &str, date: NaiveDate) -> io::Result<PathBuf> {
    let dir = base.join(destination_relative(category, date));
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// First free path among `intended`, `stem(1)ext`, `stem(2)ext`, ...
///
/// Existence is re-checked on disk for every candidate.
pub fn resolve_collision(intended: &Path) -> PathBuf {
    if !exists(intended) {
        return intended.to_path_buf();
    }

    let parent = intended.parent().unwrap_or(Path::new(""));
    let file_name = intended.file_name().unwrap_or_default();
    // Split at the last dot, keeping the raw OS bytes of the name
    let (stem, ext) = match (intended.file_stem(), intended.extension()) {
        (Some(stem), Some(ext)) if !ext.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    };

    let mut counter: u64 = 1;
    loop {
        let mut candidate = OsString::from(stem);
        candidate.push(format!("({counter})"));
        if let Some(ext) = ext {
            candidate.push(".");
            candidate.push(ext);
        }
        let candidate = parent.join(candidate);
        if !exists(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

// Dangling symlinks still occupy the name.
fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}
