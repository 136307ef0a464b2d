//! # Scanner Module
//!
//! Finds the files sitting directly in a directory.
//!
//! Only the immediate entries are listed; organized subfolders are never
//! descended into. The listing is a snapshot taken once.

mod filter;

pub use filter::AdmissionFilter;

use crate::error::ScanError;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Files directly inside `dir`, sorted by file name.
///
/// Links pointing at regular files are listed too, so the admission
/// filter sees (and logs) them. Unreadable entries are logged and skipped.
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::ReadDirectory {
            path: dir.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "not a directory"),
        });
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        match entry {
            Ok(entry) if is_file_like(&entry) => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => {
                // The root itself failing to open is fatal
                if e.depth() == 0 {
                    return Err(ScanError::ReadDirectory {
                        path: dir.to_path_buf(),
                        source: e.into(),
                    });
                }
                warn!(error = %e, "Skipping unreadable entry");
            }
        }
    }

    Ok(files)
}

fn is_file_like(entry: &walkdir::DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}
