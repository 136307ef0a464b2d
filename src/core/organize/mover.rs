//! The physical move of one file into the category tree.

use super::types::MoveRecord;
use crate::core::destination::{ensure_destination_dir, resolve_collision};
use crate::error::MoveError;
use chrono::NaiveDate;
use std::fs;
use std::io;
use std::path::Path;

/// Moves a file into `base/Category/YYYY/Mon/`.
///
/// Implement this trait to swap the filesystem out (e.g., for testing).
pub trait FileMover: Send + Sync {
    fn move_file(
        &self,
        source: &Path,
        base: &Path,
        category: &str,
        date: NaiveDate,
    ) -> Result<MoveRecord, MoveError>;
}

/// Same-device move using `fs::rename`. Cross-device moves fail with
/// `MoveErrorKind::CrossDevice` instead of falling back to a copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenameMover;

impl FileMover for RenameMover {
    fn move_file(
        &self,
        source: &Path,
        base: &Path,
        category: &str,
        date: NaiveDate,
    ) -> Result<MoveRecord, MoveError> {
        let file_name = source.file_name().ok_or_else(|| {
            MoveError::new(
                source.to_path_buf(),
                base.to_path_buf(),
                io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
            )
        })?;

        let dest_dir = ensure_destination_dir(base, category, date)
            .map_err(|e| MoveError::new(source.to_path_buf(), base.join(category), e))?;

        let intended = dest_dir.join(file_name);
        let destination = resolve_collision(&intended);

        fs::rename(source, &destination)
            .map_err(|e| MoveError::new(source.to_path_buf(), destination.clone(), e))?;

        Ok(MoveRecord {
            source: source.to_path_buf(),
            renamed: destination != intended,
            destination,
            category: category.to_string(),
        })
    }
}
