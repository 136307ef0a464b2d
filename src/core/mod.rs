//! # Core Module
//!
//! The organize pipeline and the watch loop that feeds it.
//!
//! ## Modules
//! - `categorizer` - Maps file extensions to category labels
//! - `destination` - Builds dated folders and collision-free names
//! - `scanner` - Admission filter and directory listing
//! - `organize` - Moves files, retrying locked ones
//! - `watcher` - Debounced watching of a folder for new files

pub mod categorizer;
pub mod destination;
pub mod organize;
pub mod scanner;
pub mod watcher;

// Re-export commonly used types
pub use categorizer::{CategoryDefinition, CategoryTable, OTHERS};
pub use organize::{BatchSummary, MoveRecord, OrganizeOutcome, Organizer};
pub use scanner::AdmissionFilter;
pub use watcher::{FolderWatcher, WatcherConfig};

use crate::error::ConfigError;
use std::path::Path;

/// Fail unless `path` is an existing directory
pub(crate) fn require_directory(path: &Path) -> Result<(), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::PathNotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Err(ConfigError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}
