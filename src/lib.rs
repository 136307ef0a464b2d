//! # File Organizer
//!
//! Files new downloads into `Category/Year/Month` folders.
//!
//! ## Architecture
//! - `core` - Categorizer, destination resolver, admission filter, organize
//!   pipeline and the debounced folder watcher
//! - `events` - Progress events for UI layers
//! - `error` - Error types
//!
//! The `file-organizer` binary adds the command-line interface.

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{OrganizerError, Result};

use error::LoggingError;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize tracing for the application.
///
/// Logs go to stdout at `info` unless `RUST_LOG` says otherwise. With a
/// `log_file`, the same records are appended there without colors.
pub fn init_tracing(log_file: Option<&Path>) -> std::result::Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|source| LoggingError::OpenLogFile {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| LoggingError::OpenLogFile {
                    path: path.to_path_buf(),
                    source,
                })?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    if let Some(path) = log_file {
        tracing::info!("File logging enabled: {}", path.display());
    }
    Ok(())
}
