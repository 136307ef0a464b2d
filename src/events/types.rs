//! Event type definitions for progress reporting.

use crate::core::organize::{BatchSummary, MoveRecord, SkipReason};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the organizer and the watcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Per-file and batch events
    Organize(OrganizeEvent),
    /// Folder watcher events
    Watcher(WatcherEvent),
}

/// Events from the organize pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrganizeEvent {
    /// A batch run listed its files
    BatchStarted { path: PathBuf, total: usize },
    /// A file was moved into the category tree
    FileMoved(MoveRecord),
    /// A file was left alone
    FileSkipped { path: PathBuf, reason: SkipReason },
    /// A file could not be moved
    FileFailed { path: PathBuf, message: String },
    /// A batch run finished
    BatchCompleted(BatchSummary),
}

/// Events from the folder watcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WatcherEvent {
    /// Watcher started monitoring a folder
    Started { path: PathBuf },
    /// A new file appeared and was queued for organizing
    FileDetected { path: PathBuf },
    /// Watcher stopped monitoring a folder
    Stopped { path: PathBuf },
    /// The filesystem subscription reported an error
    Error { message: String },
}
