//! Organizes single files and whole directories.

use super::mover::{FileMover, RenameMover};
use super::types::*;
use crate::core::categorizer::CategoryTable;
use crate::core::require_directory;
use crate::core::scanner::{list_files, AdmissionFilter};
use crate::error::{ConfigError, ScanError};
use crate::events::{null_sender, Event, EventSender, OrganizeEvent};
use chrono::{DateTime, Local, NaiveDate};
use std::any::Any;
use std::fs;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;
use tracing::{error, info, warn};

/// Builder for [`Organizer`]
pub struct OrganizerBuilder {
    base_path: PathBuf,
    categories: CategoryTable,
    filter: AdmissionFilter,
    retry: RetryPolicy,
    date_source: DateSource,
    mover: Box<dyn FileMover>,
    events: Option<EventSender>,
}

impl OrganizerBuilder {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            categories: CategoryTable::default(),
            filter: AdmissionFilter::default(),
            retry: RetryPolicy::default(),
            date_source: DateSource::default(),
            mover: Box::new(RenameMover),
            events: None,
        }
    }

    /// Set the category table
    pub fn categories(mut self, categories: CategoryTable) -> Self {
        self.categories = categories;
        self
    }

    /// Set the admission filter
    pub fn filter(mut self, filter: AdmissionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the retry policy for locked files
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Choose which timestamp picks the dated folder
    pub fn date_source(mut self, date_source: DateSource) -> Self {
        self.date_source = date_source;
        self
    }

    /// Replace the filesystem mover
    pub fn mover(mut self, mover: Box<dyn FileMover>) -> Self {
        self.mover = mover;
        self
    }

    /// Report progress through an event channel
    pub fn events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Build the organizer, failing if the base path is not a directory
    pub fn build(self) -> Result<Organizer, ConfigError> {
        require_directory(&self.base_path)?;

        Ok(Organizer {
            base_path: self.base_path,
            categories: self.categories,
            filter: self.filter,
            retry: self.retry,
            date_source: self.date_source,
            mover: self.mover,
            events: self.events.unwrap_or_else(null_sender),
        })
    }
}

/// Files everything in one base directory into `Category/YYYY/Mon`
pub struct Organizer {
    base_path: PathBuf,
    categories: CategoryTable,
    filter: AdmissionFilter,
    retry: RetryPolicy,
    date_source: DateSource,
    mover: Box<dyn FileMover>,
    events: EventSender,
}

impl Organizer {
    /// Create a new organizer builder
    pub fn builder(base_path: impl Into<PathBuf>) -> OrganizerBuilder {
        OrganizerBuilder::new(base_path)
    }

    /// Organizer with default settings
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        OrganizerBuilder::new(base_path).build()
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    /// Organize one file with the configured retry policy.
    ///
    /// Never panics and never returns an error: every failure is reported
    /// as [`OrganizeOutcome::Failed`].
    pub fn organize_file(&self, path: &Path) -> OrganizeOutcome {
        self.organize_file_with_retries(path, self.retry.max_attempts)
    }

    /// Organize one file, making at most `max_retries` move attempts
    pub fn organize_file_with_retries(&self, path: &Path, max_retries: u32) -> OrganizeOutcome {
        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| {
            self.process(path, max_retries.max(1))
        })) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(path = %path.display(), "Unexpected error organizing file: {}", message);
                OrganizeOutcome::Failed(format!("unexpected error: {message}"))
            }
        };

        self.report(path, &outcome);
        outcome
    }

    /// Organize every regular file directly inside the base directory.
    ///
    /// The file list is a snapshot; files are handled one at a time in
    /// name order. Only an unreadable base directory is an error.
    pub fn organize_batch(&self) -> Result<BatchSummary, ScanError> {
        let start = Instant::now();
        info!("Starting organization of: {}", self.base_path.display());

        let files = list_files(&self.base_path)?;
        info!("Found {} files to process", files.len());
        self.events.send(Event::Organize(OrganizeEvent::BatchStarted {
            path: self.base_path.clone(),
            total: files.len(),
        }));

        let mut summary = BatchSummary::default();
        for file in &files {
            match self.organize_file(file) {
                OrganizeOutcome::Moved(record) => {
                    summary.moved += 1;
                    summary.records.push(record);
                }
                OrganizeOutcome::Skipped(_) => summary.skipped += 1,
                OrganizeOutcome::Failed(_) => summary.failed += 1,
            }
        }
        summary.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            skipped = summary.skipped,
            failed = summary.failed,
            "Organization complete. Moved {} files",
            summary.moved
        );
        self.events
            .send(Event::Organize(OrganizeEvent::BatchCompleted(summary.clone())));

        Ok(summary)
    }

    fn process(&self, path: &Path, max_attempts: u32) -> OrganizeOutcome {
        if !self.filter.is_eligible(path) {
            // May have been handled by another process since discovery
            if !entry_exists(path) {
                warn!("File no longer exists: {}", path.display());
                return OrganizeOutcome::Skipped(SkipReason::Vanished);
            }
            return OrganizeOutcome::Skipped(SkipReason::Ineligible);
        }

        let category = self.categories.category_for_path(path).to_string();
        info!(
            "Detected file: '{}' -> Category: {}",
            display_name(path),
            category
        );

        let date = match file_date(path, self.date_source) {
            Ok(date) => date,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("File no longer exists: {}", path.display());
                return OrganizeOutcome::Skipped(SkipReason::Vanished);
            }
            Err(e) => {
                error!("Failed to read timestamp of '{}': {}", path.display(), e);
                return OrganizeOutcome::Failed(e.to_string());
            }
        };

        self.move_with_retry(path, &category, date, max_attempts)
    }

    fn move_with_retry(
        &self,
        path: &Path,
        category: &str,
        date: NaiveDate,
        max_attempts: u32,
    ) -> OrganizeOutcome {
        let mut attempt = 0;
        loop {
            match self.mover.move_file(path, &self.base_path, category, date) {
                Ok(record) => {
                    if record.renamed {
                        info!(
                            "Duplicate detected: '{}' renamed to '{}'",
                            display_name(&record.source),
                            display_name(&record.destination)
                        );
                    }
                    info!(
                        "Moved: '{}' -> '{}'",
                        record.source.display(),
                        record.destination.display()
                    );
                    return OrganizeOutcome::Moved(record);
                }
                Err(e) if e.kind.is_retryable() && attempt + 1 < max_attempts => {
                    let wait = self.retry.delay_for(attempt);
                    warn!(
                        "File locked, retrying in {:?} (attempt {}/{}): {}",
                        wait,
                        attempt + 1,
                        max_attempts,
                        path.display()
                    );
                    thread::sleep(wait);
                    attempt += 1;
                }
                Err(e) if e.kind.is_retryable() => {
                    error!(
                        "Permission denied after {} attempts for '{}': {}",
                        max_attempts,
                        path.display(),
                        e.io
                    );
                    return OrganizeOutcome::Failed(e.to_string());
                }
                Err(e) if e.io.kind() == io::ErrorKind::NotFound && !entry_exists(path) => {
                    warn!("File disappeared before it could be moved: {}", path.display());
                    return OrganizeOutcome::Skipped(SkipReason::Vanished);
                }
                Err(e) => {
                    error!("Failed to move '{}': {}", path.display(), e.io);
                    return OrganizeOutcome::Failed(e.to_string());
                }
            }
        }
    }

    fn report(&self, path: &Path, outcome: &OrganizeOutcome) {
        let event = match outcome {
            OrganizeOutcome::Moved(record) => OrganizeEvent::FileMoved(record.clone()),
            OrganizeOutcome::Skipped(reason) => OrganizeEvent::FileSkipped {
                path: path.to_path_buf(),
                reason: *reason,
            },
            OrganizeOutcome::Failed(message) => OrganizeEvent::FileFailed {
                path: path.to_path_buf(),
                message: message.clone(),
            },
        };
        self.events.send(Event::Organize(event));
    }
}

/// Local calendar date of the chosen timestamp
fn file_date(path: &Path, source: DateSource) -> io::Result<NaiveDate> {
    let metadata = fs::metadata(path)?;
    let time = match source {
        DateSource::Modified => metadata.modified()?,
        DateSource::Created => metadata.created().or_else(|_| metadata.modified())?,
    };
    let datetime: DateTime<Local> = time.into();
    Ok(datetime.date_naive())
}

fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
