//! # Folder Watcher Module
//!
//! Organizes new files as they appear in a folder.
//!
//! ## Behaviour
//! - Watches one folder, non-recursively
//! - Reacts to file creation only; new directories are ignored
//! - Debounces each path so a file still being written is handled once,
//!   after it has been quiet for the debounce window
//! - `stop()` releases the subscription, cancels pending timers and waits
//!   for in-flight moves
//!
//! ## Example
//! ```rust,ignore
//! use file_organizer::core::watcher::{FolderWatcher, WatcherConfig};
//!
//! let organizer = Arc::new(Organizer::new("/Users/me/Downloads")?);
//! let mut watcher = FolderWatcher::new("/Users/me/Downloads", organizer, WatcherConfig::default())?;
//! watcher.start()?;
//! // ... until Ctrl+C
//! watcher.stop();
//! ```

mod debounce;

pub use debounce::{DebounceHandle, Debouncer};

use crate::core::organize::Organizer;
use crate::core::require_directory;
use crate::error::{ConfigError, WatcherError};
use crate::events::{null_sender, Event, EventSender, WatcherEvent};
use notify::event::CreateKind;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Configuration for the folder watcher
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Quiet period before a new file is organized
    pub debounce_duration: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            debounce_duration: Duration::from_secs(1),
        }
    }
}

struct Running {
    // Dropped first so no events reach the debouncer after stop
    watcher: RecommendedWatcher,
    debouncer: Debouncer,
}

/// Watches a folder and feeds new files to an [`Organizer`]
pub struct FolderWatcher {
    path: PathBuf,
    config: WatcherConfig,
    organizer: Arc<Organizer>,
    events: EventSender,
    running: Option<Running>,
}

impl FolderWatcher {
    /// Create a watcher for `path`, which must be an existing directory
    pub fn new(
        path: impl Into<PathBuf>,
        organizer: Arc<Organizer>,
        config: WatcherConfig,
    ) -> Result<Self, ConfigError> {
        let path = path.into();
        require_directory(&path)?;

        Ok(Self {
            path,
            config,
            organizer,
            events: null_sender(),
            running: None,
        })
    }

    /// Report watcher activity through an event channel
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = events;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Subscribe to the folder and start organizing new files
    pub fn start(&mut self) -> Result<(), WatcherError> {
        if self.running.is_some() {
            return Err(WatcherError::AlreadyRunning);
        }

        let organizer = Arc::clone(&self.organizer);
        let debouncer = Debouncer::new(self.config.debounce_duration, move |path| {
            organizer.organize_file(&path);
        })
        .map_err(|e| WatcherError::InitFailed(e.to_string()))?;

        let handle = debouncer.handle();
        let events = self.events.clone();
        let mut watcher =
            notify::recommended_watcher(move |result: Result<notify::Event, notify::Error>| {
                match result {
                    Ok(event) => {
                        for path in created_files(&event) {
                            debug!(path = %path.display(), "File created");
                            events.send(Event::Watcher(WatcherEvent::FileDetected {
                                path: path.clone(),
                            }));
                            handle.schedule(path);
                        }
                    }
                    Err(e) => {
                        error!("Watch error: {}", e);
                        events.send(Event::Watcher(WatcherEvent::Error {
                            message: e.to_string(),
                        }));
                    }
                }
            })
            .map_err(|e| WatcherError::InitFailed(e.to_string()))?;

        watcher
            .watch(&self.path, RecursiveMode::NonRecursive)
            .map_err(|e| WatcherError::WatchFailed {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        info!("Starting file watcher on: {}", self.path.display());
        self.events.send(Event::Watcher(WatcherEvent::Started {
            path: self.path.clone(),
        }));
        self.running = Some(Running { watcher, debouncer });
        Ok(())
    }

    /// Stop watching. No file is organized after this returns.
    pub fn stop(&mut self) {
        let Some(Running {
            watcher,
            mut debouncer,
        }) = self.running.take()
        else {
            return;
        };

        info!("Stopping file watcher...");
        drop(watcher);
        debouncer.shutdown();

        self.events.send(Event::Watcher(WatcherEvent::Stopped {
            path: self.path.clone(),
        }));
        info!("File watcher stopped");
    }
}

impl Drop for FolderWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Paths of newly created files in a notify event; directories are ignored
fn created_files(event: &notify::Event) -> Vec<PathBuf> {
    match event.kind {
        EventKind::Create(CreateKind::Folder) => Vec::new(),
        EventKind::Create(CreateKind::File) => event.paths.clone(),
        // Backends that cannot tell files from folders
        EventKind::Create(_) => event.paths.iter().filter(|p| !p.is_dir()).cloned().collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{ModifyKind, RemoveKind};
    use std::fs;
    use tempfile::TempDir;

    fn organizer_for(dir: &TempDir) -> Arc<Organizer> {
        Arc::new(Organizer::new(dir.path()).unwrap())
    }

    #[test]
    fn watcher_config_default() {
        let config = WatcherConfig::default();
        assert_eq!(config.debounce_duration, Duration::from_secs(1));
    }

    #[test]
    fn file_creation_is_reported() {
        let event = notify::Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/downloads/a.pdf"));
        assert_eq!(created_files(&event), vec![PathBuf::from("/downloads/a.pdf")]);
    }

    #[test]
    fn folder_creation_is_ignored() {
        let event = notify::Event::new(EventKind::Create(CreateKind::Folder))
            .add_path(PathBuf::from("/downloads/Pictures"));
        assert!(created_files(&event).is_empty());
    }

    #[test]
    fn ambiguous_creation_checks_disk() {
        let temp = TempDir::new().unwrap();
        let sub = temp.path().join("Documents");
        fs::create_dir(&sub).unwrap();
        let file = temp.path().join("a.pdf");

        let event = notify::Event::new(EventKind::Create(CreateKind::Any))
            .add_path(sub)
            .add_path(file.clone());
        assert_eq!(created_files(&event), vec![file]);
    }

    #[test]
    fn other_event_kinds_are_ignored() {
        let modify = notify::Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/downloads/a.pdf"));
        let remove = notify::Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("/downloads/a.pdf"));
        assert!(created_files(&modify).is_empty());
        assert!(created_files(&remove).is_empty());
    }

    #[test]
    fn watcher_fails_for_nonexistent_path() {
        let temp = TempDir::new().unwrap();
        let result = FolderWatcher::new(
            "/nonexistent/path/that/doesnt/exist",
            organizer_for(&temp),
            WatcherConfig::default(),
        );
        assert!(matches!(result, Err(ConfigError::PathNotFound { .. })));
    }

    #[test]
    fn watcher_starts_and_stops() {
        let temp = TempDir::new().unwrap();
        let mut watcher =
            FolderWatcher::new(temp.path(), organizer_for(&temp), WatcherConfig::default())
                .unwrap();

        watcher.start().unwrap();
        assert!(watcher.is_running());
        assert!(matches!(watcher.start(), Err(WatcherError::AlreadyRunning)));

        watcher.stop();
        assert!(!watcher.is_running());
        // Stopping twice is a no-op
        watcher.stop();
    }
}
