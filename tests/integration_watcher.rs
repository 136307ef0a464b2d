//! Integration tests for the folder watcher.
//!
//! These use the real filesystem subscription with short debounce windows.

use assert_fs::prelude::*;
use assert_fs::TempDir;
use file_organizer::core::organize::Organizer;
use file_organizer::core::watcher::{FolderWatcher, WatcherConfig};
use file_organizer::events::{Event, EventChannel, EventReceiver, OrganizeEvent};
use predicates::prelude::*;
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Counts every `organize_file` call the watcher makes
struct DispatchCounter {
    receiver: EventReceiver,
    seen: Cell<usize>,
}

impl DispatchCounter {
    fn count(&self) -> usize {
        while let Some(event) = self.receiver.try_recv() {
            if matches!(
                event,
                Event::Organize(
                    OrganizeEvent::FileMoved(_)
                        | OrganizeEvent::FileSkipped { .. }
                        | OrganizeEvent::FileFailed { .. }
                )
            ) {
                self.seen.set(self.seen.get() + 1);
            }
        }
        self.seen.get()
    }
}

fn watcher_for(temp: &TempDir, debounce: Duration) -> (FolderWatcher, DispatchCounter) {
    let (sender, receiver) = EventChannel::new();
    let organizer = Organizer::builder(temp.path())
        .events(sender)
        .build()
        .unwrap();

    let watcher = FolderWatcher::new(
        temp.path(),
        Arc::new(organizer),
        WatcherConfig {
            debounce_duration: debounce,
        },
    )
    .unwrap();

    let counter = DispatchCounter {
        receiver,
        seen: Cell::new(0),
    };
    (watcher, counter)
}

fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    condition()
}

fn organized_files(root: &Path) -> Vec<PathBuf> {
    walk(root)
        .into_iter()
        .filter(|p| p.parent() != Some(root))
        .collect()
}

fn walk(dir: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).unwrap().flatten() {
        let path = entry.path();
        if path.is_dir() {
            out.extend(walk(&path));
        } else {
            out.push(path);
        }
    }
    out
}

#[test]
fn new_file_is_organized() {
    let temp = TempDir::new().unwrap();
    let (mut watcher, dispatches) = watcher_for(&temp, Duration::from_millis(100));
    watcher.start().unwrap();
    thread::sleep(Duration::from_millis(100));

    temp.child("report.pdf").write_str("quarterly numbers").unwrap();

    assert!(wait_until(Duration::from_secs(5), || {
        dispatches.count() == 1
    }));
    watcher.stop();

    temp.child("report.pdf").assert(predicate::path::missing());
    let organized = organized_files(temp.path());
    assert_eq!(organized.len(), 1);
    assert!(organized[0].starts_with(temp.path().join("Documents")));
}

#[test]
fn repeated_creation_is_organized_once() {
    let temp = TempDir::new().unwrap();
    let (mut watcher, dispatches) = watcher_for(&temp, Duration::from_millis(400));
    watcher.start().unwrap();
    thread::sleep(Duration::from_millis(100));

    let file = temp.child("photo.jpg");
    file.write_str("first").unwrap();
    thread::sleep(Duration::from_millis(50));
    fs::remove_file(file.path()).unwrap();
    file.write_str("second").unwrap();

    assert!(wait_until(Duration::from_secs(5), || {
        dispatches.count() >= 1
    }));
    // Give a second (wrong) dispatch time to show up
    thread::sleep(Duration::from_millis(600));
    watcher.stop();

    assert_eq!(dispatches.count(), 1);
}

#[test]
fn directories_are_not_organized() {
    let temp = TempDir::new().unwrap();
    let (mut watcher, dispatches) = watcher_for(&temp, Duration::from_millis(50));
    watcher.start().unwrap();
    thread::sleep(Duration::from_millis(100));

    temp.child("new-folder").create_dir_all().unwrap();
    thread::sleep(Duration::from_millis(400));
    watcher.stop();

    assert_eq!(dispatches.count(), 0);
    temp.child("new-folder").assert(predicate::path::is_dir());
}

#[test]
fn nothing_is_organized_after_stop() {
    let temp = TempDir::new().unwrap();
    let (mut watcher, dispatches) = watcher_for(&temp, Duration::from_millis(500));
    watcher.start().unwrap();
    thread::sleep(Duration::from_millis(100));

    temp.child("late.zip").write_str("zip").unwrap();
    thread::sleep(Duration::from_millis(100));
    watcher.stop();

    thread::sleep(Duration::from_millis(800));
    assert_eq!(dispatches.count(), 0);
    temp.child("late.zip").assert(predicate::path::exists());
}
