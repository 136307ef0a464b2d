//! Per-path debouncing.
//!
//! A single actor thread owns the pending map (path -> deadline). Other
//! threads talk to it only through [`DebounceHandle`] commands, so there is
//! never more than one live timer per path. Due paths are removed from the
//! map and dispatched on their own thread.

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, trace};

enum Command {
    Schedule(PathBuf),
    Cancel(PathBuf),
    Shutdown,
}

/// Cloneable handle for scheduling paths from any thread.
///
/// Commands sent after shutdown are dropped.
#[derive(Clone)]
pub struct DebounceHandle {
    commands: Sender<Command>,
}

impl DebounceHandle {
    /// Start or restart the timer for `path`
    pub fn schedule(&self, path: PathBuf) {
        let _ = self.commands.send(Command::Schedule(path));
    }

    /// Drop the timer for `path`, if any
    pub fn cancel(&self, path: PathBuf) {
        let _ = self.commands.send(Command::Cancel(path));
    }
}

/// Runs `dispatch(path)` once no new event for `path` has arrived for `delay`
pub struct Debouncer {
    handle: DebounceHandle,
    actor: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new<F>(delay: Duration, dispatch: F) -> std::io::Result<Self>
    where
        F: Fn(PathBuf) + Send + Sync + 'static,
    {
        let (commands, inbox) = unbounded();
        let dispatch = Arc::new(dispatch);

        let actor = thread::Builder::new()
            .name("debounce".to_string())
            .spawn(move || run_actor(inbox, delay, dispatch))?;

        Ok(Self {
            handle: DebounceHandle { commands },
            actor: Some(actor),
        })
    }

    pub fn handle(&self) -> DebounceHandle {
        self.handle.clone()
    }

    pub fn schedule(&self, path: PathBuf) {
        self.handle.schedule(path);
    }

    pub fn cancel(&self, path: PathBuf) {
        self.handle.cancel(path);
    }

    /// Cancel every pending timer and wait for running dispatches.
    ///
    /// Nothing is dispatched after this returns.
    pub fn shutdown(&mut self) {
        if let Some(actor) = self.actor.take() {
            let _ = self.handle.commands.send(Command::Shutdown);
            if actor.join().is_err() {
                error!("Debounce thread panicked");
            }
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_actor<F>(inbox: Receiver<Command>, delay: Duration, dispatch: Arc<F>)
where
    F: Fn(PathBuf) + Send + Sync + 'static,
{
    let mut pending: HashMap<PathBuf, Instant> = HashMap::new();
    let mut in_flight: Vec<JoinHandle<()>> = Vec::new();

    loop {
        let next_deadline = pending.values().min().copied();
        let command = match next_deadline {
            Some(deadline) => match inbox.recv_deadline(deadline) {
                Ok(command) => Some(command),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => Some(Command::Shutdown),
            },
            None => Some(inbox.recv().unwrap_or(Command::Shutdown)),
        };

        match command {
            Some(Command::Schedule(path)) => {
                if pending.insert(path.clone(), Instant::now() + delay).is_some() {
                    trace!(path = %path.display(), "Debounce timer restarted");
                }
            }
            Some(Command::Cancel(path)) => {
                pending.remove(&path);
            }
            Some(Command::Shutdown) => {
                if !pending.is_empty() {
                    debug!("Cancelling {} pending timers", pending.len());
                }
                pending.clear();
                break;
            }
            None => {}
        }

        let now = Instant::now();
        let due: Vec<PathBuf> = pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(path, _)| path.clone())
            .collect();

        for path in due {
            pending.remove(&path);
            in_flight.extend(spawn_dispatch(Arc::clone(&dispatch), path));
        }

        in_flight.retain(|handle| !handle.is_finished());
    }

    for handle in in_flight {
        if handle.join().is_err() {
            error!("Dispatch thread panicked");
        }
    }
}

fn spawn_dispatch<F>(dispatch: Arc<F>, path: PathBuf) -> Option<JoinHandle<()>>
where
    F: Fn(PathBuf) + Send + Sync + 'static,
{
    let worker = Arc::clone(&dispatch);
    let worker_path = path.clone();

    match thread::Builder::new()
        .name(format!("dispatch:{}", path.display()))
        .spawn(move || worker(worker_path))
    {
        Ok(handle) => Some(handle),
        Err(e) => {
            error!("Failed to spawn dispatch thread, running inline: {}", e);
            dispatch(path);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording(delay: Duration) -> (Debouncer, Arc<Mutex<Vec<PathBuf>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let debouncer = Debouncer::new(delay, move |path| {
            sink.lock().unwrap().push(path);
        })
        .unwrap();
        (debouncer, calls)
    }

    #[test]
    fn single_event_fires_once_after_delay() {
        let (debouncer, calls) = recording(Duration::from_millis(50));
        debouncer.schedule(PathBuf::from("/downloads/a.pdf"));

        thread::sleep(Duration::from_millis(300));
        assert_eq!(*calls.lock().unwrap(), vec![PathBuf::from("/downloads/a.pdf")]);
    }

    #[test]
    fn does_not_fire_before_delay() {
        let (debouncer, calls) = recording(Duration::from_millis(500));
        debouncer.schedule(PathBuf::from("/downloads/a.pdf"));

        thread::sleep(Duration::from_millis(100));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn burst_for_same_path_coalesces() {
        let (debouncer, calls) = recording(Duration::from_millis(150));
        let path = PathBuf::from("/downloads/big.zip");
        debouncer.schedule(path.clone());
        thread::sleep(Duration::from_millis(30));
        debouncer.schedule(path.clone());

        thread::sleep(Duration::from_millis(600));
        assert_eq!(*calls.lock().unwrap(), vec![path]);
    }

    #[test]
    fn different_paths_fire_independently() {
        let (debouncer, calls) = recording(Duration::from_millis(50));
        debouncer.schedule(PathBuf::from("/downloads/a.pdf"));
        debouncer.schedule(PathBuf::from("/downloads/b.jpg"));

        thread::sleep(Duration::from_millis(400));
        let mut fired = calls.lock().unwrap().clone();
        fired.sort();
        assert_eq!(
            fired,
            vec![
                PathBuf::from("/downloads/a.pdf"),
                PathBuf::from("/downloads/b.jpg")
            ]
        );
    }

    #[test]
    fn later_event_starts_fresh_cycle() {
        let (debouncer, calls) = recording(Duration::from_millis(50));
        let path = PathBuf::from("/downloads/a.pdf");
        debouncer.schedule(path.clone());
        thread::sleep(Duration::from_millis(300));
        debouncer.schedule(path.clone());
        thread::sleep(Duration::from_millis(300));

        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn cancel_prevents_dispatch() {
        let (debouncer, calls) = recording(Duration::from_millis(100));
        let path = PathBuf::from("/downloads/a.pdf");
        debouncer.schedule(path.clone());
        debouncer.cancel(path);

        thread::sleep(Duration::from_millis(400));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn shutdown_cancels_pending_timers() {
        let (mut debouncer, calls) = recording(Duration::from_millis(200));
        let handle = debouncer.handle();
        handle.schedule(PathBuf::from("/downloads/a.pdf"));

        debouncer.shutdown();
        handle.schedule(PathBuf::from("/downloads/b.pdf"));

        thread::sleep(Duration::from_millis(500));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn shutdown_waits_for_in_flight_dispatch() {
        let finished = Arc::new(Mutex::new(false));
        let flag = Arc::clone(&finished);
        let mut debouncer = Debouncer::new(Duration::from_millis(10), move |_| {
            thread::sleep(Duration::from_millis(300));
            *flag.lock().unwrap() = true;
        })
        .unwrap();

        debouncer.schedule(PathBuf::from("/downloads/slow.iso"));
        thread::sleep(Duration::from_millis(100));
        debouncer.shutdown();

        assert!(*finished.lock().unwrap());
    }
}
