//! # Events Module
//!
//! Progress and activity events for whatever drives the organizer.
//!
//! The organizer and watcher send events through a channel; the CLI
//! subscribes to drive its progress bar. Tracing logs are independent of
//! this and always emitted.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Organize(OrganizeEvent::FileMoved(record)) = event {
//!             println!("{} -> {}", record.source.display(), record.destination.display());
//!         }
//!     }
//! });
//!
//! let organizer = Organizer::builder(downloads).events(sender).build()?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
