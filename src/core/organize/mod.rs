//! File organization module.
//!
//! Moves files into `Category/YYYY/Mon` folders, one at a time, retrying
//! files that are locked by another process.

mod executor;
mod mover;
mod types;

pub use executor::{Organizer, OrganizerBuilder};
pub use mover::{FileMover, RenameMover};
pub use types::*;
