//! # file-organizer CLI
//!
//! Command-line interface for the file organizer.
//!
//! ## Usage
//! ```bash
//! file-organizer watch
//! file-organizer organize --path ~/Desktop --log-file organizer.log
//! ```

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
