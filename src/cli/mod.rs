//! # CLI Module
//!
//! Command-line interface for the file organizer.
//!
//! ## Usage
//! ```bash
//! # Watch the Downloads folder and organize new files as they arrive
//! file-organizer watch
//!
//! # Organize existing files once
//! file-organizer organize
//!
//! # Custom folder, log file and extra categories
//! file-organizer watch --path /path/to/folder --log-file organizer.log --categories extra.json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use file_organizer::core::organize::{BatchSummary, DateSource, Organizer};
use file_organizer::core::watcher::{FolderWatcher, WatcherConfig};
use file_organizer::core::CategoryTable;
use file_organizer::error::{ConfigError, Result, WatcherError};
use file_organizer::events::{Event, EventChannel, EventSender, OrganizeEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// File Organizer - sort downloads by type and date
#[derive(Parser, Debug)]
#[command(name = "file-organizer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Monitor a directory and organize new files automatically
    Watch {
        #[command(flatten)]
        common: CommonArgs,

        /// Quiet period before a new file is organized, in milliseconds
        #[arg(long, default_value = "1000")]
        debounce_ms: u64,
    },

    /// Organize all existing files in a directory once
    Organize {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Directory to organize (default: ~/Downloads)
    #[arg(long)]
    path: Option<PathBuf>,

    /// Also append logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// JSON file with extra categories: [{"name": "Code", "extensions": ["rs"]}]
    #[arg(long)]
    categories: Option<PathBuf>,

    /// Timestamp used for the Year/Month folders
    #[arg(long, default_value = "modified")]
    date_source: DateSourceArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateSourceArg {
    /// Last modification time
    Modified,
    /// Creation time (falls back to modification time)
    Created,
}

impl From<DateSourceArg> for DateSource {
    fn from(arg: DateSourceArg) -> Self {
        match arg {
            DateSourceArg::Modified => DateSource::Modified,
            DateSourceArg::Created => DateSource::Created,
        }
    }
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            common,
            debounce_ms,
        } => run_watch(common, Duration::from_millis(debounce_ms)),
        Commands::Organize { common } => run_organize(common),
    }
}

fn run_watch(common: CommonArgs, debounce: Duration) -> Result<()> {
    file_organizer::init_tracing(common.log_file.as_deref())?;
    let path = resolve_path(common.path.as_deref())?;

    print_banner("Watch Mode", &path);

    let organizer = Arc::new(build_organizer(&path, &common, None)?);
    let mut watcher = FolderWatcher::new(
        &path,
        organizer,
        WatcherConfig {
            debounce_duration: debounce,
        },
    )?;

    watcher.start()?;
    info!("Press Ctrl+C to stop watching...");
    wait_for_interrupt()?;
    info!("Received stop signal");
    watcher.stop();

    Ok(())
}

fn run_organize(common: CommonArgs) -> Result<()> {
    file_organizer::init_tracing(common.log_file.as_deref())?;
    let path = resolve_path(common.path.as_deref())?;

    print_banner("Organize Mode", &path);

    let (sender, receiver) = EventChannel::new();
    let organizer = build_organizer(&path, &common, Some(sender))?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );

    let progress = pb.clone();
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Organize(OrganizeEvent::BatchStarted { total, .. }) => {
                    progress.set_length(total as u64);
                }
                Event::Organize(OrganizeEvent::FileMoved(record)) => {
                    progress.inc(1);
                    progress.set_message(record.category);
                }
                Event::Organize(
                    OrganizeEvent::FileSkipped { .. } | OrganizeEvent::FileFailed { .. },
                ) => progress.inc(1),
                Event::Organize(OrganizeEvent::BatchCompleted(_)) => {
                    progress.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    // Ctrl+C ends the batch with success, as in watch mode
    let interrupt_bar = pb.clone();
    thread::spawn(move || match wait_for_interrupt() {
        Ok(()) => {
            interrupt_bar.finish_and_clear();
            info!("Received stop signal");
            process::exit(0);
        }
        Err(e) => warn!("Ctrl+C handling unavailable: {}", e),
    });

    let result = organizer.organize_batch();

    // Drop the organizer's sender so the event thread finishes
    drop(organizer);
    event_thread.join().ok();
    pb.finish_and_clear();

    let summary = result?;
    print_summary(&summary);
    Ok(())
}

fn build_organizer(
    path: &Path,
    common: &CommonArgs,
    events: Option<EventSender>,
) -> Result<Organizer> {
    let mut categories = CategoryTable::builder().with_defaults();
    if let Some(file) = &common.categories {
        categories = categories.overrides_from_file(file)?;
    }

    let mut builder = Organizer::builder(path)
        .categories(categories.build()?)
        .date_source(common.date_source.into());
    if let Some(events) = events {
        builder = builder.events(events);
    }
    Ok(builder.build()?)
}

/// The explicit path, or the platform Downloads folder
fn resolve_path(path: Option<&Path>) -> std::result::Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }

    let downloads = dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("Downloads"));

    if !downloads.is_dir() {
        return Err(ConfigError::DownloadsNotFound { path: downloads });
    }
    Ok(downloads)
}

/// Block until Ctrl+C
fn wait_for_interrupt() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| WatcherError::Interrupt(e.to_string()))?;

    runtime
        .block_on(tokio::signal::ctrl_c())
        .map_err(|e| WatcherError::Interrupt(e.to_string()).into())
}

fn print_banner(mode: &str, path: &Path) {
    let rule = "=".repeat(60);
    info!("{}", rule);
    info!("File Organizer - {}", mode);
    info!("{}", rule);
    info!("Directory: {}", path.display());
}

fn print_summary(summary: &BatchSummary) {
    let term = Term::stderr();

    term.write_line("").ok();
    term.write_line(&format!(
        "{} Organization Complete",
        style("✓").green().bold()
    ))
    .ok();
    term.write_line(&format!(
        "  {} files moved in {:.1}s",
        style(summary.moved).cyan(),
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();

    if summary.skipped > 0 {
        term.write_line(&format!("  {} skipped", style(summary.skipped).dim()))
            .ok();
    }
    if summary.failed > 0 {
        term.write_line(&format!(
            "  {} failed (see log for details)",
            style(summary.failed).red()
        ))
        .ok();
    }

    let renamed = summary.records.iter().filter(|r| r.renamed).count();
    if renamed > 0 {
        term.write_line(&format!(
            "  {} renamed to avoid overwriting",
            style(renamed).yellow()
        ))
        .ok();
    }
}
