//! Output formatting and progress indicators
//!
//! This module provides utilities for displaying progress bars,
//! status messages and errors to the user.

use indicatif::{ProgressBar, ProgressStyle};
use tracing::Level;

/// Output preferences derived from the global flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Only errors are printed
    pub quiet: bool,

    /// Machine-readable output
    pub json: bool,

    /// Verbosity level (number of `-v` flags)
    pub verbose: u8,
}

impl OutputConfig {
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Default log level for the tracing subscriber
    ///
    /// `RUST_LOG` directives still take precedence.
    pub fn log_level(&self) -> Level {
        if self.quiet {
            return Level::ERROR;
        }
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    /// Whether a progress bar should be drawn
    ///
    /// Verbose runs log every action instead.
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json && self.verbose == 0
    }

    /// Whether human-readable status lines should be printed
    pub fn show_status(&self) -> bool {
        !self.quiet && !self.json
    }
}

/// Create a progress bar for a profile's actions
pub fn create_action_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} actions ({msg})")
            .expect("Invalid progress bar template")
            .progress_chars("█▓▒░"),
    );
    pb
}

/// Print an error and its cause chain to stderr
///
/// Causes already spelled out by the previous message are skipped.
pub fn display_error(error: &anyhow::Error) {
    let mut previous = error.to_string();
    eprintln!("{} Error: {previous}", status::ERROR);
    for cause in error.chain().skip(1) {
        let message = cause.to_string();
        if !previous.contains(&message) {
            eprintln!("  Caused by: {message}");
        }
        previous = message;
    }
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";
}
