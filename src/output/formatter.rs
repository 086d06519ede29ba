//! User-facing message formatting.
//!
//! Diagnostics go through `tracing`; this is for the lines a person running
//! the binary is meant to read.
//!
//! # Examples
//!
//! ```
//! use pdfstage::output::{MessageLevel, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(false, false);
//! formatter.info("Staging files...");
//! formatter.success("Merged 2 files");
//! assert_eq!(MessageLevel::Success.prefix(), "✓ ");
//! ```

use std::io::{self, IsTerminal};

use crate::config::Config;
use crate::ops::StagedEntry;
use crate::utils::format_bytes;

/// Level of output message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Informational message.
    Info,
    /// Success message.
    Success,
    /// Warning message.
    Warning,
    /// Debug/verbose message.
    Debug,
}

impl MessageLevel {
    /// Glyph printed before the message.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Success => "✓ ",
            Self::Warning => "⚠ ",
            Self::Debug => "→ ",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Success => "\x1b[32m",
            Self::Warning => "\x1b[33m",
            Self::Debug => "\x1b[36m",
        }
    }
}

/// Output formatter with configurable verbosity.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    quiet: bool,
    verbose: bool,
    colored: bool,
}

impl OutputFormatter {
    /// Create a new output formatter.
    ///
    /// `quiet` suppresses everything but warnings; `verbose`
    /// enables debug lines and details.
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self {
            quiet,
            verbose,
            colored: Self::should_use_color(),
        }
    }

    /// Create a formatter from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.quiet, config.verbose)
    }

    /// Colors only when stdout is a TTY and TERM is set.
    fn should_use_color() -> bool {
        io::stdout().is_terminal() && std::env::var("TERM").is_ok()
    }

    /// Print an informational message. Suppressed in quiet mode.
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Info, message);
        }
    }

    /// Print a success message. Suppressed in quiet mode.
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Success, message);
        }
    }

    /// Print a warning message, even in quiet mode.
    pub fn warning(&self, message: &str) {
        self.print_message(MessageLevel::Warning, message);
    }

    /// Print a debug message. Only displayed in verbose mode.
    pub fn debug(&self, message: &str) {
        if self.verbose {
            self.print_message(MessageLevel::Debug, message);
        }
    }

    /// Render a message the way it would be printed.
    pub fn render(&self, level: MessageLevel, message: &str) -> String {
        let prefix = level.prefix();
        let color = level.color();

        if self.colored && !color.is_empty() {
            format!("{color}{prefix}{message}\x1b[0m")
        } else {
            format!("{prefix}{message}")
        }
    }

    fn print_message(&self, level: MessageLevel, message: &str) {
        let line = self.render(level, message);
        match level {
            MessageLevel::Warning => eprintln!("{line}"),
            _ => println!("{line}"),
        }
    }

    /// Print a section header. Suppressed in quiet mode.
    pub fn section(&self, title: &str) {
        if !self.quiet {
            println!("\n{title}");
        }
    }

    /// Print a labelled detail line. Only shown in verbose mode.
    pub fn detail(&self, label: &str, value: &str) {
        if self.verbose {
            println!("  {label}: {value}");
        }
    }

    /// Print one row of the staging list. Suppressed in quiet mode.
    pub fn staged_file(&self, entry: &StagedEntry) {
        if !self.quiet {
            println!("{}", staged_file_line(entry));
        }
    }

    /// Whether verbose output is shown.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

fn staged_file_line(entry: &StagedEntry) -> String {
    format!(
        "  {}. {} ({})",
        entry.position,
        entry.name,
        format_bytes(entry.size_bytes)
    )
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(false, false)
    }
}
