//! Diagnostic logging through `tracing`.
//!
//! Library code only emits events; the binary decides whether and where they
//! go by calling [`init_logging`]. Events are written to stderr so they never
//! mix with the report on stdout. `RUST_LOG` overrides the level derived from
//! the verbosity flags.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// How much diagnostic output to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Level applied to this crate when `RUST_LOG` is unset.
    pub level: Level,
    /// Whether to use ANSI colors.
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            with_ansi: false,
        }
    }
}

impl LogConfig {
    /// Derive a config from the `-v` count and `-q` flag.
    ///
    /// - `-q`: errors only
    /// - default: warnings
    /// - `-v`: info
    /// - `-vv`: debug
    /// - `-vvv` and up: trace
    pub fn from_flags(verbosity: u8, quiet: bool) -> Self {
        let level = if quiet {
            Level::ERROR
        } else {
            match verbosity {
                0 => Level::WARN,
                1 => Level::INFO,
                2 => Level::DEBUG,
                _ => Level::TRACE,
            }
        };
        Self {
            level,
            ..Default::default()
        }
    }

    /// Level for a validated run configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::from_flags(config.verbosity, config.quiet)
    }

    /// Filter directive used when `RUST_LOG` is not set.
    pub fn directive(&self) -> String {
        let level = self.level.as_str().to_lowercase();
        // Dependencies stay at warn regardless of our own level.
        format!("warn,pdfstage={level}")
    }
}

fn build_env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.directive()))
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails if a global subscriber was already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(build_env_filter(config))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(config.with_ansi)
                .with_target(false)
                .compact(),
        )
        .try_init()
}
