//! Diagnostic logging for the generator.
//!
//! Everything goes to stderr; stdout carries only the generated source.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `KITBOILER_LOG` | `EnvFilter` directives | `RUST_LOG`, else `warn` |
//! | `KITBOILER_LOG_FORMAT` | `compact`, `pretty` or `json` | `compact` |
//! | `KITBOILER_LOG_INCLUDE_LOCATION` | add `file:line` to events | `false` |

use anyhow::{Context, Result};
use std::env;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const LOG_ENV: &str = "KITBOILER_LOG";
pub const LOG_FORMAT_ENV: &str = "KITBOILER_LOG_FORMAT";
pub const LOG_INCLUDE_LOCATION_ENV: &str = "KITBOILER_LOG_INCLUDE_LOCATION";

const DEFAULT_FILTER: &str = "warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directives, e.g. `kitboiler=debug`
    pub filter: String,
    pub format: LogFormat,
    /// Include file:line location
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::Compact,
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`LogConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            filter: non_empty(LOG_ENV)
                .or_else(|| non_empty("RUST_LOG"))
                .unwrap_or_else(|| DEFAULT_FILTER.to_string()),
            format: non_empty(LOG_FORMAT_ENV)
                .map(|v| LogFormat::parse(&v))
                .unwrap_or(LogFormat::Compact),
            include_location: non_empty(LOG_INCLUDE_LOCATION_ENV)
                .is_some_and(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")),
        }
    }

    /// The filter, or the default one when the directives do not parse.
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.filter).unwrap_or_else(|err| {
            eprintln!("Warning: Invalid log filter {:?}: {err}", self.filter);
            EnvFilter::new(DEFAULT_FILTER)
        })
    }
}

/// Initialize logging from the environment.
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LogConfig::from_env())
}

/// Install a global subscriber writing to stderr.
///
/// Fails if a global subscriber is already set.
pub fn init_logging_with_config(config: &LogConfig) -> Result<()> {
    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(config.env_filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")
}
