//! Environment variable names used by this crate for convenient
//! configuration of handlers from services.
//!
//! These are purely helpers; the handler types themselves never read the
//! environment.

use crate::handler::HandlerOptions;
use crate::level::Level;

/// Minimum level, e.g. `debug`, `info`, `warn`, `error`.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Output format, `text` or `json`.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl HandlerOptions {
    /// Options with the level taken from `LOG_LEVEL`. Unset or unparsable
    /// values fall back to `INFO`.
    pub fn from_env() -> Self {
        let level = env_or(LOG_LEVEL_ENV, "info").parse::<Level>().unwrap_or_else(|e| {
            eprintln!("{}; using INFO", e);
            Level::Info
        });
        HandlerOptions::new(level)
    }
}
