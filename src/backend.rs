use std::str::FromStr;
use std::sync::Arc;

use crate::env::{env_or, LOG_FORMAT_ENV};
use crate::handler::{Handler, HandlerOptions};
use crate::sink::LogSink;
use crate::text::TextHandler;

/// Supported encoder kinds that can be selected by name or config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Text,
    Json,
}

/// Encoder selection plus the options handed to it.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Selected encoder implementation.
    pub kind: BackendKind,
    pub options: HandlerOptions,
}

impl BackendConfig {
    pub fn new(kind: BackendKind, options: HandlerOptions) -> Self {
        BackendConfig { kind, options }
    }

    /// Configuration from `LOG_FORMAT` and `LOG_LEVEL`; text unless the
    /// format says otherwise.
    pub fn from_env() -> Result<Self, FormatError> {
        let kind = parse_format(&env_or(LOG_FORMAT_ENV, "text"))?;
        Ok(BackendConfig::new(kind, HandlerOptions::from_env()))
    }
}

/// Parse an encoder name such as `"text"`, `"logfmt"` or `"json"`.
pub fn parse_format(name: &str) -> Result<BackendKind, FormatError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "text" | "logfmt" => Ok(BackendKind::Text),
        "json" => Ok(BackendKind::Json),
        _ => Err(FormatError::Unknown(name.to_string())),
    }
}

impl FromStr for BackendKind {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_format(s)
    }
}

/// Error type returned when parsing a format name.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("unknown log format: {0:?}")]
    Unknown(String),
}

/// Error type returned when building a handler from configuration.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum BackendBuildError {
    #[error("json feature is not enabled")]
    JsonFeatureDisabled,
}

/// Create the terminal handler described by `cfg`, writing into `sink`.
///
/// This is the main entry point for applications that pick an encoder from
/// configuration instead of constructing one directly.
pub fn make_handler_from_config(
    cfg: &BackendConfig,
    sink: Arc<dyn LogSink>,
) -> Result<Arc<dyn Handler>, BackendBuildError> {
    match cfg.kind {
        BackendKind::Text => Ok(Arc::new(TextHandler::new(sink, cfg.options.clone()))),
        BackendKind::Json => {
            #[cfg(feature = "json")]
            {
                use crate::json::JsonHandler;
                Ok(Arc::new(JsonHandler::new(sink, cfg.options.clone())) as Arc<dyn Handler>)
            }

            #[cfg(not(feature = "json"))]
            {
                let _ = sink;
                Err(BackendBuildError::JsonFeatureDisabled)
            }
        }
    }
}
