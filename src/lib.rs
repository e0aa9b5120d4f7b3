//! Composable structured logging.
//!
//! A [`Logger`] turns calls into [`LogRecord`]s and hands them to a chain of
//! [`Handler`]s. Decorators such as [`MetadataHandler`] and [`RedactHandler`]
//! wrap exactly one delegate and can be stacked in any order; the innermost
//! [`TextHandler`] or [`JsonHandler`] encodes the record and writes it to a
//! [`LogSink`].
//!
//! ```
//! use std::sync::Arc;
//! use structured_log_chain::{
//!     with_metadata, Attr, Context, HandlerOptions, Logger, MemorySink, Metadata,
//!     MetadataHandler, TextHandler,
//! };
//!
//! let sink = MemorySink::new();
//! let opts = HandlerOptions::default().replace_attr(|groups, attr| {
//!     (!(groups.is_empty() && attr.key == "time")).then_some(attr)
//! });
//! let text = TextHandler::new(Arc::new(sink.clone()), opts);
//! let logger = Logger::new(MetadataHandler::new(Arc::new(text)));
//!
//! let ctx = with_metadata(&Context::background(), Metadata::new().insert("request_id", "123"));
//! logger.info_context(&ctx, "request started", [Attr::int("attempt", 1)]).unwrap();
//!
//! assert_eq!(sink.contents(), "level=INFO msg=\"request started\" attempt=1 request_id=123\n");
//! ```

pub mod context;
pub mod handler;
pub mod level;
pub mod record;
pub mod value;

pub mod encoder;
pub mod text;
#[cfg(feature = "json")]
pub mod json;

pub mod level_handler;
pub mod metadata;
pub mod redact;

pub mod logger;

pub mod backend;
pub mod env;
pub mod init;
pub mod layer;
pub mod noop_sink;
pub mod sink;

pub use context::Context;
pub use handler::{Handler, HandlerError, HandlerOptions, ReplaceAttr};
pub use level::Level;
pub use record::LogRecord;
pub use value::{Attr, LogValue, Value};

pub use text::TextHandler;
#[cfg(feature = "json")]
pub use json::JsonHandler;

pub use level_handler::LevelHandler;
pub use metadata::{metadata, with_metadata, Metadata, MetadataHandler};
pub use redact::RedactHandler;

pub use logger::Logger;

pub use init::{default_logger, init_tracing, set_default_logger};
pub use layer::HandlerLayer;
pub use noop_sink::NoopSink;
pub use sink::{LogSink, MemorySink, WriterSink};
