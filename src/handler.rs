use crate::context::Context;
use crate::level::Level;
use crate::record::LogRecord;
use crate::value::Attr;
use std::fmt;
use std::sync::Arc;

/// A stage of the record pipeline.
///
/// A handler either terminates the chain by encoding records to a sink, or
/// decorates exactly one delegate and forwards to it. Handlers are immutable:
/// [`with_attrs`](Handler::with_attrs) and [`with_group`](Handler::with_group)
/// build a new chain and leave the receiver usable as before.
///
/// `handle` may be called concurrently from any number of threads. It must
/// not keep the record after returning.
pub trait Handler: Send + Sync {
    /// Whether records at `level` would be handled at all. Callers check
    /// this before building a record.
    fn enabled(&self, level: Level) -> bool;

    /// Consume one record.
    ///
    /// **Parameters**
    /// - `ctx`: execution context of the emitting call; decorators read
    ///   ambient metadata from it.
    /// - `record`: the event. Decorators that need to add attributes clone
    ///   it first.
    ///
    /// **Returns**
    /// - `Ok(())` once the record has been written.
    /// - `Err(..)` if the sink failed. Decorators return their delegate's
    ///   error unchanged.
    fn handle(&self, ctx: &Context, record: &LogRecord) -> Result<(), HandlerError>;

    /// A handler that also emits `attrs` on every record, ahead of the
    /// record's own attributes.
    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler>;

    /// A handler that nests all later attributes under `name`. An empty
    /// name yields an equivalent handler.
    fn with_group(&self, name: &str) -> Arc<dyn Handler>;
}

/// Failure reported by [`Handler::handle`].
#[derive(thiserror::Error, Debug)]
pub enum HandlerError {
    #[error("failed to write log record: {0}")]
    Write(#[from] std::io::Error),

    #[error("failed to encode log record: {0}")]
    Encoding(String),
}

/// Hook applied to every attribute before it is formatted.
///
/// Receives the group path enclosing the attribute and the attribute itself
/// (already resolved). Returning `None` drops the attribute.
pub type ReplaceAttr = Arc<dyn Fn(&[String], Attr) -> Option<Attr> + Send + Sync>;

/// Options shared by the encoding handlers.
#[derive(Clone, Default)]
pub struct HandlerOptions {
    /// Records below this level are discarded.
    pub level: Level,
    pub replace_attr: Option<ReplaceAttr>,
}

impl HandlerOptions {
    pub fn new(level: Level) -> Self {
        HandlerOptions { level, replace_attr: None }
    }

    pub fn replace_attr(
        mut self,
        f: impl Fn(&[String], Attr) -> Option<Attr> + Send + Sync + 'static,
    ) -> Self {
        self.replace_attr = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for HandlerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerOptions")
            .field("level", &self.level)
            .field("replace_attr", &self.replace_attr.is_some())
            .finish()
    }
}
