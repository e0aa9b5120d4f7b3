use crate::context::Context;
use crate::handler::{Handler, HandlerError};
use crate::level::Level;
use crate::record::LogRecord;
use crate::value::Attr;
use std::sync::Arc;

/// Decorator raising the minimum level of the chain it wraps.
///
/// A record passes only if it clears both this handler's level and the
/// delegate's own. Lowering the level below the delegate's has no effect.
#[derive(Clone)]
pub struct LevelHandler {
    level: Level,
    inner: Arc<dyn Handler>,
}

impl LevelHandler {
    pub fn new(level: Level, inner: Arc<dyn Handler>) -> Self {
        LevelHandler { level, inner }
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl Handler for LevelHandler {
    fn enabled(&self, level: Level) -> bool {
        level >= self.level && self.inner.enabled(level)
    }

    fn handle(&self, ctx: &Context, record: &LogRecord) -> Result<(), HandlerError> {
        if record.level < self.level {
            return Ok(());
        }
        self.inner.handle(ctx, record)
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        Arc::new(LevelHandler::new(self.level, self.inner.with_attrs(attrs)))
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        Arc::new(LevelHandler::new(self.level, self.inner.with_group(name)))
    }
}
