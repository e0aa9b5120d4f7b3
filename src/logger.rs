use crate::context::Context;
use crate::handler::{Handler, HandlerError};
use crate::level::Level;
use crate::record::LogRecord;
use crate::value::Attr;
use std::sync::Arc;

/// Front end of a handler chain.
///
/// A `Logger` is cheap to clone. [`with`](Logger::with) and
/// [`with_group`](Logger::with_group) derive new loggers over a rebuilt
/// chain; the original keeps logging exactly as before.
///
/// Every emission returns the chain's result so callers can decide what a
/// failed write means to them.
#[derive(Clone)]
pub struct Logger {
    handler: Arc<dyn Handler>,
}

impl Logger {
    pub fn new(handler: impl Handler + 'static) -> Self {
        Logger { handler: Arc::new(handler) }
    }

    pub fn from_arc(handler: Arc<dyn Handler>) -> Self {
        Logger { handler }
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// A logger that adds `attrs` to every record it emits.
    pub fn with(&self, attrs: impl IntoIterator<Item = Attr>) -> Logger {
        let attrs: Vec<Attr> = attrs.into_iter().collect();
        if attrs.is_empty() {
            return self.clone();
        }
        Logger { handler: self.handler.with_attrs(attrs) }
    }

    /// A logger nesting all later attributes under `name`.
    pub fn with_group(&self, name: &str) -> Logger {
        if name.is_empty() {
            return self.clone();
        }
        Logger { handler: self.handler.with_group(name) }
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.handler.enabled(level)
    }

    /// Emit with a background context.
    pub fn log(
        &self,
        level: Level,
        msg: &str,
        attrs: impl IntoIterator<Item = Attr>,
    ) -> Result<(), HandlerError> {
        self.log_context(&Context::background(), level, msg, attrs)
    }

    /// Emit with `ctx` visible to every handler in the chain.
    pub fn log_context(
        &self,
        ctx: &Context,
        level: Level,
        msg: &str,
        attrs: impl IntoIterator<Item = Attr>,
    ) -> Result<(), HandlerError> {
        if !self.handler.enabled(level) {
            return Ok(());
        }
        self.log_attrs(ctx, level, msg, attrs)
    }

    /// Emit without consulting `enabled`; callers that already checked use
    /// this to avoid asking twice.
    pub fn log_attrs(
        &self,
        ctx: &Context,
        level: Level,
        msg: &str,
        attrs: impl IntoIterator<Item = Attr>,
    ) -> Result<(), HandlerError> {
        let mut record = LogRecord::new(level, msg);
        record.add_attrs(attrs);
        self.handler.handle(ctx, &record)
    }

    /// Emit, building the attributes only if `level` is enabled.
    pub fn log_lazy<F, I>(&self, ctx: &Context, level: Level, msg: &str, attrs: F) -> Result<(), HandlerError>
    where
        F: FnOnce() -> I,
        I: IntoIterator<Item = Attr>,
    {
        if !self.handler.enabled(level) {
            return Ok(());
        }
        self.log_attrs(ctx, level, msg, attrs())
    }

    pub fn debug(&self, msg: &str, attrs: impl IntoIterator<Item = Attr>) -> Result<(), HandlerError> {
        self.log(Level::Debug, msg, attrs)
    }

    pub fn info(&self, msg: &str, attrs: impl IntoIterator<Item = Attr>) -> Result<(), HandlerError> {
        self.log(Level::Info, msg, attrs)
    }

    pub fn warn(&self, msg: &str, attrs: impl IntoIterator<Item = Attr>) -> Result<(), HandlerError> {
        self.log(Level::Warn, msg, attrs)
    }

    pub fn error(&self, msg: &str, attrs: impl IntoIterator<Item = Attr>) -> Result<(), HandlerError> {
        self.log(Level::Error, msg, attrs)
    }

    pub fn debug_context(
        &self,
        ctx: &Context,
        msg: &str,
        attrs: impl IntoIterator<Item = Attr>,
    ) -> Result<(), HandlerError> {
        self.log_context(ctx, Level::Debug, msg, attrs)
    }

    pub fn info_context(
        &self,
        ctx: &Context,
        msg: &str,
        attrs: impl IntoIterator<Item = Attr>,
    ) -> Result<(), HandlerError> {
        self.log_context(ctx, Level::Info, msg, attrs)
    }

    pub fn warn_context(
        &self,
        ctx: &Context,
        msg: &str,
        attrs: impl IntoIterator<Item = Attr>,
    ) -> Result<(), HandlerError> {
        self.log_context(ctx, Level::Warn, msg, attrs)
    }

    pub fn error_context(
        &self,
        ctx: &Context,
        msg: &str,
        attrs: impl IntoIterator<Item = Attr>,
    ) -> Result<(), HandlerError> {
        self.log_context(ctx, Level::Error, msg, attrs)
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

/// Emit a record, evaluating the `key => value` pairs only when the level
/// is enabled.
///
/// ```
/// use structured_log_chain::{log, Level, Logger, TextHandler, HandlerOptions, MemorySink};
/// use std::sync::Arc;
///
/// let logger = Logger::new(TextHandler::new(Arc::new(MemorySink::new()), HandlerOptions::default()));
/// log!(logger, Level::Info, "hello", "world" => 42).unwrap();
/// ```
///
/// A context is passed with `ctx = <expr>;` before the level.
#[macro_export]
macro_rules! log {
    ($logger:expr, ctx = $ctx:expr; $level:expr, $msg:expr $(, $key:expr => $value:expr)* $(,)?) => {{
        let logger: &$crate::Logger = &$logger;
        let level: $crate::Level = $level;
        if logger.enabled(level) {
            logger.log_attrs(
                $ctx,
                level,
                $msg,
                ::std::vec![$($crate::Attr::new($key, $value)),*],
            )
        } else {
            ::std::result::Result::Ok::<(), $crate::HandlerError>(())
        }
    }};
    ($logger:expr, $level:expr, $msg:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::log!($logger, ctx = &$crate::Context::background(); $level, $msg $(, $key => $value)*)
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, ctx = $ctx:expr; $($rest:tt)+) => { $crate::log!($logger, ctx = $ctx; $crate::Level::Debug, $($rest)+) };
    ($logger:expr, $($rest:tt)+) => { $crate::log!($logger, $crate::Level::Debug, $($rest)+) };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, ctx = $ctx:expr; $($rest:tt)+) => { $crate::log!($logger, ctx = $ctx; $crate::Level::Info, $($rest)+) };
    ($logger:expr, $($rest:tt)+) => { $crate::log!($logger, $crate::Level::Info, $($rest)+) };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, ctx = $ctx:expr; $($rest:tt)+) => { $crate::log!($logger, ctx = $ctx; $crate::Level::Warn, $($rest)+) };
    ($logger:expr, $($rest:tt)+) => { $crate::log!($logger, $crate::Level::Warn, $($rest)+) };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, ctx = $ctx:expr; $($rest:tt)+) => { $crate::log!($logger, ctx = $ctx; $crate::Level::Error, $($rest)+) };
    ($logger:expr, $($rest:tt)+) => { $crate::log!($logger, $crate::Level::Error, $($rest)+) };
}
