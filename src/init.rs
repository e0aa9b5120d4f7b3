use crate::handler::HandlerOptions;
use crate::layer::HandlerLayer;
use crate::logger::Logger;
use crate::sink::WriterSink;
use crate::text::TextHandler;
use std::sync::{Arc, OnceLock, RwLock};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// How the `tracing` bridge is installed.
///
/// **Fields**
/// - `set_default_logger`: also make the logger the process default
///   returned by [`default_logger`].
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub set_default_logger: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self { set_default_logger: true }
    }
}

fn default_slot() -> &'static RwLock<Logger> {
    static DEFAULT: OnceLock<RwLock<Logger>> = OnceLock::new();
    DEFAULT.get_or_init(|| {
        let handler = TextHandler::new(Arc::new(WriterSink::stderr()), HandlerOptions::default());
        RwLock::new(Logger::new(handler))
    })
}

/// The process-wide default logger.
///
/// Until [`set_default_logger`] is called this is a text handler on stderr
/// at `INFO`.
pub fn default_logger() -> Logger {
    default_slot()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Replace the process-wide default logger.
pub fn set_default_logger(logger: Logger) {
    *default_slot()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner()) = logger;
}

/// Route all `tracing` events in the process into `logger`.
///
/// **Parameters**
/// - `logger`: the chain that will receive every event.
/// - `config`: [`LayerConfig`] controlling what else is installed.
///
/// **Effects**
///
/// Installs a [`Registry`] combined with [`HandlerLayer`] as the global
/// default subscriber.
///
/// **Returns**
/// - `Err(..)` if a global subscriber was already set.
pub fn init_tracing_with_config(
    logger: Logger,
    config: LayerConfig,
) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    if config.set_default_logger {
        set_default_logger(logger.clone());
    }
    let subscriber = Registry::default().with(HandlerLayer::new(logger));
    tracing::subscriber::set_global_default(subscriber)
}

/// Equivalent to [`init_tracing_with_config`] with [`LayerConfig::default`].
pub fn init_tracing(logger: Logger) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    init_tracing_with_config(logger, LayerConfig::default())
}
