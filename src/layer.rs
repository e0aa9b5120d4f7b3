use crate::context::Context;
use crate::level::Level;
use crate::logger::Logger;
use crate::record::LogRecord;
use crate::value::{Attr, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{self, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that feeds `tracing` events into a [`Logger`].
///
/// Each event becomes a [`LogRecord`]: its `message` field is the record
/// message and every other field an attribute, in recording order. The
/// record is handled with [`Context::current`], so metadata attached to
/// the running task reaches decorators such as
/// [`MetadataHandler`](crate::metadata::MetadataHandler).
pub struct HandlerLayer {
    logger: Logger,
    /// Events handed to the chain.
    pub handled_events: Arc<AtomicU64>,
    /// Events whose chain returned an error.
    pub failed_events: Arc<AtomicU64>,
}

impl HandlerLayer {
    pub fn new(logger: Logger) -> Self {
        HandlerLayer {
            logger,
            handled_events: Arc::new(AtomicU64::new(0)),
            failed_events: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl<S> Layer<S> for HandlerLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: layer::Context<'_, S>) {
        let level = Level::from(event.metadata().level());
        if !self.logger.enabled(level) {
            return;
        }

        let mut attrs = Vec::new();
        let mut message: Option<String> = None;
        let mut visitor = FieldVisitor { attrs: &mut attrs, message: &mut message };
        event.record(&mut visitor);

        let mut record = LogRecord::new(level, message.unwrap_or_default());
        record.add_attrs(attrs);

        self.handled_events.fetch_add(1, Ordering::Relaxed);
        if let Err(e) = self.logger.handler().handle(&Context::current(), &record) {
            self.failed_events.fetch_add(1, Ordering::Relaxed);
            eprintln!("error handling tracing event: {}", e);
        }
    }
}

pub struct FieldVisitor<'a> {
    pub attrs: &'a mut Vec<Attr>,
    pub message: &'a mut Option<String>,
}

impl FieldVisitor<'_> {
    fn push(&mut self, field: &Field, value: Value) {
        self.attrs.push(Attr::new(field.name(), value));
    }
}

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.push(field, Value::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, Value::Int64(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, Value::Uint64(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, Value::Float64(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, Value::Bool(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.push(field, Value::String(format!("{:?}", value)));
        }
    }
}
