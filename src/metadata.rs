//! Request-scoped metadata carried by a [`Context`] and injected into
//! records by [`MetadataHandler`].

use crate::context::Context;
use crate::handler::{Handler, HandlerError};
use crate::level::Level;
use crate::record::LogRecord;
use crate::value::{Attr, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Ordered set of key/value pairs attached to a context.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    entries: BTreeMap<String, Value>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn attrs(&self) -> impl Iterator<Item = Attr> + '_ {
        self.entries.iter().map(|(k, v)| Attr::new(k.as_str(), v.clone()))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Metadata {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Storage key; private so no other code can read or overwrite the entry.
struct MetadataKey(Metadata);

/// Return a child of `ctx` carrying `metadata`.
pub fn with_metadata(ctx: &Context, metadata: Metadata) -> Context {
    ctx.with_value(MetadataKey(metadata))
}

/// The metadata attached to `ctx`, if any.
pub fn metadata(ctx: &Context) -> Option<&Metadata> {
    ctx.value::<MetadataKey>().map(|key| &key.0)
}

/// Decorator appending the context's [`Metadata`] to every record.
///
/// Records emitted without metadata in their context pass through
/// untouched. Otherwise the record is cloned, the metadata appended in key
/// order after the record's own attributes, and the copy handed on.
#[derive(Clone)]
pub struct MetadataHandler {
    inner: Arc<dyn Handler>,
}

impl MetadataHandler {
    pub fn new(inner: Arc<dyn Handler>) -> Self {
        MetadataHandler { inner }
    }
}

impl Handler for MetadataHandler {
    fn enabled(&self, level: Level) -> bool {
        self.inner.enabled(level)
    }

    fn handle(&self, ctx: &Context, record: &LogRecord) -> Result<(), HandlerError> {
        match metadata(ctx) {
            Some(metadata) if !metadata.is_empty() => {
                let mut record = record.clone();
                record.add_attrs(metadata.attrs());
                self.inner.handle(ctx, &record)
            }
            _ => self.inner.handle(ctx, record),
        }
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        Arc::new(MetadataHandler::new(self.inner.with_attrs(attrs)))
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        Arc::new(MetadataHandler::new(self.inner.with_group(name)))
    }
}
