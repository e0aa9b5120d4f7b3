use crate::level::Level;
use crate::value::Attr;
use chrono::{DateTime, Utc};

/// One log event as it travels through a handler chain.
///
/// Attribute order is preserved exactly as added. Group prefixes bound with
/// [`Handler::with_group`](crate::handler::Handler::with_group) are not stored
/// here; encoders apply them when the record is serialized.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub time: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    attrs: Vec<Attr>,
}

impl LogRecord {
    /// Create a record stamped with the current time.
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self::with_time(Utc::now(), level, message)
    }

    pub fn with_time(time: DateTime<Utc>, level: Level, message: impl Into<String>) -> Self {
        LogRecord { time, level, message: message.into(), attrs: Vec::new() }
    }

    pub fn add(&mut self, attr: Attr) {
        self.attrs.push(attr);
    }

    pub fn add_attrs(&mut self, attrs: impl IntoIterator<Item = Attr>) {
        self.attrs.extend(attrs);
    }

    pub fn attrs(&self) -> &[Attr] {
        &self.attrs
    }

    pub fn num_attrs(&self) -> usize {
        self.attrs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_is_independent() {
        let mut original = LogRecord::new(Level::Info, "hello");
        original.add(Attr::int("a", 1));

        let mut copy = original.clone();
        copy.add(Attr::int("b", 2));

        assert_eq!(original.num_attrs(), 1);
        assert_eq!(copy.num_attrs(), 2);
        assert_eq!(copy.attrs()[0].key, "a");
        assert_eq!(copy.attrs()[1].key, "b");
    }
}
