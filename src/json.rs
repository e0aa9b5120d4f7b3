use crate::context::Context;
use crate::encoder::EncoderState;
use crate::handler::{Handler, HandlerError, HandlerOptions};
use crate::level::Level;
use crate::record::LogRecord;
use crate::sink::LogSink;
use crate::value::{Attr, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

/// Terminal handler writing one JSON object per line:
///
/// ```text
/// {"time":"2024-05-01T10:00:00Z","level":"INFO","msg":"demo","user":{"name":"bob"}}
/// ```
///
/// Groups become nested objects, durations are integer nanoseconds and
/// `Any` values are written as their `Debug` string.
#[derive(Clone)]
pub struct JsonHandler {
    state: EncoderState,
}

impl JsonHandler {
    pub fn new(sink: Arc<dyn LogSink>, opts: HandlerOptions) -> Self {
        JsonHandler { state: EncoderState::new(sink, opts) }
    }
}

impl Handler for JsonHandler {
    fn enabled(&self, level: Level) -> bool {
        self.state.enabled(level)
    }

    fn handle(&self, _ctx: &Context, record: &LogRecord) -> Result<(), HandlerError> {
        let attrs = self.state.prepare(record);
        let mut line = serde_json::to_vec(&Fields(&attrs))
            .map_err(|e| HandlerError::Encoding(e.to_string()))?;
        line.push(b'\n');
        self.state.write(&line)
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        Arc::new(JsonHandler { state: self.state.with_attrs(attrs) })
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        Arc::new(JsonHandler { state: self.state.with_group(name) })
    }
}

/// Attributes serialized as a JSON object, in order, duplicates kept.
struct Fields<'a>(&'a [Attr]);

impl Serialize for Fields<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for attr in self.0 {
            map.serialize_entry(&attr.key, &Field(&attr.value))?;
        }
        map.end()
    }
}

struct Field<'a>(&'a Value);

impl Serialize for Field<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::String(s) => serializer.serialize_str(s),
            Value::Int64(v) => serializer.serialize_i64(*v),
            Value::Uint64(v) => serializer.serialize_u64(*v),
            Value::Float64(v) => serializer.serialize_f64(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Duration(d) => {
                serializer.serialize_u64(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
            }
            Value::Time(t) => t.serialize(serializer),
            Value::Group(attrs) => Fields(attrs).serialize(serializer),
            Value::Any(v) => serializer.collect_str(&format_args!("{:?}", v)),
            Value::LogValuer(_) => Field(&self.0.resolve()).serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn to_json(attrs: &[Attr]) -> String {
        serde_json::to_string(&Fields(attrs)).unwrap()
    }

    #[test]
    fn groups_become_nested_objects() {
        let attrs = vec![
            Attr::string("msg", "demo"),
            Attr::group("user", vec![Attr::string("name", "user"), Attr::bool("admin", false)]),
        ];
        assert_eq!(to_json(&attrs), r#"{"msg":"demo","user":{"name":"user","admin":false}}"#);
    }

    #[test]
    fn scalar_encodings() {
        let attrs = vec![
            Attr::duration("elapsed", Duration::from_millis(3)),
            Attr::uint("n", 7),
            Attr::float("ratio", 0.5),
            Attr::any("tags", vec!["a", "b"]),
        ];
        assert_eq!(
            to_json(&attrs),
            r#"{"elapsed":3000000,"n":7,"ratio":0.5,"tags":"[\"a\", \"b\"]"}"#
        );
    }

    #[test]
    fn duplicate_keys_are_kept() {
        let attrs = vec![Attr::int("a", 1), Attr::int("a", 2)];
        assert_eq!(to_json(&attrs), r#"{"a":1,"a":2}"#);
    }
}
