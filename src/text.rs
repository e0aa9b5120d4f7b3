use crate::context::Context;
use crate::encoder::EncoderState;
use crate::handler::{Handler, HandlerError, HandlerOptions};
use crate::level::Level;
use crate::record::LogRecord;
use crate::sink::LogSink;
use crate::value::{format_duration, Attr, Value};
use chrono::SecondsFormat;
use std::fmt::Write as _;
use std::sync::Arc;

/// Terminal handler writing one `key=value` line per record:
///
/// ```text
/// time=2024-05-01T10:00:00.000Z level=ERROR msg="something went wrong" a=1 user.name=bob
/// ```
///
/// Keys and values are quoted when they are empty or contain whitespace,
/// `=`, `"` or control characters. Groups are flattened into dotted keys.
#[derive(Clone)]
pub struct TextHandler {
    state: EncoderState,
}

impl TextHandler {
    pub fn new(sink: Arc<dyn LogSink>, opts: HandlerOptions) -> Self {
        TextHandler { state: EncoderState::new(sink, opts) }
    }
}

impl Handler for TextHandler {
    fn enabled(&self, level: Level) -> bool {
        self.state.enabled(level)
    }

    fn handle(&self, _ctx: &Context, record: &LogRecord) -> Result<(), HandlerError> {
        let attrs = self.state.prepare(record);
        let mut line = String::with_capacity(128);
        write_attrs(&mut line, "", &attrs);
        line.push('\n');
        self.state.write(line.as_bytes())
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        Arc::new(TextHandler { state: self.state.with_attrs(attrs) })
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        Arc::new(TextHandler { state: self.state.with_group(name) })
    }
}

fn write_attrs(line: &mut String, prefix: &str, attrs: &[Attr]) {
    for attr in attrs {
        if let Value::Group(members) = &attr.value {
            write_attrs(line, &format!("{}{}.", prefix, attr.key), members);
            continue;
        }
        if !line.is_empty() {
            line.push(' ');
        }
        write_text(line, &format!("{}{}", prefix, attr.key));
        line.push('=');
        write_value(line, &attr.value);
    }
}

fn write_value(line: &mut String, value: &Value) {
    match value {
        Value::String(s) => write_text(line, s),
        Value::Int64(v) => {
            let _ = write!(line, "{}", v);
        }
        Value::Uint64(v) => {
            let _ = write!(line, "{}", v);
        }
        Value::Float64(v) => {
            let _ = write!(line, "{}", v);
        }
        Value::Bool(v) => {
            let _ = write!(line, "{}", v);
        }
        Value::Duration(d) => line.push_str(&format_duration(*d)),
        Value::Time(t) => line.push_str(&t.to_rfc3339_opts(SecondsFormat::Millis, true)),
        Value::Group(_) => unreachable!("groups are flattened by write_attrs"),
        Value::Any(v) => write_text(line, &format!("{:?}", v)),
        Value::LogValuer(_) => write_value(line, &value.resolve()),
    }
}

fn needs_quoting(s: &str) -> bool {
    s.is_empty()
        || s.chars().any(|c| c == '=' || c == '"' || c.is_whitespace() || c.is_control())
}

fn write_text(line: &mut String, s: &str) {
    if needs_quoting(s) {
        let _ = write!(line, "{:?}", s);
    } else {
        line.push_str(s);
    }
}
