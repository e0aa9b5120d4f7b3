//! State shared by the terminal, encoding handlers.
//!
//! Encoders keep the attributes bound through `with_attrs` per open group,
//! and assemble them with a record's own attributes into one resolved,
//! filtered attribute tree at `handle` time. The text and JSON handlers only
//! differ in how they print that tree.

use crate::handler::{HandlerError, HandlerOptions};
use crate::level::Level;
use crate::record::LogRecord;
use crate::sink::LogSink;
use crate::value::{Attr, Value, LOG_VALUE_DEPTH_PLACEHOLDER, MAX_LOG_VALUE_DEPTH};
use std::sync::Arc;

/// Key of the built-in timestamp attribute.
pub const TIME_KEY: &str = "time";
/// Key of the built-in level attribute.
pub const LEVEL_KEY: &str = "level";
/// Key of the built-in message attribute.
pub const MESSAGE_KEY: &str = "msg";

#[derive(Clone)]
pub(crate) struct EncoderState {
    opts: HandlerOptions,
    sink: Arc<dyn LogSink>,
    /// Attributes bound before any group was opened.
    root: Vec<Attr>,
    /// Open groups, outermost first, each with the attributes bound inside it.
    groups: Vec<(String, Vec<Attr>)>,
}

impl EncoderState {
    pub(crate) fn new(sink: Arc<dyn LogSink>, opts: HandlerOptions) -> Self {
        EncoderState { opts, sink, root: Vec::new(), groups: Vec::new() }
    }

    pub(crate) fn enabled(&self, level: Level) -> bool {
        level >= self.opts.level
    }

    pub(crate) fn with_attrs(&self, attrs: Vec<Attr>) -> Self {
        let mut state = self.clone();
        match state.groups.last_mut() {
            Some((_, bound)) => bound.extend(attrs),
            None => state.root.extend(attrs),
        }
        state
    }

    pub(crate) fn with_group(&self, name: &str) -> Self {
        let mut state = self.clone();
        if !name.is_empty() {
            state.groups.push((name.to_string(), Vec::new()));
        }
        state
    }

    /// Build the attribute list to print for `record`: the built-in
    /// `time`, `level` and `msg` attributes followed by bound and record
    /// attributes nested under the open groups. Every value is resolved, the
    /// replace hook is applied, and empty groups are dropped.
    pub(crate) fn prepare(&self, record: &LogRecord) -> Vec<Attr> {
        let mut out = Vec::with_capacity(3 + self.root.len() + record.num_attrs());
        let mut path = Vec::new();

        self.push(&mut out, &mut path, Attr::time(TIME_KEY, record.time), 0);
        self.push(&mut out, &mut path, Attr::string(LEVEL_KEY, record.level.as_str()), 0);
        self.push(&mut out, &mut path, Attr::string(MESSAGE_KEY, record.message.as_str()), 0);

        let mut nested = record.attrs().to_vec();
        for (name, bound) in self.groups.iter().rev() {
            let mut members = bound.clone();
            members.append(&mut nested);
            nested = vec![Attr::group(name.as_str(), members)];
        }

        for attr in self.root.iter().cloned().chain(nested) {
            self.push(&mut out, &mut path, attr, 0);
        }
        out
    }

    fn push(&self, out: &mut Vec<Attr>, path: &mut Vec<String>, attr: Attr, depth: usize) {
        let (value, depth) = resolve_at(&attr.value, depth);
        if let Value::Group(members) = value {
            self.push_group(out, path, attr.key, members, depth);
            return;
        }

        let attr = Attr { key: attr.key, value };
        let attr = match &self.opts.replace_attr {
            Some(replace) => match replace(path.as_slice(), attr) {
                Some(attr) => attr,
                None => return,
            },
            None => attr,
        };

        match resolve_at(&attr.value, depth) {
            (Value::Group(members), depth) => self.push_group(out, path, attr.key, members, depth),
            (value, _) => out.push(Attr { key: attr.key, value }),
        }
    }

    fn push_group(
        &self,
        out: &mut Vec<Attr>,
        path: &mut Vec<String>,
        key: String,
        members: Vec<Attr>,
        depth: usize,
    ) {
        // An unnamed group is inlined into its parent.
        if key.is_empty() {
            for member in members {
                self.push(out, path, member, depth);
            }
            return;
        }

        let mut children = Vec::with_capacity(members.len());
        path.push(key);
        for member in members {
            self.push(&mut children, path, member, depth);
        }
        let key = path.pop().unwrap_or_default();

        if !children.is_empty() {
            out.push(Attr { key, value: Value::Group(children) });
        }
    }

    pub(crate) fn write(&self, bytes: &[u8]) -> Result<(), HandlerError> {
        self.sink.write_record(bytes)?;
        Ok(())
    }
}

/// Resolve `value`, counting how many group levels were produced by a
/// [`LogValue`](crate::value::LogValue). A value nested deeper than
/// [`MAX_LOG_VALUE_DEPTH`] such levels becomes the placeholder string.
fn resolve_at(value: &Value, depth: usize) -> (Value, usize) {
    if !matches!(value, Value::LogValuer(_)) {
        return (value.clone(), depth);
    }
    if depth >= MAX_LOG_VALUE_DEPTH {
        return (Value::String(LOG_VALUE_DEPTH_PLACEHOLDER.to_string()), depth);
    }
    (value.resolve(), depth + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noop_sink::NoopSink;

    fn keys(attrs: &[Attr]) -> Vec<&str> {
        attrs.iter().map(|a| a.key.as_str()).collect()
    }

    #[test]
    fn bound_attrs_precede_record_attrs() {
        let state = EncoderState::new(Arc::new(NoopSink), HandlerOptions::default())
            .with_attrs(vec![Attr::int("a", 1)])
            .with_attrs(vec![Attr::int("b", 2)]);
        let mut record = LogRecord::new(Level::Info, "m");
        record.add(Attr::int("c", 3));

        let attrs = state.prepare(&record);
        assert_eq!(keys(&attrs), ["time", "level", "msg", "a", "b", "c"]);
    }

    #[test]
    fn groups_nest_bound_and_record_attrs() {
        let state = EncoderState::new(Arc::new(NoopSink), HandlerOptions::default())
            .with_attrs(vec![Attr::int("x", 0)])
            .with_group("req")
            .with_attrs(vec![Attr::string("method", "GET")]);
        let mut record = LogRecord::new(Level::Info, "m");
        record.add(Attr::int("status", 200));

        let attrs = state.prepare(&record);
        assert_eq!(keys(&attrs), ["time", "level", "msg", "x", "req"]);
        match &attrs[4].value {
            Value::Group(members) => assert_eq!(keys(members), ["method", "status"]),
            other => panic!("expected group, got {:?}", other),
        }
    }

    #[test]
    fn empty_groups_are_dropped_and_unnamed_groups_inlined() {
        let state = EncoderState::new(Arc::new(NoopSink), HandlerOptions::default()).with_group("g");
        let mut record = LogRecord::new(Level::Info, "m");
        assert_eq!(keys(&state.prepare(&record)), ["time", "level", "msg"]);

        record.add(Attr::group("", vec![Attr::int("inline", 1)]));
        record.add(Attr::group("empty", Vec::new()));
        let root = EncoderState::new(Arc::new(NoopSink), HandlerOptions::default());
        assert_eq!(keys(&root.prepare(&record)), ["time", "level", "msg", "inline"]);
    }

    #[test]
    fn replace_hook_sees_group_path_and_can_drop() {
        let opts = HandlerOptions::default().replace_attr(|groups, attr| {
            if attr.key == TIME_KEY && groups.is_empty() {
                return None;
            }
            if groups == ["user"] && attr.key == "name" {
                return Some(Attr::string("login", "renamed"));
            }
            Some(attr)
        });
        let state = EncoderState::new(Arc::new(NoopSink), opts);
        let mut record = LogRecord::new(Level::Info, "m");
        record.add(Attr::group("user", vec![Attr::string("name", "bob")]));
        record.add(Attr::string("name", "top"));

        let attrs = state.prepare(&record);
        assert_eq!(keys(&attrs), ["level", "msg", "user", "name"]);
        match &attrs[2].value {
            Value::Group(members) => assert_eq!(keys(members), ["login"]),
            other => panic!("expected group, got {:?}", other),
        }
    }

    struct Node;

    impl crate::value::LogValue for Node {
        fn log_value(&self) -> Value {
            Value::group(vec![Attr::int("id", 1), Attr::valuer("child", Node)])
        }
    }

    #[test]
    fn cyclic_valuer_through_groups_degrades_to_placeholder() {
        let state = EncoderState::new(Arc::new(NoopSink), HandlerOptions::default());
        let mut record = LogRecord::new(Level::Info, "m");
        record.add(Attr::valuer("node", Node));

        let attrs = state.prepare(&record);

        let mut depth = 0;
        let mut current = &attrs[3];
        while let Value::Group(members) = &current.value {
            assert_eq!(keys(members), ["id", "child"]);
            current = &members[1];
            depth += 1;
        }
        assert_eq!(depth, MAX_LOG_VALUE_DEPTH);
        match &current.value {
            Value::String(s) => assert_eq!(s, LOG_VALUE_DEPTH_PLACEHOLDER),
            other => panic!("expected placeholder, got {:?}", other),
        }
    }
}
