use crate::context::Context;
use crate::handler::{Handler, HandlerError};
use crate::level::Level;
use crate::record::LogRecord;
use crate::value::{Attr, LogValue, Value};
use std::sync::Arc;

/// Keys that are redacted by [`RedactHandler::new`].
pub const DEFAULT_SENSITIVE_KEYS: &[&str] = &[
    "password",
    "secret",
    "token",
    "api_key",
    "authorization",
    "credential",
];

/// Replacement written in place of a redacted value.
pub const REDACTED: &str = "[REDACTED]";

/// Decorator masking values of attributes whose key looks sensitive.
///
/// A key is sensitive when it contains one of the configured words,
/// ignoring case. The check applies at every group depth, to attributes
/// bound with `with_attrs` as well as to the record's own, and to groups
/// produced lazily by a [`LogValue`], which stay lazy. Once a group with a
/// sensitive name is opened through `with_group`, every value logged inside
/// it is masked, whatever its own key.
#[derive(Clone)]
pub struct RedactHandler {
    inner: Arc<dyn Handler>,
    policy: Arc<Policy>,
    masked: bool,
}

struct Policy {
    keys: Vec<String>,
}

impl Policy {
    fn is_sensitive(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.keys.iter().any(|k| key.contains(k.as_str()))
    }

    fn redact_attr(self: &Arc<Self>, attr: &Attr) -> Attr {
        if self.is_sensitive(&attr.key) {
            return Attr::string(attr.key.as_str(), REDACTED);
        }
        Attr { key: attr.key.clone(), value: self.redact_value(&attr.value) }
    }

    fn redact_value(self: &Arc<Self>, value: &Value) -> Value {
        match value {
            Value::Group(members) => {
                Value::Group(members.iter().map(|m| self.redact_attr(m)).collect())
            }
            Value::LogValuer(valuer) => Value::valuer(Lazy {
                inner: Arc::clone(valuer),
                policy: Arc::clone(self),
            }),
            other => other.clone(),
        }
    }

    fn redact_all(self: &Arc<Self>, attrs: &[Attr]) -> Vec<Attr> {
        attrs.iter().map(|a| self.redact_attr(a)).collect()
    }

    fn mask_all(attrs: &[Attr]) -> Vec<Attr> {
        attrs.iter().map(|a| Attr::string(a.key.as_str(), REDACTED)).collect()
    }
}

/// Applies the policy to whatever the wrapped valuer produces.
struct Lazy {
    inner: Arc<dyn LogValue>,
    policy: Arc<Policy>,
}

impl LogValue for Lazy {
    fn log_value(&self) -> Value {
        let resolved = Value::LogValuer(Arc::clone(&self.inner)).resolve();
        self.policy.redact_value(&resolved)
    }
}

impl RedactHandler {
    pub fn new(inner: Arc<dyn Handler>) -> Self {
        Self::with_keys(inner, DEFAULT_SENSITIVE_KEYS.iter().copied())
    }

    pub fn with_keys<I, S>(inner: Arc<dyn Handler>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys = keys.into_iter().map(|k| k.as_ref().to_lowercase()).collect();
        RedactHandler { inner, policy: Arc::new(Policy { keys }), masked: false }
    }

    fn wrap(&self, inner: Arc<dyn Handler>, masked: bool) -> Arc<dyn Handler> {
        Arc::new(RedactHandler { inner, policy: Arc::clone(&self.policy), masked })
    }

    fn redact(&self, attrs: &[Attr]) -> Vec<Attr> {
        if self.masked {
            Policy::mask_all(attrs)
        } else {
            self.policy.redact_all(attrs)
        }
    }
}

impl Handler for RedactHandler {
    fn enabled(&self, level: Level) -> bool {
        self.inner.enabled(level)
    }

    fn handle(&self, ctx: &Context, record: &LogRecord) -> Result<(), HandlerError> {
        let mut redacted = LogRecord::with_time(record.time, record.level, record.message.as_str());
        redacted.add_attrs(self.redact(record.attrs()));
        self.inner.handle(ctx, &redacted)
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        self.wrap(self.inner.with_attrs(self.redact(&attrs)), self.masked)
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        let masked = self.masked || self.policy.is_sensitive(name);
        self.wrap(self.inner.with_group(name), masked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> Arc<Policy> {
        Arc::new(Policy { keys: vec!["password".to_string(), "token".to_string()] })
    }

    fn as_string(value: &Value) -> String {
        match value.resolve() {
            Value::String(s) => s,
            other => panic!("expected string, got {:?}", other),
        }
    }

    #[test]
    fn matches_keys_by_substring_ignoring_case() {
        let p = policy();
        assert!(p.is_sensitive("password"));
        assert!(p.is_sensitive("DB_Password"));
        assert!(p.is_sensitive("refresh_token"));
        assert!(!p.is_sensitive("user"));
    }

    #[test]
    fn redacts_inside_groups() {
        let attr = Attr::group(
            "user",
            vec![Attr::string("name", "bob"), Attr::string("password", "hunter2")],
        );
        match policy().redact_attr(&attr).value {
            Value::Group(members) => {
                assert_eq!(as_string(&members[0].value), "bob");
                assert_eq!(as_string(&members[1].value), REDACTED);
            }
            other => panic!("expected group, got {:?}", other),
        }
    }

    struct Credentials;

    impl LogValue for Credentials {
        fn log_value(&self) -> Value {
            Value::group(vec![Attr::string("user", "bob"), Attr::string("token", "t0k")])
        }
    }

    #[test]
    fn redacts_lazily_produced_groups() {
        let value = policy().redact_value(&Value::valuer(Credentials));
        assert!(matches!(value, Value::LogValuer(_)));
        match value.resolve() {
            Value::Group(members) => assert_eq!(as_string(&members[1].value), REDACTED),
            other => panic!("expected group, got {:?}", other),
        }
    }

    #[test]
    fn sensitive_group_masks_everything_logged_inside_it() {
        let sink = crate::sink::MemorySink::new();
        let opts = crate::handler::HandlerOptions::default().replace_attr(|groups, attr| {
            if attr.key == "time" && groups.is_empty() {
                return None;
            }
            Some(attr)
        });
        let text: Arc<dyn Handler> =
            Arc::new(crate::text::TextHandler::new(Arc::new(sink.clone()), opts));
        let handler = RedactHandler::new(text).with_group("credentials");
        let handler = handler.with_attrs(vec![Attr::string("kind", "basic")]);

        let mut record = LogRecord::new(Level::Info, "m");
        record.add(Attr::string("value", "hunter2"));
        record.add(Attr::group("nested", vec![Attr::string("user", "bob")]));
        handler.handle(&Context::background(), &record).unwrap();

        assert_eq!(
            sink.lines(),
            ["level=INFO msg=m credentials.kind=[REDACTED] credentials.value=[REDACTED] credentials.nested=[REDACTED]"]
        );
        assert!(!sink.contents().contains("hunter2"));
    }

    #[test]
    fn ordinary_group_does_not_mask() {
        let sink = crate::sink::MemorySink::new();
        let text: Arc<dyn Handler> = Arc::new(crate::text::TextHandler::new(
            Arc::new(sink.clone()),
            crate::handler::HandlerOptions::default(),
        ));
        let handler = RedactHandler::new(text).with_group("req");
        let mut record = LogRecord::new(Level::Info, "m");
        record.add(Attr::string("value", "visible"));
        handler.handle(&Context::background(), &record).unwrap();

        assert!(sink.contents().ends_with(" req.value=visible\n"), "{}", sink.contents());
    }
}
