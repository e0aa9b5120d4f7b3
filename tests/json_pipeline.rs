use std::sync::Arc;

use structured_log_chain::{
    Attr, Handler, HandlerOptions, JsonHandler, Level, LogValue, Logger, MemorySink, Value,
};

fn json(level: Level) -> (Arc<dyn Handler>, MemorySink) {
    let sink = MemorySink::new();
    let opts = HandlerOptions::new(level).replace_attr(|groups, attr| {
        if attr.key == "time" && groups.is_empty() {
            return None;
        }
        Some(attr)
    });
    let handler: Arc<dyn Handler> = Arc::new(JsonHandler::new(Arc::new(sink.clone()), opts));
    (handler, sink)
}

struct Password;

impl LogValue for Password {
    fn log_value(&self) -> Value {
        Value::from("[SECRET]")
    }
}

struct User;

impl LogValue for User {
    fn log_value(&self) -> Value {
        Value::group(vec![Attr::string("name", "user"), Attr::valuer("password", Password)])
    }
}

#[test]
fn redaction_applies_inside_groups() {
    let (handler, sink) = json(Level::Info);
    Logger::from_arc(handler).info("demo", [Attr::valuer("user", User)]).unwrap();
    assert_eq!(
        sink.lines(),
        [r#"{"level":"INFO","msg":"demo","user":{"name":"user","password":"[SECRET]"}}"#]
    );
}

#[test]
fn json_encoder_nests_groups() {
    let (handler, sink) = json(Level::Info);
    Logger::from_arc(handler)
        .info("m", [Attr::group("user", vec![Attr::string("password", "x")])])
        .unwrap();
    assert_eq!(sink.lines(), [r#"{"level":"INFO","msg":"m","user":{"password":"x"}}"#]);
}

#[test]
fn with_group_nests_later_attributes() {
    let (handler, sink) = json(Level::Info);
    let logger = Logger::from_arc(handler);
    logger.with_group("req").info("done", [Attr::int("status", 200)]).unwrap();
    logger.with_group("empty").info("bare", []).unwrap();
    assert_eq!(
        sink.lines(),
        [
            r#"{"level":"INFO","msg":"done","req":{"status":200}}"#,
            r#"{"level":"INFO","msg":"bare"}"#,
        ]
    );
}

#[test]
fn custom_attr_binding_in_json() {
    let (handler, sink) = json(Level::Info);
    let logger = Logger::from_arc(handler).with([Attr::string("service", "my-service")]);
    logger.info("hello", []).unwrap();
    assert_eq!(sink.lines(), [r#"{"level":"INFO","msg":"hello","service":"my-service"}"#]);
}
