use std::sync::Arc;

use structured_log_chain::{
    default_logger, init_tracing, Attr, HandlerOptions, JsonHandler, Level, Logger, MemorySink,
};

// Installing the global subscriber can only happen once per process, so the
// whole flow lives in a single test.
#[test]
fn init_routes_tracing_and_sets_default_logger() {
    let sink = MemorySink::new();
    let opts = HandlerOptions::new(Level::Debug).replace_attr(|groups, attr| {
        if attr.key == "time" && groups.is_empty() {
            return None;
        }
        Some(attr)
    });
    let logger = Logger::new(JsonHandler::new(Arc::new(sink.clone()), opts));

    init_tracing(logger).unwrap();

    tracing::info!("hello");
    default_logger().info("direct", [Attr::int("n", 1)]).unwrap();

    assert_eq!(
        sink.lines(),
        [r#"{"level":"INFO","msg":"hello"}"#, r#"{"level":"INFO","msg":"direct","n":1}"#]
    );
    assert!(init_tracing(default_logger()).is_err());
}
