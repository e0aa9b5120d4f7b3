use std::sync::atomic::Ordering;
use std::sync::Arc;

use structured_log_chain::{
    with_metadata, Context, HandlerLayer, HandlerOptions, Level, Logger, MemorySink, Metadata,
    MetadataHandler, TextHandler,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

fn logger(level: Level) -> (Logger, MemorySink) {
    let sink = MemorySink::new();
    let opts = HandlerOptions::new(level).replace_attr(|groups, attr| {
        if attr.key == "time" && groups.is_empty() {
            return None;
        }
        Some(attr)
    });
    let text = TextHandler::new(Arc::new(sink.clone()), opts);
    (Logger::new(MetadataHandler::new(Arc::new(text))), sink)
}

#[test]
fn tracing_events_become_records() {
    let (logger, sink) = logger(Level::Info);
    let layer = HandlerLayer::new(logger);
    let handled = Arc::clone(&layer.handled_events);
    let subscriber = Registry::default().with(layer);

    tracing::subscriber::with_default(subscriber, || {
        tracing::debug!("not shown");
        tracing::info!(world = 42, "hello");
        tracing::error!(ok = false, ratio = 0.5, "failed");
    });

    assert_eq!(
        sink.lines(),
        ["level=INFO msg=hello world=42", "level=ERROR msg=failed ok=false ratio=0.5"]
    );
    assert_eq!(handled.load(Ordering::Relaxed), 2);
}

#[test]
fn tracing_events_pick_up_scoped_metadata() {
    let (logger, sink) = logger(Level::Info);
    let subscriber = Registry::default().with(HandlerLayer::new(logger));
    let ctx = with_metadata(&Context::background(), Metadata::new().insert("request_id", "123"));

    tracing::subscriber::with_default(subscriber, || {
        ctx.sync_scope(|| tracing::info!("request started"));
        tracing::info!("outside");
    });

    assert_eq!(
        sink.lines(),
        [r#"level=INFO msg="request started" request_id=123"#, "level=INFO msg=outside"]
    );
}
