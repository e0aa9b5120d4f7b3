use std::sync::Arc;
use std::time::Instant;

use structured_log_chain::{
    with_metadata, Attr, Context, HandlerOptions, JsonHandler, Logger, Metadata, MetadataHandler,
    NoopSink, RedactHandler,
};

#[tokio::main]
async fn main() {
    let json = JsonHandler::new(Arc::new(NoopSink), HandlerOptions::default());
    let chain = MetadataHandler::new(Arc::new(RedactHandler::new(Arc::new(json))));
    let logger = Logger::new(chain);

    let tasks: u64 = 8;
    let per_task: u64 = 25_000;
    let start = Instant::now();

    let handles: Vec<_> = (0..tasks)
        .map(|t| {
            let logger = logger.clone();
            let ctx = with_metadata(
                &Context::background(),
                Metadata::new().insert("request_id", format!("req-{}", t)),
            );
            tokio::spawn(ctx.scope(async move {
                for i in 0..per_task {
                    let ctx = Context::current();
                    let attrs = [Attr::uint("iteration", i), Attr::string("token", "hidden")];
                    if let Err(e) = logger.info_context(&ctx, "context load test", attrs) {
                        eprintln!("log failed: {}", e);
                    }
                }
            }))
        })
        .collect();

    for handle in handles {
        if let Err(e) = handle.await {
            eprintln!("load task failed: {}", e);
        }
    }

    let n = tasks * per_task;
    let elapsed = start.elapsed();
    println!("metadata+redact+json: emitted {} records in {:?} (~{:.0} rec/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
