use std::sync::Arc;
use std::time::Instant;

use structured_log_chain::{info, HandlerOptions, Logger, NoopSink, TextHandler};

fn main() {
    let handler = TextHandler::new(Arc::new(NoopSink), HandlerOptions::default());
    let logger = Logger::new(handler).with([structured_log_chain::Attr::string("service", "load")]);

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        if let Err(e) = info!(logger, "default load test", "iteration" => i) {
            eprintln!("log failed: {}", e);
        }
    }

    let elapsed = start.elapsed();
    println!("text handler: emitted {} records in {:?} (~{:.0} rec/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
