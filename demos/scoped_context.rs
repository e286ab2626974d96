//! Scoped attribute example
//!
//! Shows how scoped attributes follow every record on the current thread,
//! how filters can use them, and how other threads stay unaffected.
//!
//! Run with: cargo run --example scoped_context

use rust_attr_logger::prelude::*;
use std::sync::Arc;
use std::thread;

fn handle_request(logger: &SeverityLogger, request_id: &str) {
    let _request = logger.scoped(AttributeSet::new().with("request_id", request_id));
    logger.info("request received");

    {
        let _db = logger.scoped(AttributeSet::new().with("component", "db"));
        logger.debug("query issued");
    }

    logger.info("request finished");
}

fn main() -> Result<()> {
    println!("=== Rust Attribute Logger - Scoped Context Example ===\n");

    let logger = Arc::new(
        SeverityLogger::builder()
            .threshold(LogLevel::Debug)
            .frontend(ConsoleFrontend::new())
            .build(),
    );

    println!("1. Nested scopes on one thread:");
    handle_request(&logger, "req-1");

    println!("\n2. Filtering on a scoped attribute:");
    // Only keep debug records when a request is being traced
    logger.set_filter_with(LogLevel::Debug, |view, level| {
        *level >= LogLevel::Info || view.get("trace").and_then(|v| v.as_i64()) == Some(1)
    });
    handle_request(&logger, "req-2");
    {
        let _trace = logger.scoped(AttributeSet::new().with("trace", 1));
        handle_request(&logger, "req-3");
    }

    println!("\n3. Scopes are per thread:");
    let workers: Vec<_> = ["req-4", "req-5"]
        .into_iter()
        .map(|id| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || handle_request(&logger, id))
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker panicked");
    }

    logger.flush();
    println!("\n=== Example completed successfully! ===");
    Ok(())
}
