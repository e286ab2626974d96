//! Queued frontend example
//!
//! Moves JSON output onto a worker thread and shows overflow handling and
//! configuration-driven assembly.
//!
//! Run with: cargo run --example async_frontend

use rust_attr_logger::prelude::*;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Rust Attribute Logger - Queued Frontend Example ===\n");

    let log_dir = std::env::temp_dir().join("rust_attr_logger_demo");
    std::fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("records.jsonl");

    println!("1. JSON lines written from a worker thread:");
    let logger = SeverityLogger::builder()
        .threshold(LogLevel::Info)
        .frontend(AsyncFrontend::with_policy(
            JsonFrontend::new(&log_path)?,
            1024,
            QueuePolicy::BlockWithTimeout(Duration::from_millis(50)),
        ))
        .exception_handler(|failure| eprintln!("frontend failure: {}", failure))
        .build();

    for i in 0..100 {
        logger.log_with(
            LogLevel::Info,
            "order processed",
            AttributeSet::new().with("order_id", i).with("amount", 19.99),
        );
    }
    logger.flush();
    println!("   written to {}", log_path.display());

    println!("\n2. Dropping records when the queue is full:");
    let small = SeverityLogger::builder()
        .threshold(LogLevel::Info)
        .frontend(AsyncFrontend::new(JsonFrontend::from_writer(std::io::sink()), 4))
        .exception_handler(|_| {})
        .build();
    for i in 0..10_000 {
        small.log_with(LogLevel::Info, "burst", AttributeSet::new().with("i", i));
    }
    small.flush();
    println!(
        "   {} dispatched, {} frontend failures (queue full)",
        small.metrics().records_dispatched(),
        small.metrics().frontend_failures()
    );

    println!("\n3. Assembling a logger from configuration:");
    let config: LoggerConfig = serde_json::from_str(
        r#"{
            "threshold": "warning",
            "frontends": [
                { "type": "async", "capacity": 256, "inner": { "type": "console", "colors": true } }
            ]
        }"#,
    )?;
    let configured = Registry::configured().build(&config)?;
    configured.info("hidden by the configured threshold");
    configured.warn("shown by the configured console frontend");
    configured.flush();

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
