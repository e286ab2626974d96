//! Basic logger usage example
//!
//! Demonstrates a severity logger with a console frontend, level filtering
//! and per-record attributes.
//!
//! Run with: cargo run --example basic_usage

use rust_attr_logger::prelude::*;
use rust_attr_logger::{attributes, info};

fn main() -> Result<()> {
    println!("=== Rust Attribute Logger - Basic Usage Example ===\n");

    let logger = SeverityLogger::builder()
        .threshold(LogLevel::Trace)
        .frontend(ConsoleFrontend::new())
        .build();

    // Log messages at different levels
    println!("1. Logging at different levels:");
    logger.trace("This is a trace message");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warn("This is a warning message");
    logger.error("This is an error message");
    logger.fatal("This is a fatal message");

    println!("\n2. Logging with a higher threshold:");
    logger.set_filter(LogLevel::Info);
    println!("   Threshold set to INFO - trace and debug won't show:");
    logger.trace("Trace message (hidden)");
    logger.debug("Debug message (hidden)");
    logger.info("Info message (visible)");

    println!("\n3. Records with attributes:");
    logger.log_with(
        LogLevel::Warn,
        "slow query",
        AttributeSet::new().with("table", "orders").with("elapsed_ms", 1250),
    );
    info!(logger, attrs: attributes! { "user_id" => 42 }, "user {} signed in", "alice");

    println!("\n4. Opening a record by hand:");
    let record = logger.open_record(LogLevel::Debug, AttributeSet::new());
    println!("   debug record valid: {}", record.is_valid());
    logger.push(record); // no-op for invalid records

    logger.flush();
    println!(
        "\nMetrics: {} opened, {} rejected",
        logger.metrics().records_opened(),
        logger.metrics().records_rejected()
    );

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
