//! Integration tests for the attribute logger
//!
//! These tests verify:
//! - Severity admission and the `severity` internal attribute
//! - Dispatch isolation when frontends fail or panic
//! - Scoped attribute visibility per thread
//! - JSON lines output
//! - Configuration-driven assembly

use parking_lot::Mutex;
use rust_attr_logger::core::attribute::names;
use rust_attr_logger::prelude::*;
use rust_attr_logger::{FailureCause, FrontendConfig};
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

/// Counts calls and fails each one
struct Failing {
    calls: Arc<AtomicUsize>,
}

impl Frontend for Failing {
    fn handle(&self, _record: &Record<'_>) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LoggerError::writer("sink unavailable"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

struct Panicking;

impl Frontend for Panicking {
    fn handle(&self, _record: &Record<'_>) -> Result<()> {
        panic!("frontend bug");
    }

    fn name(&self) -> &str {
        "panicking"
    }
}

#[test]
fn test_warning_threshold_scenario() {
    let logger = SeverityLogger::new(LogLevel::Warn);

    let failing_calls = Arc::new(AtomicUsize::new(0));
    let memory = MemoryFrontend::new();
    logger.add_frontend(Failing {
        calls: Arc::clone(&failing_calls),
    });
    logger.add_frontend(memory.clone());

    let handler_calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&handler_calls);
    logger.set_exception_handler(move |failure| {
        assert_eq!(failure.index, 0);
        assert_eq!(failure.frontend, "failing");
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert!(!logger.open_record(LogLevel::Info, AttributeSet::new()).is_valid());

    let warning = logger.open_record(LogLevel::Warn, AttributeSet::new().with("message", "warned"));
    assert!(warning.is_valid());
    assert_eq!(warning.severity::<LogLevel>(), Some(LogLevel::Warn));
    assert_eq!(
        warning.internal().get(names::SEVERITY).and_then(Value::as_i64),
        Some(LogLevel::Warn.as_raw())
    );

    assert!(logger.open_record(LogLevel::Error, AttributeSet::new()).is_valid());

    logger.push(warning);

    assert_eq!(failing_calls.load(Ordering::SeqCst), 1);
    assert_eq!(handler_calls.load(Ordering::SeqCst), 1);
    assert_eq!(memory.messages(), vec!["warned".to_string()]);
}

#[test]
fn test_every_frontend_invoked_once_under_failures() {
    let logger = Logger::new();
    let calls: Vec<Arc<AtomicUsize>> = (0..4).map(|_| Arc::new(AtomicUsize::new(0))).collect();
    let memory = MemoryFrontend::new();

    logger.add_frontend(Failing { calls: Arc::clone(&calls[0]) });
    logger.add_frontend(Panicking);
    logger.add_frontend(memory.clone());
    logger.add_frontend(Failing { calls: Arc::clone(&calls[1]) });

    let failures = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&failures);
    logger.set_exception_handler(move |failure| {
        let panicked = matches!(failure.cause, FailureCause::Panic(_));
        sink.lock().push((failure.index, panicked));
    });

    logger.push(logger.open(AttributeSet::new().with("message", "fan-out")));

    assert_eq!(calls[0].load(Ordering::SeqCst), 1);
    assert_eq!(calls[1].load(Ordering::SeqCst), 1);
    assert_eq!(memory.len(), 1);
    assert_eq!(*failures.lock(), vec![(0, false), (1, true), (3, false)]);
    assert_eq!(logger.metrics().frontend_failures(), 3);
}

#[test]
fn test_invalid_record_reaches_no_frontend() {
    let logger = SeverityLogger::new(LogLevel::Error);
    let calls = Arc::new(AtomicUsize::new(0));
    logger.add_frontend(Failing { calls: Arc::clone(&calls) });

    let handler_calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&handler_calls);
    logger.set_exception_handler(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let record = logger.open_record(LogLevel::Debug, AttributeSet::new());
    assert!(!record.is_valid());
    logger.push(record);
    logger.push(Record::invalid());

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(handler_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_scoped_attributes_are_thread_local() {
    let logger = Arc::new(Logger::new());
    let memory = MemoryFrontend::new();
    logger.add_frontend(memory.clone());

    // Only admit records that carry a request id, from scope or caller
    logger.set_filter(|view, _| view.contains("request_id"));

    let barrier = Arc::new(Barrier::new(2));

    let scoped_thread = {
        let logger = Arc::clone(&logger);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            let _scope = logger.scoped(AttributeSet::new().with("request_id", "r-1"));
            barrier.wait();
            let record = logger.open(AttributeSet::new().with("message", "scoped"));
            assert!(record.is_valid());
            assert_eq!(
                record.external().get("request_id").and_then(Value::as_str),
                Some("r-1")
            );
            logger.push(record);
            barrier.wait();
        })
    };

    let bare_thread = {
        let logger = Arc::clone(&logger);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            // The other thread's scope is active right now but not visible here
            let record = logger.open(AttributeSet::new().with("message", "bare"));
            assert!(!record.is_valid());
            assert_eq!(logger.scoped_depth(), 0);
            barrier.wait();
        })
    };

    scoped_thread.join().unwrap();
    bare_thread.join().unwrap();

    assert_eq!(memory.messages(), vec!["scoped".to_string()]);
}

#[test]
fn test_scope_nesting_order() {
    let logger = SeverityLogger::new(LogLevel::Trace);
    let memory = MemoryFrontend::new();
    logger.add_frontend(memory.clone());

    {
        let _outer = logger.scoped(AttributeSet::new().with("layer", "outer"));
        {
            let _inner = logger.scoped(AttributeSet::new().with("layer", "inner"));
            assert_eq!(logger.scoped_depth(), 2);
            logger.info("both");
        }
        assert_eq!(logger.scoped_depth(), 1);
        logger.info("outer only");
    }
    assert_eq!(logger.scoped_depth(), 0);
    logger.info("none");

    let layers: Vec<Vec<String>> = memory
        .records()
        .iter()
        .map(|record| {
            record
                .external()
                .iter()
                .filter(|attr| attr.name == "layer")
                .map(|attr| attr.value.to_string())
                .collect()
        })
        .collect();

    assert_eq!(
        layers,
        vec![
            vec!["outer".to_string(), "inner".to_string()],
            vec!["outer".to_string()],
            vec![],
        ]
    );
}

#[test]
fn test_disabled_logger_skips_filter_and_frontends() {
    let logger = SeverityLogger::new(LogLevel::Trace);
    let memory = MemoryFrontend::new();
    logger.add_frontend(memory.clone());

    let filter_calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&filter_calls);
    logger.set_filter_with(LogLevel::Trace, move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        true
    });

    logger.set_enabled(false);
    for level in LogLevel::ALL {
        assert!(!logger.open_record(level, AttributeSet::new()).is_valid());
    }
    logger.fatal("dropped");

    assert_eq!(filter_calls.load(Ordering::SeqCst), 0);
    assert!(memory.is_empty());

    logger.set_enabled(true);
    logger.fatal("kept");
    assert_eq!(memory.messages(), vec!["kept".to_string()]);
}

#[test]
fn test_json_frontend_output() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("records.jsonl");

    let logger = SeverityLogger::builder()
        .threshold(LogLevel::Debug)
        .frontend(JsonFrontend::new(&log_file).expect("Failed to create frontend"))
        .build();

    let _scope = logger.scoped(AttributeSet::new().with("service", "billing"));
    logger.log_with(
        LogLevel::Error,
        "charge failed\nretrying",
        AttributeSet::new().with("amount", 12.5).with("attempt", 2),
    );
    logger.flush();

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 1, "Record should be a single line");

    let parsed: serde_json::Value = serde_json::from_str(lines[0]).expect("Invalid JSON");
    assert_eq!(parsed["message"], "charge failed\nretrying");
    assert_eq!(parsed["severity"], LogLevel::Error.as_raw());
    assert_eq!(parsed["amount"], 12.5);
    assert_eq!(parsed["attempt"], 2);
    assert_eq!(parsed["service"], "billing");
}

#[test]
fn test_async_frontend_preserves_order() {
    let memory = MemoryFrontend::new();
    let logger = SeverityLogger::builder()
        .threshold(LogLevel::Trace)
        .frontend(AsyncFrontend::with_policy(memory.clone(), 16, QueuePolicy::Block))
        .build();

    for i in 0..200 {
        logger.info(format!("Message {}", i));
    }
    logger.flush();

    let messages = memory.messages();
    assert_eq!(messages.len(), 200);
    for (i, message) in messages.iter().enumerate() {
        assert_eq!(message, &format!("Message {}", i));
    }
}

#[test]
fn test_configured_logger_from_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("configured.jsonl");

    let config = serde_json::json!({
        "threshold": "warning",
        "frontends": [
            { "type": "json", "path": log_file.to_str().unwrap() }
        ]
    });
    let config: LoggerConfig = serde_json::from_value(config).expect("Invalid config");
    let logger = Registry::configured().build(&config).expect("Failed to build logger");

    logger.info("below threshold");
    logger.warn("at threshold");
    logger.flush();

    let content = fs::read_to_string(&log_file).expect("Failed to read log file");
    assert_eq!(content.lines().count(), 1);
    assert!(content.contains("at threshold"));

    let unknown = FrontendConfig::new("carrier-pigeon");
    let err = Registry::configured().build_frontend(&unknown).err();
    assert!(matches!(err, Some(LoggerError::UnknownComponent { .. })));
}
