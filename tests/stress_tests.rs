//! Stress tests for concurrent logging and reconfiguration
//!
//! These tests verify:
//! - Concurrent open/push while frontends and filters are replaced
//! - Swapping loggers under load never tears a configuration
//! - Scoped stacks stay balanced across many threads
//! - Queued frontends account for every record under overflow
//! - The filter lock and the frontend lock never wait on each other

use rust_attr_logger::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

/// Counts handled records
#[derive(Clone, Default)]
struct Counting {
    handled: Arc<AtomicUsize>,
}

impl Frontend for Counting {
    fn handle(&self, _record: &Record<'_>) -> Result<()> {
        self.handled.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn name(&self) -> &str {
        "counting"
    }
}

#[test]
fn test_concurrent_logging_during_reconfiguration() {
    let logger = Arc::new(SeverityLogger::new(LogLevel::Trace));
    let counting = Counting::default();
    logger.add_frontend(counting.clone());

    let stop = Arc::new(AtomicBool::new(false));
    let threads = 8;
    let per_thread = 2_000;

    let writers: Vec<_> = (0..threads)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..per_thread {
                    let _scope = logger.scoped(AttributeSet::new().with("thread", t as i64));
                    logger.log_with(LogLevel::Info, "tick", AttributeSet::new().with("i", i as i64));
                }
                assert_eq!(logger.scoped_depth(), 0);
            })
        })
        .collect();

    let reconfigure = {
        let logger = Arc::clone(&logger);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut added = 0;
            while !stop.load(Ordering::Relaxed) {
                // Alternate between two equivalent admitting filters
                if added % 2 == 0 {
                    logger.set_filter(LogLevel::Trace);
                } else {
                    logger.set_filter_with(LogLevel::Trace, |_, _| true);
                }
                logger.add_frontend(MemoryFrontend::new());
                added += 1;
                thread::sleep(Duration::from_millis(1));
            }
            added
        })
    };

    for writer in writers {
        writer.join().expect("writer panicked");
    }
    stop.store(true, Ordering::Relaxed);
    let added = reconfigure.join().expect("reconfigure thread panicked");

    assert_eq!(counting.handled.load(Ordering::Relaxed), threads * per_thread);
    assert_eq!(logger.frontend_count(), added + 1);
    assert_eq!(logger.metrics().records_rejected(), 0);
    assert_eq!(logger.metrics().records_opened(), (threads * per_thread) as u64);
}

#[test]
fn test_swap_under_load() {
    let left = Arc::new(Logger::new());
    let right = Arc::new(Logger::new());

    let left_sink = MemoryFrontend::new();
    let right_sink = MemoryFrontend::new();
    left.add_frontend(left_sink.clone());
    right.add_frontend(right_sink.clone());

    // Each logger's filter only admits records tagged with its own side
    left.set_filter(|view, _| view.get("side").and_then(Value::as_str) == Some("left"));
    right.set_filter(|view, _| view.get("side").and_then(Value::as_str) == Some("right"));

    let stop = Arc::new(AtomicBool::new(false));

    let writers: Vec<_> = [Arc::clone(&left), Arc::clone(&right)]
        .into_iter()
        .map(|logger| {
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut admitted = 0usize;
                while !stop.load(Ordering::Relaxed) {
                    for side in ["left", "right"] {
                        let record = logger.open(AttributeSet::new().with("side", side));
                        if record.is_valid() {
                            admitted += 1;
                        }
                        logger.push(record);
                    }
                    // A swap must never expose a logger with a half-moved frontend list
                    assert_eq!(logger.frontend_count(), 1);
                }
                admitted
            })
        })
        .collect();

    for _ in 0..200 {
        left.swap(&right);
        thread::yield_now();
    }
    stop.store(true, Ordering::Relaxed);

    let admitted: usize = writers.into_iter().map(|w| w.join().expect("writer panicked")).sum();

    // Every admitted record reached exactly one sink
    assert_eq!(left_sink.len() + right_sink.len(), admitted);

    // An even number of swaps restores the original configuration
    assert!(left.open(AttributeSet::new().with("side", "left")).is_valid());
    assert!(!left.open(AttributeSet::new().with("side", "right")).is_valid());
    let check = right.open(AttributeSet::new().with("side", "right"));
    right.push(check);
    let last = right_sink.records().pop().expect("final record");
    assert_eq!(last.get("side").and_then(Value::as_str), Some("right"));
}

#[test]
fn test_concurrent_failures_reach_handler() {
    struct Failing;

    impl Frontend for Failing {
        fn handle(&self, _record: &Record<'_>) -> Result<()> {
            Err(LoggerError::writer("always fails"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    let failures = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&failures);
    let counting = Counting::default();

    let logger = Arc::new(
        SeverityLogger::builder()
            .threshold(LogLevel::Debug)
            .frontend(Failing)
            .frontend(counting.clone())
            .exception_handler(move |_| {
                counter.fetch_add(1, Ordering::Relaxed);
            })
            .build(),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for _ in 0..500 {
                    logger.warn("flaky sink");
                    logger.trace("filtered");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("thread panicked");
    }

    assert_eq!(failures.load(Ordering::Relaxed), 2_000);
    assert_eq!(counting.handled.load(Ordering::Relaxed), 2_000);
    assert_eq!(logger.metrics().records_rejected(), 2_000);
}

#[test]
fn test_async_frontend_drop_newest_under_load() {
    let memory = MemoryFrontend::new();
    let logger = Arc::new(Logger::new());
    logger.add_frontend(AsyncFrontend::new(memory.clone(), 8));

    let rejected = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&rejected);
    logger.set_exception_handler(move |failure| {
        assert!(matches!(
            failure.cause,
            rust_attr_logger::FailureCause::Error(LoggerError::QueueFull { capacity: 8 })
        ));
        counter.fetch_add(1, Ordering::Relaxed);
    });

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..1_000 {
                    logger.push(logger.open(AttributeSet::new().with("i", i)));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("thread panicked");
    }
    logger.flush();

    // Every record is either delivered or reported, never silently lost
    assert_eq!(memory.len() + rejected.load(Ordering::Relaxed), 4_000);
}

/// Blocks inside `handle` until released
struct Gate {
    entered: Sender<()>,
    release: Receiver<()>,
}

impl Frontend for Gate {
    fn handle(&self, _record: &Record<'_>) -> Result<()> {
        let _ = self.entered.send(());
        let _ = self.release.recv();
        Ok(())
    }

    fn name(&self) -> &str {
        "gate"
    }
}

#[test]
fn test_blocked_frontend_does_not_stall_filtering() {
    let logger = Arc::new(Logger::new());
    let (entered_tx, entered_rx) = unbounded();
    let (release_tx, release_rx) = unbounded();
    logger.add_frontend(Gate {
        entered: entered_tx,
        release: release_rx,
    });

    // Dispatch parks inside the frontend while holding the frontend lock
    let pusher = {
        let logger = Arc::clone(&logger);
        thread::spawn(move || logger.push(logger.open(AttributeSet::new())))
    };
    entered_rx
        .recv_timeout(Duration::from_secs(2))
        .expect("dispatch never reached the frontend");

    // A frontend change now waits behind that dispatch
    let writer = {
        let logger = Arc::clone(&logger);
        thread::spawn(move || logger.add_frontend(MemoryFrontend::new()))
    };
    thread::sleep(Duration::from_millis(50));

    let (done_tx, done_rx) = bounded(1);
    let opener = {
        let logger = Arc::clone(&logger);
        thread::spawn(move || {
            logger.set_filter(|view, _| view.contains("admit"));
            let admitted = logger.open(AttributeSet::new().with("admit", 1)).is_valid();
            let rejected = logger.open(AttributeSet::new()).is_valid();
            let _ = done_tx.send((admitted, rejected));
        })
    };

    let outcome = done_rx.recv_timeout(Duration::from_secs(2));

    release_tx.send(()).expect("gate dropped");
    pusher.join().expect("pusher panicked");
    writer.join().expect("writer panicked");
    opener.join().expect("opener panicked");

    assert_eq!(outcome, Ok((true, false)));
    assert_eq!(logger.frontend_count(), 2);
}

#[test]
fn test_blocked_filter_does_not_stall_dispatch() {
    let logger = Arc::new(Logger::new());
    let memory = MemoryFrontend::new();
    logger.add_frontend(memory.clone());

    let (entered_tx, entered_rx) = unbounded::<()>();
    let (release_tx, release_rx) = unbounded::<()>();
    logger.set_filter(move |view, _| {
        if view.contains("block") {
            let _ = entered_tx.send(());
            let _ = release_rx.recv();
        }
        true
    });

    // Opened before the filter parks, dispatched while it is parked
    let ready = logger.open(AttributeSet::new().with("message", "ready")).into_owned();

    let blocked = {
        let logger = Arc::clone(&logger);
        thread::spawn(move || logger.open(AttributeSet::new().with("block", 1)).is_valid())
    };
    entered_rx
        .recv_timeout(Duration::from_secs(2))
        .expect("filter never ran");

    // A filter change now waits behind the parked filter
    let writer = {
        let logger = Arc::clone(&logger);
        thread::spawn(move || logger.set_filter(|_, _| true))
    };
    thread::sleep(Duration::from_millis(50));

    let (done_tx, done_rx) = bounded(1);
    let dispatcher = {
        let logger = Arc::clone(&logger);
        thread::spawn(move || {
            logger.add_frontend(MemoryFrontend::new());
            logger.push(ready);
            let _ = done_tx.send(logger.frontend_count());
        })
    };

    let outcome = done_rx.recv_timeout(Duration::from_secs(2));

    release_tx.send(()).expect("filter dropped");
    assert!(blocked.join().expect("opener panicked"));
    writer.join().expect("writer panicked");
    dispatcher.join().expect("dispatcher panicked");

    assert_eq!(outcome, Ok(2));
    assert_eq!(memory.len(), 1);
    assert_eq!(memory.records()[0].message(), Some("ready"));
}
