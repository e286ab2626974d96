//! Queued frontend running another frontend on a worker thread
//!
//! Records are copied into owned form before they enter the queue, so
//! nothing borrowed from the caller outlives the `push` call.

use crate::core::{FailureCause, Frontend, LoggerError, Record, Result};
use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender, TrySendError};
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

/// Default shutdown timeout for the worker (5 seconds)
///
/// Used when the frontend is dropped without an explicit `shutdown()`.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// What `handle` does when the queue is full
///
/// # Example
///
/// ```
/// use rust_attr_logger::frontends::QueuePolicy;
/// use std::time::Duration;
///
/// let policy = QueuePolicy::default();
/// assert_eq!(policy, QueuePolicy::DropNewest);
///
/// let policy = QueuePolicy::BlockWithTimeout(Duration::from_millis(100));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueuePolicy {
    /// Reject the incoming record with `QueueFull`
    #[default]
    DropNewest,

    /// Wait for space
    ///
    /// Warning: this applies backpressure to every thread that logs.
    Block,

    /// Wait up to the timeout, then reject with `QueueFull`
    BlockWithTimeout(Duration),
}

enum Command {
    Record(Record<'static>),
    Flush(Sender<Result<()>>),
}

pub struct AsyncFrontend {
    name: String,
    capacity: usize,
    policy: QueuePolicy,
    sender: Option<Sender<Command>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl AsyncFrontend {
    pub fn new<F: Frontend + 'static>(inner: F, capacity: usize) -> Self {
        Self::with_policy(inner, capacity, QueuePolicy::default())
    }

    pub fn with_policy<F: Frontend + 'static>(inner: F, capacity: usize, policy: QueuePolicy) -> Self {
        Self::from_boxed(Box::new(inner), capacity, policy)
    }

    /// Queue in front of an already boxed frontend
    ///
    /// A `capacity` of zero is raised to one; a zero-sized queue would
    /// reject every record under `DropNewest`.
    pub fn from_boxed(inner: Box<dyn Frontend>, capacity: usize, policy: QueuePolicy) -> Self {
        let capacity = capacity.max(1);
        let name = format!("async({})", inner.name());
        let (sender, receiver) = bounded(capacity);
        let worker_name = name.clone();
        let worker = thread::Builder::new()
            .name(format!("attr-logger-{}", inner.name()))
            .spawn(move || Self::run(inner, receiver, &worker_name))
            .map_err(|e| eprintln!("[LOGGER ERROR] Failed to spawn worker for {}: {}", name, e))
            .ok();

        Self {
            name,
            capacity,
            policy,
            sender: worker.as_ref().map(|_| sender),
            worker,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn run(inner: Box<dyn Frontend>, receiver: Receiver<Command>, name: &str) {
        for command in receiver.iter() {
            match command {
                Command::Record(record) => {
                    let outcome =
                        panic::catch_unwind(AssertUnwindSafe(|| inner.handle(&record)));
                    match outcome {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => {
                            eprintln!("[LOGGER ERROR] Queued frontend {} failed: {}", name, e)
                        }
                        Err(payload) => {
                            if let FailureCause::Panic(msg) = FailureCause::from_panic(payload) {
                                eprintln!(
                                    "[LOGGER CRITICAL] Queued frontend {} panicked: {}",
                                    name, msg
                                );
                            }
                        }
                    }
                }
                Command::Flush(reply) => {
                    let _ = reply.send(inner.flush());
                }
            }
        }

        // Channel closed: final flush before the worker exits
        if let Err(e) = inner.flush() {
            eprintln!("[LOGGER ERROR] Queued frontend {} flush failed: {}", name, e);
        }
    }

    fn sender(&self) -> Result<&Sender<Command>> {
        self.sender
            .as_ref()
            .ok_or_else(|| LoggerError::frontend_stopped(self.name.clone()))
    }

    /// Stop the worker after it drains the queue
    ///
    /// Returns `true` if the worker finished within `timeout`.
    pub fn shutdown(&mut self, timeout: Duration) -> bool {
        // Closing the channel lets the worker drain and exit
        drop(self.sender.take());

        let Some(handle) = self.worker.take() else {
            return true;
        };

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    eprintln!("[LOGGER ERROR] Worker for {} panicked during shutdown: {:?}", self.name, e);
                    return false;
                }
                return true;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Worker for {} did not finish within {:?}. \
                     Some records may be lost.",
                    self.name, timeout
                );
                return false;
            }

            // Small sleep to avoid busy-waiting
            thread::sleep(Duration::from_millis(10));
        }
    }
}

impl Frontend for AsyncFrontend {
    fn handle(&self, record: &Record<'_>) -> Result<()> {
        let sender = self.sender()?;
        let command = Command::Record(record.to_owned_record());

        match self.policy {
            QueuePolicy::DropNewest => sender.try_send(command).map_err(|e| match e {
                TrySendError::Full(_) => LoggerError::queue_full(self.capacity),
                TrySendError::Disconnected(_) => LoggerError::frontend_stopped(self.name.clone()),
            }),
            QueuePolicy::Block => sender
                .send(command)
                .map_err(|_| LoggerError::frontend_stopped(self.name.clone())),
            QueuePolicy::BlockWithTimeout(timeout) => {
                sender.send_timeout(command, timeout).map_err(|e| match e {
                    SendTimeoutError::Timeout(_) => LoggerError::queue_full(self.capacity),
                    SendTimeoutError::Disconnected(_) => {
                        LoggerError::frontend_stopped(self.name.clone())
                    }
                })
            }
        }
    }

    /// Wait until every record queued so far reached the inner frontend, then flush it
    fn flush(&self) -> Result<()> {
        let (reply, response) = bounded(1);
        self.sender()?
            .send_timeout(Command::Flush(reply), DEFAULT_SHUTDOWN_TIMEOUT)
            .map_err(|_| LoggerError::writer(format!("{}: flush request not accepted", self.name)))?;
        response
            .recv_timeout(DEFAULT_SHUTDOWN_TIMEOUT)
            .map_err(|_| LoggerError::writer(format!("{}: flush timed out", self.name)))?
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for AsyncFrontend {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    }
}
