//! Frontend implementations

pub mod async_frontend;
#[cfg(feature = "console")]
pub mod console;
pub mod json;
pub mod memory;

pub use async_frontend::{AsyncFrontend, QueuePolicy, DEFAULT_SHUTDOWN_TIMEOUT};
#[cfg(feature = "console")]
pub use console::ConsoleFrontend;
pub use json::JsonFrontend;
pub use memory::MemoryFrontend;
