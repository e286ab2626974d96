//! In-memory frontend
//!
//! Keeps owned copies of every record it handles. Clones share the same
//! buffer, so a test can keep one handle and give another to the logger.

use crate::core::{Frontend, Record, Result};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct MemoryFrontend {
    records: Arc<Mutex<Vec<Record<'static>>>>,
}

impl MemoryFrontend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured records
    pub fn records(&self) -> Vec<Record<'static>> {
        self.records.lock().clone()
    }

    /// Remove and return every captured record
    pub fn drain(&self) -> Vec<Record<'static>> {
        std::mem::take(&mut *self.records.lock())
    }

    /// `message` attribute of each captured record that has one
    pub fn messages(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .filter_map(|record| record.message().map(str::to_owned))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl Frontend for MemoryFrontend {
    fn handle(&self, record: &Record<'_>) -> Result<()> {
        let owned = record.to_owned_record();
        self.records.lock().push(owned);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
