//! JSON frontend for structured logging

use crate::core::{Frontend, LoggerError, Record, Result};
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

/// JSON Lines frontend
///
/// Writes each record as a single-line JSON object: internal attributes
/// first, then external ones, in order. Duplicate names are written twice.
/// Compatible with log aggregation tools like ELK, Loki, etc.
pub struct JsonFrontend {
    writer: Mutex<Box<dyn Write + Send>>,
    pretty: bool,
}

impl JsonFrontend {
    /// Append to the file at `path`, creating it if needed
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::io_operation(
                    "opening json log",
                    format!("cannot open '{}'", path.display()),
                    e,
                )
            })?;
        Ok(Self::from_writer(BufWriter::new(file)))
    }

    pub fn stdout() -> Self {
        Self::from_writer(std::io::stdout())
    }

    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            pretty: false,
        }
    }

    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Frontend for JsonFrontend {
    fn handle(&self, record: &Record<'_>) -> Result<()> {
        let json = if self.pretty {
            serde_json::to_string_pretty(record)?
        } else {
            serde_json::to_string(record)?
        };

        let mut writer = self.writer.lock();
        writeln!(writer, "{}", json)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "json"
    }
}

impl Drop for JsonFrontend {
    fn drop(&mut self) {
        // Ensure all buffered data is written out
        let _ = self.writer.get_mut().flush();
    }
}
