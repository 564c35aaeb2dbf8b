// phiscan-core/src/sink.rs
//! Report sinks: where per-document reports are persisted.
//!
//! The default sink appends one JSON object per line to a log file. Each
//! record is written with a single `write_all` while holding the sink's lock,
//! so concurrent workers never interleave partial lines.
//!
//! License: MIT OR APACHE 2.0

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::debug;
use serde::Serialize;

use crate::errors::PhiscanError;
use crate::report::DocumentReport;

/// One persisted line: the document name followed by its report fields.
#[derive(Debug, Serialize)]
pub struct ViolationRecord<'a> {
    pub document: &'a str,
    #[serde(flatten)]
    pub report: &'a DocumentReport,
}

impl<'a> ViolationRecord<'a> {
    pub fn new(document: &'a str, report: &'a DocumentReport) -> Self {
        Self { document, report }
    }
}

/// Destination for per-document reports.
pub trait ReportSink: Send + Sync {
    /// Persists the report for `document`. Either the whole record is written
    /// or an error is returned.
    fn append(&self, document: &str, report: &DocumentReport) -> Result<(), PhiscanError>;
}

/// Appends reports as JSON lines to a file.
#[derive(Debug)]
pub struct JsonlSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlSink {
    /// Creates the sink, creating the parent directory if needed. The file
    /// itself is opened on each append.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, PhiscanError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        debug!("JsonlSink writing to {}", path.display());
        Ok(Self { path, write_lock: Mutex::new(()) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for JsonlSink {
    fn append(&self, document: &str, report: &DocumentReport) -> Result<(), PhiscanError> {
        let failure = |e: String| PhiscanError::SinkWriteFailure(document.to_string(), e);

        let mut line = serde_json::to_string(&ViolationRecord::new(document, report))
            .map_err(|e| failure(e.to_string()))?;
        line.push('\n');

        let _guard = self.write_lock.lock().map_err(|_| failure("sink lock poisoned".to_string()))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| failure(e.to_string()))?;
        file.write_all(line.as_bytes()).map_err(|e| failure(e.to_string()))?;
        file.flush().map_err(|e| failure(e.to_string()))?;

        debug!("Appended report for '{}' to {}", document, self.path.display());
        Ok(())
    }
}
