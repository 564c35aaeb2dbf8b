// phiscan-core/src/engine.rs
//! Defines the `EntityRecognizer` trait, the seam between the reconciliation
//! engine and any statistical entity recognizer.
//!
//! A recognizer proposes scored `(text, label)` candidates. Those candidates are
//! never trusted as-is: the reconciliation engine filters them by label,
//! length, threshold and per-label validators before they reach a report.
//!
//! License: MIT OR APACHE 2.0

use std::sync::Arc;

use crate::entity::Candidate;
use crate::errors::RecognizerError;

/// A statistical recognizer that proposes PHI candidates for a text.
///
/// Implementations must be shareable across worker threads; the batch driver
/// hands one instance to every worker.
pub trait EntityRecognizer: Send + Sync {
    /// A short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Proposes candidates for `text`.
    ///
    /// Candidate labels may be anything the recognizer emits; labels outside the
    /// PHI label set are discarded downstream. An `Err` makes the caller fall
    /// back to pattern-only detection for this text.
    fn detect(&self, text: &str) -> Result<Vec<Candidate>, RecognizerError>;
}

/// An optional, shared recognizer. `None` means pattern-only detection.
pub type RecognizerHandle = Option<Arc<dyn EntityRecognizer>>;
