//! errors.rs - Custom error types for the phiscan-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `phiscan-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PhiscanError {
    #[error("Failed to compile pattern rule '{0}': {1}")]
    RuleCompilationError(String, regex::Error),

    #[error("Rule '{0}': pattern length ({1}) exceeds maximum allowed ({2})")]
    PatternLengthExceeded(String, usize, usize),

    #[error("Rule '{0}': label '{1}' is not a known PHI label")]
    InvalidRuleLabel(String, String),

    #[error("Confidence threshold {0} is outside [0.0, 1.0]")]
    InvalidThreshold(f64),

    #[error("Statistical recognizer unavailable: {0}")]
    RecognizerUnavailable(String),

    #[error("Failed to write report for document '{0}': {1}")]
    SinkWriteFailure(String, String),

    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("A fatal error occurred: {0}")]
    Fatal(String),
}

/// Errors a statistical recognizer may return from a single `detect` call.
///
/// Any of these degrades the document to pattern-only detection; none of them
/// aborts the analysis.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum RecognizerError {
    #[error("recognizer '{0}' failed: {1}")]
    Failed(String, String),
}
