// phiscan-core/src/lib.rs
//! # phiscan Core Library
//!
//! `phiscan-core` detects Protected Health Information (PHI) in free text,
//! typically OCR output of clinical documents. It combines two detectors:
//!
//! * a structured pattern detector (dates, SSNs, phone numbers, emails) whose
//!   matches are always trusted, and
//! * an optional statistical `EntityRecognizer` (names, addresses, gender)
//!   whose candidates are filtered by label, length, confidence threshold and
//!   per-label validators before they are accepted.
//!
//! Both streams are reconciled into one label-grouped report per document,
//! with a document-level `binary_phi` flag. Reports can be appended to a
//! JSON-lines sink.
//!
//! ## Modules
//!
//! * `config`: Pattern rules and engine settings, loaded from YAML.
//! * `patterns`: Compiles and caches pattern rules.
//! * `validators`: Shape checks for recognizer candidates.
//! * `entity`: PHI labels, entities, candidates and log redaction helpers.
//! * `engine`: The `EntityRecognizer` trait.
//! * `engines`: The structured detector and the built-in lexicon recognizer.
//! * `reconcile`: `PhiEngine`, which filters and merges detector output.
//! * `report`: Grouped and per-document report types.
//! * `sink`: Report persistence.
//! * `headless`: One-shot convenience wrappers.
//!
//! ## Usage Example
//!
//! ```rust
//! use phiscan_core::{DetectionConfig, headless_reconcile, HeadlessRecognizer, PhiLabel};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     let config = DetectionConfig::load_default_rules()?;
//!     let input = "DOB 01/02/1990, SSN 123-45-6789, seen by Dr. Alan Green.";
//!
//!     let report = headless_reconcile(&config, input, HeadlessRecognizer::Lexicon)?;
//!
//!     assert!(report.binary_phi());
//!     assert_eq!(report.get(PhiLabel::Ssn).unwrap()[0].text, "123-45-6789");
//!     println!("{}", serde_json::to_string_pretty(&report)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Fallible setup (config loading, rule compilation) returns `anyhow::Error`
//! or [`PhiscanError`]. Analysis itself never fails: a missing or failing
//! recognizer degrades a document to pattern-only detection.
//!
//! ---
//! License: MIT OR APACHE 2.0

pub mod config;
pub mod engine;
pub mod engines;
pub mod entity;
pub mod errors;
pub mod headless;
pub mod patterns;
pub mod reconcile;
pub mod report;
pub mod sink;
pub mod validators;

/// Re-exports the public configuration types and functions for managing pattern rules.
pub use config::{
    merge_rules,
    DetectionConfig,
    EngineSettings,
    OverlapPolicy,
    PatternRule,
    DEFAULT_THRESHOLD,
    MAX_PATTERN_LENGTH,
};

pub use errors::{PhiscanError, RecognizerError};

pub use entity::{redact_sensitive, Candidate, Entity, PhiLabel};

pub use engine::{EntityRecognizer, RecognizerHandle};
pub use engines::lexicon_engine::{LexiconConfig, LexiconRecognizer};
pub use engines::regex_engine::StructuredDetector;

pub use reconcile::{PhiEngine, Recognition};
pub use report::{DocumentReport, GroupedReport, LabelMap, RecognizerStatus, ReportEntry, StructuredResults};
pub use sink::{JsonlSink, ReportSink, ViolationRecord};

pub use headless::{headless_analyze, headless_reconcile, HeadlessRecognizer};

pub use patterns::compiler::{compile_rules, get_or_compile_rules, CompiledPattern, CompiledPatterns};
