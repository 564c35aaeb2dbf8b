// phiscan-core/src/engines/mod.rs
//! Detector implementations.
//!
//! * `regex_engine`: the structured pattern detector. Always on, always trusted.
//! * `lexicon_engine`: the built-in `EntityRecognizer`, backed by `phiscan-lexicon`.
//!
//! Other recognizers plug in by implementing `EntityRecognizer`; they need no
//! module here.

pub mod regex_engine;
pub mod lexicon_engine;
