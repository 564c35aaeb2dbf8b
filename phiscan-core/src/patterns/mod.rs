//! Structured pattern rule handling.
//!
//! This module is responsible for compiling the configured pattern rules into
//! regular expressions, each tagged with the PHI label its matches are
//! reported under. Matching itself lives in `engines::regex_engine`.

pub mod compiler;
