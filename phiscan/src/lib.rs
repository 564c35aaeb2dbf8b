// phiscan/src/lib.rs
//! # phiscan CLI
//!
//! Command-line front end for the `phiscan-core` PHI engine. `scan` analyses
//! one document, `batch` analyses a directory concurrently and appends each
//! report to a JSON-lines violations log, and `rules` lists the pattern rules
//! in effect.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;
pub mod utils;
