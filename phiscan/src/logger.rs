// phiscan/src/logger.rs
//! Logger initialization for the phiscan CLI.
//!
//! Log lines go to stderr as `[LEVEL target] message` so that stdout carries
//! only reports. `RUST_LOG` is honoured unless a level is forced by a flag.

use env_logger::{Builder, Env, Target};
use log::LevelFilter;
use std::io::Write;

/// Initializes the global logger.
///
/// `level_override` wins over `RUST_LOG`; with `None`, `RUST_LOG` decides and
/// defaults to `warn`. Calling this twice is harmless; the second call is ignored.
pub fn init_logger(level_override: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));

    if let Some(level) = level_override {
        builder.filter_level(level);
    }

    builder
        .target(Target::Stderr)
        .format(|buf, record| {
            writeln!(buf, "[{} {}] {}", record.level(), record.target(), record.args())
        });

    let _ = builder.try_init();
}

/// Maps the global `--quiet` / `--debug` flags to a level override.
pub fn level_from_flags(quiet: bool, debug: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Off)
    } else if debug {
        Some(LevelFilter::Debug)
    } else {
        None
    }
}
