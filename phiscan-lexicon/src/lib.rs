#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod tokens;
pub mod gazetteer;
pub mod context;
pub mod scoring;
pub mod engine;

pub use engine::{EntityKind, LexiconEngine, LexiconMatch};
pub use gazetteer::{Gazetteer, Lexicon, LexiconError};

/// Common type definitions
pub type Confidence = f64;
