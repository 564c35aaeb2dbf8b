//! Small helpers used by the phiscan commands.

pub mod cleanup;
pub mod paths;
