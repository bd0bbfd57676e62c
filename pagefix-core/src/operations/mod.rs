//! High-level operations that correspond to CLI invocations
//!
//! These modules contain the core logic of a run, separated from CLI
//! concerns like argument parsing and exit codes.

pub mod fix;

pub use fix::{fix_operation, FixOptions};
