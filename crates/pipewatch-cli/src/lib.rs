// Rust guideline compliant 2026-02-06

//! Pipewatch CLI library.
//!
//! This library exposes the CLI modules for use in tests and external code.

pub mod commands;
pub mod logging;

pub use commands::replay::{replay, ReplaySummary};
pub use logging::init_tracing;
