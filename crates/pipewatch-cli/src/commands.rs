// Rust guideline compliant 2026-02-06

//! Command implementations for the Pipewatch CLI.

pub mod config;
pub mod replay;
