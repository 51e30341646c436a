// Rust guideline compliant 2026-02-06

//! Implementation of the `pipewatch config` command.
//!
//! Prints the effective reporter options as TOML.

use anyhow::Result;
use pipewatch_core::ReporterOptions;

/// Executes the config command.
///
/// # Arguments
///
/// * `options` - Options resolved from file, environment and flags
///
/// # Errors
///
/// Returns an error if the options cannot be serialized.
pub fn execute(options: &ReporterOptions) -> Result<()> {
    print!("{}", options.to_toml()?);
    Ok(())
}
