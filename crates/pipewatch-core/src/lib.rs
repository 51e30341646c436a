// Rust guideline compliant 2026-02-06

//! Pipewatch Core Library
//!
//! This crate provides the console progress reporter for data-pipeline jobs:
//! - Event contract (job, stream and destination lifecycle events)
//! - Formatting helpers (durations, timestamps, bounded row rendering)
//! - Progress state (per-stream and per-destination counters, error lists)
//! - Rendering (indented, interval-gated console output and final verdict)
//! - Event binding (fire-and-forget forwarding that never fails the job)

pub mod bus;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod format;
pub mod render;
pub mod reporter;
pub mod sink;
pub mod state;

pub use bus::EventBus;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::ReporterOptions;
pub use error::{Error, Result};
pub use event::{EventKind, JobOutcome, PipelineEvent};
pub use render::{Phase, Renderer};
pub use reporter::Reporter;
pub use sink::{MemorySink, OutputSink, StdoutSink, WriterSink};
pub use state::{ErrorSource, JobStatus, ProgressState, RecordedError};
