// Rust guideline compliant 2026-02-06

//! Simulated pipeline used to drive the reporter in integration tests.
//!
//! Mirrors how a pipeline runtime delivers events: rows flow from each
//! stream through every destination's record generator into batches, each
//! batch goes through the destination's batch transformer, and every step is
//! announced on the event bus.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use pipewatch_core::{EventBus, JobOutcome, ManualClock, PipelineEvent};
use serde_json::Value;

/// Batch transformer: accepts or rejects a whole batch.
pub type BatchTransformer = Box<dyn Fn(&[Value]) -> Result<Vec<Value>, String>>;

/// Record generator: expands one row into zero or more records.
pub type RecordGenerator = Box<dyn Fn(&Value) -> Result<Vec<Value>, String>>;

/// Fixed start instant for deterministic timestamps.
pub fn start_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Timestamp prefix rendered for [`start_time`].
pub const START_STAMP: &str = "[2024-01-01 00:00:00.000]";

/// One step of a simulated stream.
pub enum Step {
    /// Emit a row.
    Row(Value),
    /// Emit stream metadata.
    Info(Value),
    /// Fail the stream with a message; later steps are skipped.
    Fail(String),
    /// Advance the clock.
    Wait(i64),
}

/// Simulated destination.
pub struct SimDestination {
    batch_size: usize,
    batch_transformer: Option<BatchTransformer>,
    record_generator: Option<RecordGenerator>,
    reject_all: Option<String>,
}

impl SimDestination {
    /// Destination accepting everything in one batch per stream.
    pub fn dummy() -> Self {
        Self {
            batch_size: usize::MAX,
            batch_transformer: None,
            record_generator: None,
            reject_all: None,
        }
    }

    /// Destination whose loader rejects every batch.
    pub fn faulty(message: &str) -> Self {
        Self {
            reject_all: Some(message.to_string()),
            ..Self::dummy()
        }
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Sets the batch transformer.
    pub fn transformer(
        mut self,
        f: impl Fn(&[Value]) -> Result<Vec<Value>, String> + 'static,
    ) -> Self {
        self.batch_transformer = Some(Box::new(f));
        self
    }

    /// Sets the record generator.
    pub fn generator(mut self, f: impl Fn(&Value) -> Result<Vec<Value>, String> + 'static) -> Self {
        self.record_generator = Some(Box::new(f));
        self
    }
}

/// Simulated job: one processor with one or more streams, and destinations.
pub struct SimJob {
    name: Option<String>,
    streams: Vec<Vec<Step>>,
    destinations: Vec<SimDestination>,
    clock: ManualClock,
}

impl SimJob {
    /// Creates a job driven by `clock`.
    pub fn new(clock: ManualClock) -> Self {
        Self {
            name: None,
            streams: Vec::new(),
            destinations: Vec::new(),
            clock,
        }
    }

    /// Sets a custom job name.
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Adds a stream.
    pub fn stream(mut self, steps: Vec<Step>) -> Self {
        self.streams.push(steps);
        self
    }

    /// Adds a destination.
    pub fn destination(mut self, destination: SimDestination) -> Self {
        self.destinations.push(destination);
        self
    }

    /// Runs the job, delivering every event on `bus`.
    pub fn run(&self, bus: &mut EventBus) {
        bus.emit(&PipelineEvent::job_started(self.name.as_deref()));

        for (stream, steps) in self.streams.iter().enumerate() {
            bus.emit(&PipelineEvent::stream_started(stream));
            let mut buffers: Vec<Vec<Value>> = vec![Vec::new(); self.destinations.len()];

            for step in steps {
                match step {
                    Step::Row(row) => {
                        bus.emit(&PipelineEvent::stream_data(stream, row.clone()));
                        for (idx, destination) in self.destinations.iter().enumerate() {
                            self.accept_row(bus, stream, idx, destination, row, &mut buffers[idx]);
                        }
                    }
                    Step::Info(info) => {
                        bus.emit(&PipelineEvent::stream_info(stream, info.clone()));
                    }
                    Step::Fail(message) => {
                        bus.emit(&PipelineEvent::stream_failed(stream, message.clone()));
                        break;
                    }
                    Step::Wait(ms) => self.clock.advance_ms(*ms),
                }
            }

            for (idx, destination) in self.destinations.iter().enumerate() {
                let rest = std::mem::take(&mut buffers[idx]);
                if !rest.is_empty() {
                    self.load(bus, stream, idx, destination, rest);
                }
                bus.emit(&PipelineEvent::destination_finished(stream, idx));
            }
            bus.emit(&PipelineEvent::stream_finished(stream));
        }

        bus.emit(&PipelineEvent::job_finished(JobOutcome::Completed));
    }

    fn accept_row(
        &self,
        bus: &mut EventBus,
        stream: usize,
        idx: usize,
        destination: &SimDestination,
        row: &Value,
        buffer: &mut Vec<Value>,
    ) {
        let records = match &destination.record_generator {
            Some(generate) => match generate(row) {
                Ok(records) => {
                    for _ in &records {
                        bus.emit(&PipelineEvent::record_succeeded(stream, idx, row.clone()));
                    }
                    records
                }
                Err(message) => {
                    bus.emit(&PipelineEvent::record_failed(stream, idx, row.clone(), message));
                    Vec::new()
                }
            },
            None => vec![row.clone()],
        };
        buffer.extend(records);
        if buffer.len() >= destination.batch_size {
            let batch = std::mem::take(buffer);
            self.load(bus, stream, idx, destination, batch);
        }
    }

    fn load(
        &self,
        bus: &mut EventBus,
        stream: usize,
        idx: usize,
        destination: &SimDestination,
        rows: Vec<Value>,
    ) {
        bus.emit(&PipelineEvent::batch_started(stream, idx, rows.clone()));
        let transformed = match &destination.batch_transformer {
            Some(transform) => transform(&rows),
            None => Ok(rows.clone()),
        };
        let result = match (&destination.reject_all, transformed) {
            (Some(message), _) => Err(message.clone()),
            (None, result) => result,
        };
        match result {
            Ok(loaded) => bus.emit(&PipelineEvent::batch_succeeded(stream, idx, loaded)),
            Err(message) => bus.emit(&PipelineEvent::batch_failed(stream, idx, rows, message)),
        };
    }
}
