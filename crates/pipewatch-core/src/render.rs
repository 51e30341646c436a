// Rust guideline compliant 2026-02-06

//! Indentation-aware console rendering.
//!
//! The renderer decides *when* a line is written (immediately, or only once
//! the progress interval has elapsed), *what* it says (per-row detail in
//! verbose mode, counts otherwise) and keeps the job → stream → destination
//! groups balanced. Lifecycle states:
//!
//! - NotStarted → Running (job start)
//! - Running → Succeeded | Failed (job end)
//! - Succeeded | Failed → Running (a new job start on the same reporter)
//!
//! Start, end and error lines are always written. Progress lines (rows,
//! accepted batches, generated records) are dropped while the interval gate
//! is closed.

use crate::config::ReporterOptions;
use crate::event::JobOutcome;
use crate::format::{
    format_duration, format_row, format_rows, format_timestamp, pluralize, summarize,
};
use crate::sink::OutputSink;
use crate::state::{DestinationOutcome, JobStatus, ProgressState, StreamProgress};
use crate::Result;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeSet;

/// Depth of job-level lines.
const JOB_DEPTH: usize = 0;
/// Depth of stream-level lines.
const STREAM_DEPTH: usize = 1;
/// Depth of destination-level lines and stream details.
const DESTINATION_DEPTH: usize = 2;
/// Depth of batch and record lines.
const DETAIL_DEPTH: usize = 3;

/// Lifecycle phase of the rendered job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No job start seen yet.
    #[default]
    NotStarted,
    /// Between job start and job end.
    Running,
    /// Ended with no recorded error.
    Succeeded,
    /// Ended with at least one recorded error.
    Failed,
}

impl Phase {
    /// Whether the job has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Succeeded | Phase::Failed)
    }
}

/// Writes the job log to an [`OutputSink`].
pub struct Renderer {
    options: ReporterOptions,
    sink: Box<dyn OutputSink>,
    phase: Phase,
    last_emit: Option<DateTime<Utc>>,
    open_streams: BTreeSet<usize>,
    open_destinations: BTreeSet<(usize, usize)>,
}

impl Renderer {
    /// Creates a renderer writing to `sink`.
    pub fn new(options: ReporterOptions, sink: Box<dyn OutputSink>) -> Self {
        Self {
            options,
            sink,
            phase: Phase::NotStarted,
            last_emit: None,
            open_streams: BTreeSet::new(),
            open_destinations: BTreeSet::new(),
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Options the renderer was built with.
    pub fn options(&self) -> &ReporterOptions {
        &self.options
    }

    /// Number of groups currently open (job, streams, destinations).
    pub fn open_groups(&self) -> usize {
        let job = usize::from(self.phase == Phase::Running);
        job + self.open_streams.len() + self.open_destinations.len()
    }

    /// Opens the job group.
    pub fn job_started(&mut self, job_name: &str, now: DateTime<Utc>) -> Result<()> {
        self.phase = Phase::Running;
        self.last_emit = None;
        self.open_streams.clear();
        self.open_destinations.clear();
        self.stamped(JOB_DEPTH, now, &format!("Job \"{}\" started", job_name))
    }

    /// Opens a stream group if it is not open yet.
    pub fn stream_started(&mut self, stream: usize, now: DateTime<Utc>) -> Result<()> {
        if !self.open_streams.insert(stream) {
            return Ok(());
        }
        self.stamped(STREAM_DEPTH, now, &format!("Stream #{} started", stream))
    }

    /// Renders one emitted row as a progress line.
    pub fn stream_row(
        &mut self,
        stream: usize,
        row: &Value,
        count: usize,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.stream_started(stream, now)?;
        if !self.gate_open(now) {
            return Ok(());
        }
        let line = if self.options.verbose {
            format!("Stream #{} row {}: {}", stream, count, format_row(row))
        } else {
            format!(
                "Stream #{}: {} processed",
                stream,
                pluralize(count, "row", "rows")
            )
        };
        self.stamped(DESTINATION_DEPTH, now, &line)
    }

    /// Renders stream metadata.
    pub fn stream_info(&mut self, stream: usize, info: &Value, now: DateTime<Utc>) -> Result<()> {
        self.stream_started(stream, now)?;
        self.stamped(
            DESTINATION_DEPTH,
            now,
            &format!("Stream #{} info: {}", stream, format_row(info)),
        )
    }

    /// Renders a processor error inside the stream group.
    pub fn stream_failed(&mut self, stream: usize, error: &str, now: DateTime<Utc>) -> Result<()> {
        self.stream_started(stream, now)?;
        self.stamped(
            DESTINATION_DEPTH,
            now,
            &format!("Stream #{} failed: {}", stream, error),
        )
    }

    /// Closes a stream group, closing its destination groups first.
    pub fn stream_finished(
        &mut self,
        stream: usize,
        progress: Option<&StreamProgress>,
        state: &ProgressState,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if !self.open_streams.remove(&stream) {
            tracing::debug!(stream, "stream finished without an open group");
        }
        self.close_destinations_of(stream, state, now)?;

        let rows = progress.map(|p| p.rows).unwrap_or(0);
        let mut line = format!(
            "Stream #{} finished: {} processed",
            stream,
            pluralize(rows, "row", "rows")
        );
        if progress.is_some_and(|p| p.failed) {
            line.push_str(" (with errors)");
        }
        self.stamped(STREAM_DEPTH, now, &line)?;

        if self.options.verbose {
            if let Some(progress) = progress.filter(|p| !p.sample.is_empty()) {
                let rows = summarize(&progress.sample, progress.rows);
                self.plain(DESTINATION_DEPTH, &format!("Rows: {}", rows))?;
            }
        }
        Ok(())
    }

    /// Opens a destination group if needed and renders the batch start.
    pub fn batch_started(
        &mut self,
        stream: usize,
        destination: usize,
        rows: &[Value],
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.destination_started(stream, destination, now)?;
        if !self.gate_open(now) {
            return Ok(());
        }
        let mut line = format!(
            "{} loading batch of {}",
            destination_label(stream, destination),
            pluralize(rows.len(), "row", "rows")
        );
        if self.options.verbose && !rows.is_empty() {
            line.push_str(&format!(": {}", format_rows(rows)));
        }
        self.stamped(DETAIL_DEPTH, now, &line)
    }

    /// Renders an accepted batch as a progress line.
    ///
    /// `outcome` holds the counters of this stream's feed into the
    /// destination.
    pub fn batch_succeeded(
        &mut self,
        stream: usize,
        destination: usize,
        rows: &[Value],
        outcome: &DestinationOutcome,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.destination_started(stream, destination, now)?;
        if !self.gate_open(now) {
            return Ok(());
        }
        let mut line = format!(
            "{}: {} processed",
            destination_label(stream, destination),
            pluralize(outcome.batches_processed, "batch", "batches")
        );
        if self.options.verbose && !rows.is_empty() {
            line.push_str(&format!(" (last: {})", format_rows(rows)));
        }
        self.stamped(DETAIL_DEPTH, now, &line)
    }

    /// Renders a rejected batch.
    pub fn batch_failed(
        &mut self,
        stream: usize,
        destination: usize,
        rows: &[Value],
        error: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.destination_started(stream, destination, now)?;
        let mut line = format!(
            "{} batch failed: {}",
            destination_label(stream, destination),
            error
        );
        if self.options.verbose && !rows.is_empty() {
            line.push_str(&format!(" (rows: {})", format_rows(rows)));
        }
        self.stamped(DETAIL_DEPTH, now, &line)
    }

    /// Renders a generated record as a progress line.
    pub fn record_succeeded(
        &mut self,
        stream: usize,
        destination: usize,
        row: &Value,
        outcome: &DestinationOutcome,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.destination_started(stream, destination, now)?;
        if !self.gate_open(now) {
            return Ok(());
        }
        let line = if self.options.verbose {
            format!(
                "{} generated record from {}",
                destination_label(stream, destination),
                format_row(row)
            )
        } else {
            format!(
                "{}: {} generated",
                destination_label(stream, destination),
                pluralize(outcome.records_generated, "record", "records")
            )
        };
        self.stamped(DETAIL_DEPTH, now, &line)
    }

    /// Renders a failed record generation.
    pub fn record_failed(
        &mut self,
        stream: usize,
        destination: usize,
        row: &Value,
        error: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.destination_started(stream, destination, now)?;
        self.stamped(
            DETAIL_DEPTH,
            now,
            &format!(
                "{} record generation failed for {}: {}",
                destination_label(stream, destination),
                format_row(row),
                error
            ),
        )
    }

    /// Closes a destination group with its summary line.
    ///
    /// A destination that never opened a group in this stream writes
    /// nothing.
    pub fn destination_finished(
        &mut self,
        stream: usize,
        destination: usize,
        outcome: Option<&DestinationOutcome>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if !self.open_destinations.remove(&(stream, destination)) {
            tracing::debug!(stream, destination, "destination finished without an open group");
            return Ok(());
        }
        self.destination_summary(stream, destination, outcome, now)
    }

    /// Closes every open group and writes the final status block.
    pub fn job_finished(
        &mut self,
        state: &ProgressState,
        outcome: &JobOutcome,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let status = state.status();
        self.phase = match status {
            JobStatus::Success => Phase::Succeeded,
            JobStatus::Failed => Phase::Failed,
        };
        let streams = std::mem::take(&mut self.open_streams);
        let destinations = std::mem::take(&mut self.open_destinations);

        for stream in streams {
            for &(_, destination) in destinations.iter().filter(|(s, _)| *s == stream) {
                self.destination_summary(stream, destination, state.feed(stream, destination), now)?;
            }
            self.stamped(
                STREAM_DEPTH,
                now,
                &format!("Stream #{} closed before finishing", stream),
            )?;
        }

        let job_name = state
            .job_name()
            .unwrap_or(self.options.default_job_name.as_str())
            .to_string();

        let elapsed = format_duration(state.elapsed(now));
        let headline = match outcome {
            JobOutcome::Completed => format!("Job \"{}\" finished in {}", job_name, elapsed),
            JobOutcome::Failed { error } => {
                format!("Job \"{}\" aborted after {}: {}", job_name, elapsed, error)
            }
            JobOutcome::Cancelled => format!("Job \"{}\" cancelled after {}", job_name, elapsed),
        };
        self.stamped(JOB_DEPTH, now, &headline)?;
        self.summary(state)?;

        let verdict = match status {
            JobStatus::Success => format!("PASS: job \"{}\" completed with success", job_name),
            JobStatus::Failed => format!(
                "FAIL: job \"{}\" failed with {}",
                job_name,
                pluralize(state.errors().len(), "error", "errors")
            ),
        };
        self.plain(JOB_DEPTH, &verdict)
    }

    fn summary(&mut self, state: &ProgressState) -> Result<()> {
        self.plain(
            STREAM_DEPTH,
            &format!("Rows processed: {}", state.total_rows()),
        )?;
        self.plain(
            STREAM_DEPTH,
            &format!("Streams: {}", state.streams_started()),
        )?;
        let destinations: Vec<String> = state
            .destinations()
            .map(|(idx, outcome)| format!("Destination #{}: {}", idx, describe_destination(outcome)))
            .collect();
        for line in destinations {
            self.plain(STREAM_DEPTH, &line)?;
        }

        let errors = state.errors();
        if !errors.is_empty() {
            self.plain(STREAM_DEPTH, &format!("Errors ({}):", errors.len()))?;
            for (idx, error) in errors.iter().enumerate() {
                self.plain(
                    DESTINATION_DEPTH,
                    &format!("{}. [{}] {}", idx + 1, error.source, error.message),
                )?;
            }
        }
        Ok(())
    }

    fn destination_started(
        &mut self,
        stream: usize,
        destination: usize,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.stream_started(stream, now)?;
        if !self.open_destinations.insert((stream, destination)) {
            return Ok(());
        }
        self.stamped(
            DESTINATION_DEPTH,
            now,
            &format!("{} started", destination_label(stream, destination)),
        )
    }

    fn destination_summary(
        &mut self,
        stream: usize,
        destination: usize,
        outcome: Option<&DestinationOutcome>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let summary = match outcome {
            Some(outcome) => describe_destination(outcome),
            None => describe_destination(&DestinationOutcome::default()),
        };
        self.stamped(
            DESTINATION_DEPTH,
            now,
            &format!(
                "{} finished: {}",
                destination_label(stream, destination),
                summary
            ),
        )
    }

    fn close_destinations_of(
        &mut self,
        stream: usize,
        state: &ProgressState,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let open: Vec<usize> = self
            .open_destinations
            .iter()
            .filter(|(s, _)| *s == stream)
            .map(|(_, d)| *d)
            .collect();
        // Close every group before writing, so a failing sink cannot leave
        // groups open.
        for destination in &open {
            self.open_destinations.remove(&(stream, *destination));
        }
        for destination in open {
            self.destination_summary(stream, destination, state.feed(stream, destination), now)?;
        }
        Ok(())
    }

    /// Interval gate for progress lines; records the emission when open.
    fn gate_open(&mut self, now: DateTime<Utc>) -> bool {
        if !self.options.is_throttled() {
            return true;
        }
        let interval = i64::try_from(self.options.interval_ms).unwrap_or(i64::MAX);
        let open = match self.last_emit {
            None => true,
            Some(last) => (now - last).num_milliseconds() >= interval,
        };
        if open {
            self.last_emit = Some(now);
        }
        open
    }

    fn stamped(&mut self, depth: usize, now: DateTime<Utc>, text: &str) -> Result<()> {
        let line = format!("[{}] {}", format_timestamp(now), text);
        self.plain(depth, &line)
    }

    fn plain(&mut self, depth: usize, text: &str) -> Result<()> {
        self.sink.write_line(depth, text)?;
        Ok(())
    }
}

/// Label of one stream's feed into a destination.
fn destination_label(stream: usize, destination: usize) -> String {
    format!("Stream #{} / Destination #{}", stream, destination)
}

/// One-line summary of a destination's counters.
fn describe_destination(outcome: &DestinationOutcome) -> String {
    let mut text = format!(
        "{} processed, {} failed",
        pluralize(outcome.batches_processed, "batch", "batches"),
        outcome.batches_failed
    );
    if outcome.records_generated > 0 || outcome.records_failed > 0 {
        text.push_str(&format!(
            "; {} generated, {} failed",
            pluralize(outcome.records_generated, "record", "records"),
            outcome.records_failed
        ));
    }
    text
}
