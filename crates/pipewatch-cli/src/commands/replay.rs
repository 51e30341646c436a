// Rust guideline compliant 2026-02-06

//! Implementation of the `pipewatch replay` command.
//!
//! Replays a recorded JSONL event log through the reporter. Each line is one
//! pipeline event, optionally carrying `offset_ms`, the milliseconds since
//! the recording started:
//!
//! ```text
//! {"offset_ms": 0, "event": "job_started", "job_name": "orders"}
//! {"offset_ms": 12, "event": "stream_data", "stream": 0, "row": {"id": 1}}
//! ```

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use pipewatch_core::{
    EventBus, JobOutcome, ManualClock, PipelineEvent, Reporter, ReporterOptions, StdoutSink,
};
use serde_json::Value;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Field carrying the replay offset.
const OFFSET_FIELD: &str = "offset_ms";

/// Counts gathered while replaying a log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Events delivered to the reporter.
    pub events: usize,
    /// Lines skipped because they could not be parsed.
    pub skipped: usize,
    /// Whether the log ended without a job end and one was synthesized.
    pub synthesized_end: bool,
}

/// Executes the replay command.
///
/// # Arguments
///
/// * `input` - Path to the JSONL log, or `-` for stdin
/// * `options` - Reporter options
///
/// # Returns
///
/// Ok once the whole log was rendered.
///
/// # Errors
///
/// Returns an error if:
/// - The log file does not exist or cannot be read
pub fn execute(input: &str, options: ReporterOptions) -> Result<()> {
    let start = Utc::now();
    let clock = ManualClock::new(start);
    let reporter = Reporter::with_parts(options, StdoutSink, clock.clone());

    let summary = if input == "-" {
        replay(io::stdin().lock(), &reporter, &clock, start)?
    } else {
        let path = Path::new(input);
        if !path.exists() {
            anyhow::bail!("Event log not found: {}", path.display());
        }
        replay(BufReader::new(File::open(path)?), &reporter, &clock, start)?
    };

    if summary.skipped > 0 {
        eprintln!("Skipped {} malformed line(s)", summary.skipped);
    }
    tracing::info!(
        events = summary.events,
        skipped = summary.skipped,
        synthesized_end = summary.synthesized_end,
        "replay finished"
    );
    Ok(())
}

/// Feeds every event of a JSONL log to `reporter`.
///
/// Blank lines are ignored and malformed lines are reported on stderr and
/// skipped. When the log stops inside a running job, a cancelled job end is
/// delivered so every open group closes.
///
/// # Arguments
///
/// * `input` - JSONL reader
/// * `reporter` - Reporter receiving the events
/// * `clock` - Clock the reporter reads; moved to `start + offset_ms`
/// * `start` - Instant corresponding to offset zero
///
/// # Errors
///
/// Returns an error if reading from `input` fails.
pub fn replay<R: BufRead>(
    input: R,
    reporter: &Reporter,
    clock: &ManualClock,
    start: DateTime<Utc>,
) -> Result<ReplaySummary> {
    let mut bus = EventBus::new();
    reporter.attach(&mut bus);

    let mut summary = ReplaySummary::default();
    let mut job_open = false;

    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let (offset, event) = match parse_line(&line) {
            Ok(parsed) => parsed,
            Err(err) => {
                summary.skipped += 1;
                eprintln!("Warning: Skipping invalid event on line {}: {}", idx + 1, err);
                continue;
            }
        };

        if let Some(offset) = offset {
            let Some(at) = offset_time(start, &offset) else {
                summary.skipped += 1;
                eprintln!(
                    "Warning: Skipping invalid event on line {}: {} out of range: {}",
                    idx + 1,
                    OFFSET_FIELD,
                    offset
                );
                continue;
            };
            clock.set(at);
        }
        match &event {
            PipelineEvent::JobFinished(_) => job_open = false,
            _ => job_open = true,
        }
        bus.emit(&event);
        summary.events += 1;
    }

    if job_open {
        tracing::debug!("event log ended inside a running job");
        bus.emit(&PipelineEvent::job_finished(JobOutcome::Cancelled));
        summary.synthesized_end = true;
    }

    Ok(summary)
}

/// Splits a log line into its optional offset and the event.
fn parse_line(line: &str) -> pipewatch_core::Result<(Option<Value>, PipelineEvent)> {
    let mut value: Value = serde_json::from_str(line)?;
    let offset = value
        .as_object_mut()
        .and_then(|map| map.remove(OFFSET_FIELD));
    let event = serde_json::from_value(value)?;
    Ok((offset, event))
}

/// Instant `offset` milliseconds after `start`, if representable.
fn offset_time(start: DateTime<Utc>, offset: &Value) -> Option<DateTime<Utc>> {
    let offset = Duration::try_milliseconds(offset.as_i64()?)?;
    start.checked_add_signed(offset)
}
