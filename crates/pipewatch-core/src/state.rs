// Rust guideline compliant 2026-02-06

//! Per-job progress counters and error lists.
//!
//! Every mutator here only appends or increments: no operation lowers a
//! counter or drops a recorded error. Stream records are the one exception,
//! being removed whole when their stream finishes; the job-wide row total
//! keeps their contribution.

use crate::format::{format_row, ROW_DISPLAY_LIMIT};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Message recorded when the pipeline reports a failure without one.
const UNKNOWN_ERROR: &str = "unknown error";

/// Message recorded when the job is cancelled externally.
pub const CANCELLED_ERROR: &str = "job cancelled";

/// Final verdict of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// No error was recorded.
    Success,
    /// At least one error was recorded.
    Failed,
}

/// Where a recorded error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSource {
    /// The pipeline itself (unrecoverable failure or cancellation).
    Job,
    /// The processor, while producing a stream.
    Stream {
        /// Stream index.
        stream: usize,
    },
    /// A destination's batch transformer or loader.
    Batch {
        /// Stream index.
        stream: usize,
        /// Destination index.
        destination: usize,
    },
    /// A destination's record generator.
    Record {
        /// Stream index.
        stream: usize,
        /// Destination index.
        destination: usize,
    },
}

impl fmt::Display for ErrorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSource::Job => write!(f, "job"),
            ErrorSource::Stream { stream } => write!(f, "stream #{}", stream),
            ErrorSource::Batch {
                stream,
                destination,
            } => write!(f, "stream #{} / destination #{} batch", stream, destination),
            ErrorSource::Record {
                stream,
                destination,
            } => write!(f, "stream #{} / destination #{} record", stream, destination),
        }
    }
}

/// One error, in the order it was received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedError {
    /// Origin of the error.
    pub source: ErrorSource,
    /// Error message, verbatim.
    pub message: String,
}

/// Progress of one live stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamProgress {
    /// Rows emitted so far.
    pub rows: usize,
    /// Latest info payload, if the stream emitted one.
    pub info: Option<Value>,
    /// First rendered rows, at most [`ROW_DISPLAY_LIMIT`].
    pub sample: Vec<String>,
    /// Whether the processor reported an error for this stream.
    pub failed: bool,
}

/// Counters of one destination.
///
/// Kept twice: per (stream, destination) feed for the lines inside a stream
/// group, and per destination over the whole job for the final summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationOutcome {
    /// Batches accepted.
    pub batches_processed: usize,
    /// Batches rejected.
    pub batches_failed: usize,
    /// Rows contained in accepted batches.
    pub rows_loaded: usize,
    /// Records produced by the record generator.
    pub records_generated: usize,
    /// Rows the record generator failed on.
    pub records_failed: usize,
    /// Error messages in order of occurrence.
    pub errors: Vec<String>,
}

impl DestinationOutcome {
    /// Whether the destination recorded any failure.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Mutable record of one job run.
#[derive(Debug, Clone, Default)]
pub struct ProgressState {
    job_name: Option<String>,
    started_at: Option<DateTime<Utc>>,
    streams: BTreeMap<usize, StreamProgress>,
    streams_started: usize,
    destinations: BTreeMap<usize, DestinationOutcome>,
    feeds: BTreeMap<(usize, usize), DestinationOutcome>,
    errors: Vec<RecordedError>,
    total_rows: usize,
}

impl ProgressState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the job start.
    pub fn start_job(&mut self, job_name: &str, at: DateTime<Utc>) {
        self.job_name = Some(job_name.to_string());
        self.started_at = Some(at);
    }

    /// Job name, once the job started.
    pub fn job_name(&self) -> Option<&str> {
        self.job_name.as_deref()
    }

    /// Time elapsed since the job started, zero if it never did.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        self.started_at
            .map(|start| now - start)
            .unwrap_or_else(Duration::zero)
    }

    /// Opens a stream record, returning whether it was newly created.
    pub fn start_stream(&mut self, stream: usize) -> bool {
        if self.streams.contains_key(&stream) {
            return false;
        }
        self.streams.insert(stream, StreamProgress::default());
        self.streams_started += 1;
        true
    }

    /// Counts a row emitted by a stream and returns the stream's new count.
    pub fn record_stream_row(&mut self, stream: usize, row: &Value) -> usize {
        self.start_stream(stream);
        self.total_rows += 1;
        let progress = self.streams.entry(stream).or_default();
        progress.rows += 1;
        if progress.sample.len() < ROW_DISPLAY_LIMIT {
            progress.sample.push(format_row(row));
        }
        progress.rows
    }

    /// Attaches pipeline-supplied metadata to a stream.
    pub fn record_stream_info(&mut self, stream: usize, info: &Value) {
        self.start_stream(stream);
        self.streams.entry(stream).or_default().info = Some(info.clone());
    }

    /// Records a processor error, optionally scoped to a stream.
    pub fn record_processor_error(&mut self, stream: Option<usize>, error: &str) {
        let source = match stream {
            Some(stream) => {
                if let Some(progress) = self.streams.get_mut(&stream) {
                    progress.failed = true;
                }
                ErrorSource::Stream { stream }
            }
            None => ErrorSource::Job,
        };
        self.push_error(source, error);
    }

    /// Removes and returns a finished stream's record.
    pub fn finish_stream(&mut self, stream: usize) -> Option<StreamProgress> {
        self.streams.remove(&stream)
    }

    /// Live stream record.
    pub fn stream(&self, stream: usize) -> Option<&StreamProgress> {
        self.streams.get(&stream)
    }

    /// Indices of streams that started but did not finish.
    pub fn live_streams(&self) -> Vec<usize> {
        self.streams.keys().copied().collect()
    }

    /// Number of streams started during the job.
    pub fn streams_started(&self) -> usize {
        self.streams_started
    }

    /// Records a batch outcome for a destination.
    ///
    /// # Arguments
    ///
    /// * `stream` - Stream feeding the destination
    /// * `destination` - Destination index
    /// * `ok` - Whether the batch was accepted
    /// * `rows` - Number of rows in the batch
    /// * `error` - Failure message when `ok` is false
    ///
    /// # Returns
    ///
    /// The counters of this stream's feed into the destination.
    pub fn record_destination_batch(
        &mut self,
        stream: usize,
        destination: usize,
        ok: bool,
        rows: usize,
        error: Option<&str>,
    ) -> &DestinationOutcome {
        let message = error.unwrap_or(UNKNOWN_ERROR);
        let total = self.destinations.entry(destination).or_default();
        let feed = self.feeds.entry((stream, destination)).or_default();
        for outcome in [total, feed] {
            if ok {
                outcome.batches_processed += 1;
                outcome.rows_loaded += rows;
            } else {
                outcome.batches_failed += 1;
                outcome.errors.push(message.to_string());
            }
        }
        if !ok {
            self.push_error(
                ErrorSource::Batch {
                    stream,
                    destination,
                },
                message,
            );
        }
        self.touch_destination(stream, destination)
    }

    /// Records a record-generation outcome for a destination.
    ///
    /// # Arguments
    ///
    /// * `stream` - Stream feeding the destination
    /// * `destination` - Destination index
    /// * `ok` - Whether the generator produced a record
    /// * `error` - Failure message when `ok` is false
    ///
    /// # Returns
    ///
    /// The counters of this stream's feed into the destination.
    pub fn record_destination_record(
        &mut self,
        stream: usize,
        destination: usize,
        ok: bool,
        error: Option<&str>,
    ) -> &DestinationOutcome {
        let message = error.unwrap_or(UNKNOWN_ERROR);
        let total = self.destinations.entry(destination).or_default();
        let feed = self.feeds.entry((stream, destination)).or_default();
        for outcome in [total, feed] {
            if ok {
                outcome.records_generated += 1;
            } else {
                outcome.records_failed += 1;
                outcome.errors.push(message.to_string());
            }
        }
        if !ok {
            self.push_error(
                ErrorSource::Record {
                    stream,
                    destination,
                },
                message,
            );
        }
        self.touch_destination(stream, destination)
    }

    /// Registers a stream's feed into a destination without counting anything.
    pub fn touch_destination(&mut self, stream: usize, destination: usize) -> &DestinationOutcome {
        self.destinations.entry(destination).or_default();
        self.feeds.entry((stream, destination)).or_default()
    }

    /// Records a job-level error (unrecoverable failure or cancellation).
    pub fn record_job_error(&mut self, error: &str) {
        self.push_error(ErrorSource::Job, error);
    }

    /// Job-wide destination counters.
    pub fn destination(&self, destination: usize) -> Option<&DestinationOutcome> {
        self.destinations.get(&destination)
    }

    /// Counters of one stream's feed into a destination.
    pub fn feed(&self, stream: usize, destination: usize) -> Option<&DestinationOutcome> {
        self.feeds.get(&(stream, destination))
    }

    /// All destination counters, ordered by index.
    pub fn destinations(&self) -> impl Iterator<Item = (usize, &DestinationOutcome)> {
        self.destinations.iter().map(|(idx, outcome)| (*idx, outcome))
    }

    /// Every recorded error, in order of arrival.
    pub fn errors(&self) -> &[RecordedError] {
        &self.errors
    }

    /// Rows emitted across all streams.
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Final verdict: failed iff any error was recorded.
    pub fn status(&self) -> JobStatus {
        if self.errors.is_empty() {
            JobStatus::Success
        } else {
            JobStatus::Failed
        }
    }

    fn push_error(&mut self, source: ErrorSource, message: &str) {
        self.errors.push(RecordedError {
            source,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_new_state_is_success() {
        let state = ProgressState::new();
        assert_eq!(state.status(), JobStatus::Success);
        assert_eq!(state.total_rows(), 0);
        assert!(state.errors().is_empty());
    }

    #[test]
    fn test_elapsed_since_start() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut state = ProgressState::new();
        assert_eq!(state.elapsed(start), Duration::zero());

        state.start_job("job", start);
        assert_eq!(
            state.elapsed(start + Duration::milliseconds(1_200)),
            Duration::milliseconds(1_200)
        );
    }

    #[test]
    fn test_stream_rows_keep_bounded_sample() {
        let mut state = ProgressState::new();
        state.start_stream(0);
        for i in 0..10 {
            state.record_stream_row(0, &json!(i));
        }
        let progress = state.stream(0).unwrap();
        assert_eq!(progress.rows, 10);
        assert_eq!(progress.sample, vec!["0", "1", "2"]);
        assert_eq!(state.total_rows(), 10);
    }

    #[test]
    fn test_interleaved_streams_do_not_mix() {
        let mut state = ProgressState::new();
        state.start_stream(0);
        state.start_stream(1);
        state.record_stream_row(0, &json!("a"));
        state.record_stream_row(1, &json!("b"));
        state.record_stream_row(0, &json!("c"));

        assert_eq!(state.stream(0).unwrap().rows, 2);
        assert_eq!(state.stream(1).unwrap().rows, 1);
        assert_eq!(state.streams_started(), 2);
    }

    #[test]
    fn test_finish_stream_keeps_total() {
        let mut state = ProgressState::new();
        state.record_stream_row(0, &json!("a"));
        let finished = state.finish_stream(0).unwrap();
        assert_eq!(finished.rows, 1);
        assert!(state.stream(0).is_none());
        assert!(state.live_streams().is_empty());
        assert_eq!(state.total_rows(), 1);
    }

    #[test]
    fn test_stream_info_recorded() {
        let mut state = ProgressState::new();
        state.record_stream_info(2, &json!({"table": "users"}));
        assert_eq!(state.stream(2).unwrap().info, Some(json!({"table": "users"})));
    }

    #[test]
    fn test_batch_counters() {
        let mut state = ProgressState::new();
        state.record_destination_batch(0, 0, true, 3, None);
        let outcome = state.record_destination_batch(0, 0, false, 1, Some("Oh, snap!"));
        assert_eq!(outcome.batches_processed, 1);
        assert_eq!(outcome.batches_failed, 1);
        assert_eq!(outcome.rows_loaded, 3);
        assert_eq!(outcome.errors, vec!["Oh, snap!".to_string()]);
        assert_eq!(state.status(), JobStatus::Failed);
        assert_eq!(
            state.errors()[0].source,
            ErrorSource::Batch {
                stream: 0,
                destination: 0
            }
        );
    }

    #[test]
    fn test_feeds_are_counted_per_stream() {
        let mut state = ProgressState::new();
        state.record_destination_batch(0, 0, true, 2, None);
        state.record_destination_batch(0, 0, true, 2, None);
        state.record_destination_batch(0, 0, false, 1, Some("bad batch"));
        let feed = state.record_destination_batch(1, 0, true, 5, None);
        assert_eq!(feed.batches_processed, 1);
        assert_eq!(feed.batches_failed, 0);
        assert_eq!(feed.rows_loaded, 5);

        let first = state.feed(0, 0).unwrap();
        assert_eq!(first.batches_processed, 2);
        assert_eq!(first.batches_failed, 1);

        let total = state.destination(0).unwrap();
        assert_eq!(total.batches_processed, 3);
        assert_eq!(total.batches_failed, 1);
        assert_eq!(total.rows_loaded, 9);
        assert!(state.feed(1, 1).is_none());
    }

    #[test]
    fn test_record_counters() {
        let mut state = ProgressState::new();
        state.record_destination_record(0, 1, true, None);
        state.record_destination_record(0, 1, false, None);
        let outcome = state.destination(1).unwrap();
        assert_eq!(outcome.records_generated, 1);
        assert_eq!(outcome.records_failed, 1);
        assert_eq!(outcome.errors, vec![UNKNOWN_ERROR.to_string()]);
    }

    #[test]
    fn test_errors_keep_arrival_order() {
        let mut state = ProgressState::new();
        state.start_stream(0);
        state.record_destination_record(0, 0, false, Some("first"));
        state.record_processor_error(Some(0), "second");
        state.record_destination_batch(0, 1, false, 0, Some("third"));
        state.record_job_error("fourth");

        let messages: Vec<&str> = state.errors().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third", "fourth"]);
        assert!(state.stream(0).unwrap().failed);
    }

    #[test]
    fn test_destinations_ordered_by_index() {
        let mut state = ProgressState::new();
        state.touch_destination(0, 2);
        state.touch_destination(1, 0);
        let indices: Vec<usize> = state.destinations().map(|(idx, _)| idx).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_error_source_display() {
        assert_eq!(ErrorSource::Job.to_string(), "job");
        assert_eq!(ErrorSource::Stream { stream: 1 }.to_string(), "stream #1");
        assert_eq!(
            ErrorSource::Batch {
                stream: 0,
                destination: 2
            }
            .to_string(),
            "stream #0 / destination #2 batch"
        );
    }
}
