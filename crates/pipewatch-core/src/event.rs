// Rust guideline compliant 2026-02-06

//! Lifecycle events emitted by the observed pipeline.
//!
//! A job runs one processor that yields one or more streams; each stream
//! feeds one or more destinations in batches. Streams are identified by their
//! position in the processor's output, destinations by their position in the
//! job's destination list. Rows and info payloads are opaque JSON values.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Discriminant of a [`PipelineEvent`], used to subscribe to one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The job started.
    JobStarted,
    /// The job ended.
    JobFinished,
    /// A stream started.
    StreamStarted,
    /// A stream emitted a row.
    StreamData,
    /// A stream emitted metadata.
    StreamInfo,
    /// A stream failed.
    StreamFailed,
    /// A stream ended.
    StreamFinished,
    /// A destination started loading a batch.
    BatchStarted,
    /// A destination accepted a batch.
    BatchSucceeded,
    /// A destination's batch transformer or loader failed.
    BatchFailed,
    /// A destination's record generator produced a record.
    RecordSucceeded,
    /// A destination's record generator failed.
    RecordFailed,
    /// A destination finished consuming a stream.
    DestinationFinished,
}

impl EventKind {
    /// Every event kind, in lifecycle order.
    pub const ALL: [EventKind; 13] = [
        EventKind::JobStarted,
        EventKind::JobFinished,
        EventKind::StreamStarted,
        EventKind::StreamData,
        EventKind::StreamInfo,
        EventKind::StreamFailed,
        EventKind::StreamFinished,
        EventKind::BatchStarted,
        EventKind::BatchSucceeded,
        EventKind::BatchFailed,
        EventKind::RecordSucceeded,
        EventKind::RecordFailed,
        EventKind::DestinationFinished,
    ];
}

/// How the pipeline ended the job.
///
/// Serialized externally tagged: `"completed"`, `"cancelled"` or
/// `{"failed": {"error": "..."}}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    /// Every stream and destination ran to completion.
    #[default]
    Completed,
    /// The pipeline hit an unrecoverable error.
    Failed {
        /// Error message.
        error: String,
    },
    /// The job was cancelled externally.
    Cancelled,
}

/// Payload of [`PipelineEvent::JobStarted`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobStart {
    /// User-supplied job name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
}

/// Payload of [`PipelineEvent::JobFinished`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobEnd {
    /// Final outcome reported by the pipeline.
    #[serde(default)]
    pub outcome: JobOutcome,
}

/// Payload of stream start/end events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamScope {
    /// Stream index.
    pub stream: usize,
}

/// Payload of [`PipelineEvent::StreamData`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamRow {
    /// Stream index.
    pub stream: usize,
    /// Emitted row.
    pub row: Value,
}

/// Payload of [`PipelineEvent::StreamInfo`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Stream index.
    pub stream: usize,
    /// Pipeline-supplied metadata.
    pub info: Value,
}

/// Payload of [`PipelineEvent::StreamFailed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamError {
    /// Stream index.
    pub stream: usize,
    /// Error message.
    pub error: String,
}

/// Payload of batch start/success events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    /// Index of the stream feeding the destination.
    pub stream: usize,
    /// Destination index.
    pub destination: usize,
    /// Rows in the batch.
    #[serde(default)]
    pub rows: Vec<Value>,
}

/// Payload of [`PipelineEvent::BatchFailed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchError {
    /// Index of the stream feeding the destination.
    pub stream: usize,
    /// Destination index.
    pub destination: usize,
    /// Rows in the failed batch.
    #[serde(default)]
    pub rows: Vec<Value>,
    /// Error message.
    pub error: String,
}

/// Payload of [`PipelineEvent::RecordSucceeded`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Index of the stream feeding the destination.
    pub stream: usize,
    /// Destination index.
    pub destination: usize,
    /// Source row the record was generated from.
    pub row: Value,
}

/// Payload of [`PipelineEvent::RecordFailed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordError {
    /// Index of the stream feeding the destination.
    pub stream: usize,
    /// Destination index.
    pub destination: usize,
    /// Source row the generator failed on.
    pub row: Value,
    /// Error message.
    pub error: String,
}

/// Payload of [`PipelineEvent::DestinationFinished`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationScope {
    /// Index of the stream feeding the destination.
    pub stream: usize,
    /// Destination index.
    pub destination: usize,
}

/// A lifecycle event delivered by the pipeline runtime.
///
/// Serialized with an `event` tag so a run can be recorded as JSONL:
/// `{"event":"stream_data","stream":0,"row":"test"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// The job started.
    JobStarted(JobStart),
    /// The job ended.
    JobFinished(JobEnd),
    /// A stream started.
    StreamStarted(StreamScope),
    /// A stream emitted a row.
    StreamData(StreamRow),
    /// A stream emitted metadata.
    StreamInfo(StreamInfo),
    /// A stream failed.
    StreamFailed(StreamError),
    /// A stream ended.
    StreamFinished(StreamScope),
    /// A destination started loading a batch.
    BatchStarted(Batch),
    /// A destination accepted a batch.
    BatchSucceeded(Batch),
    /// A destination rejected a batch.
    BatchFailed(BatchError),
    /// A destination generated a record from a row.
    RecordSucceeded(Record),
    /// A destination failed to generate a record from a row.
    RecordFailed(RecordError),
    /// A destination finished consuming a stream.
    DestinationFinished(DestinationScope),
}

impl PipelineEvent {
    /// Returns the kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            PipelineEvent::JobStarted(_) => EventKind::JobStarted,
            PipelineEvent::JobFinished(_) => EventKind::JobFinished,
            PipelineEvent::StreamStarted(_) => EventKind::StreamStarted,
            PipelineEvent::StreamData(_) => EventKind::StreamData,
            PipelineEvent::StreamInfo(_) => EventKind::StreamInfo,
            PipelineEvent::StreamFailed(_) => EventKind::StreamFailed,
            PipelineEvent::StreamFinished(_) => EventKind::StreamFinished,
            PipelineEvent::BatchStarted(_) => EventKind::BatchStarted,
            PipelineEvent::BatchSucceeded(_) => EventKind::BatchSucceeded,
            PipelineEvent::BatchFailed(_) => EventKind::BatchFailed,
            PipelineEvent::RecordSucceeded(_) => EventKind::RecordSucceeded,
            PipelineEvent::RecordFailed(_) => EventKind::RecordFailed,
            PipelineEvent::DestinationFinished(_) => EventKind::DestinationFinished,
        }
    }

    /// Shorthand for a job start event.
    pub fn job_started(job_name: Option<&str>) -> Self {
        PipelineEvent::JobStarted(JobStart {
            job_name: job_name.map(str::to_string),
        })
    }

    /// Shorthand for a job end event.
    pub fn job_finished(outcome: JobOutcome) -> Self {
        PipelineEvent::JobFinished(JobEnd { outcome })
    }

    /// Shorthand for a stream start event.
    pub fn stream_started(stream: usize) -> Self {
        PipelineEvent::StreamStarted(StreamScope { stream })
    }

    /// Shorthand for a stream row event.
    pub fn stream_data(stream: usize, row: impl Into<Value>) -> Self {
        PipelineEvent::StreamData(StreamRow {
            stream,
            row: row.into(),
        })
    }

    /// Shorthand for a stream info event.
    pub fn stream_info(stream: usize, info: impl Into<Value>) -> Self {
        PipelineEvent::StreamInfo(StreamInfo {
            stream,
            info: info.into(),
        })
    }

    /// Shorthand for a stream failure event.
    pub fn stream_failed(stream: usize, error: impl Into<String>) -> Self {
        PipelineEvent::StreamFailed(StreamError {
            stream,
            error: error.into(),
        })
    }

    /// Shorthand for a stream end event.
    pub fn stream_finished(stream: usize) -> Self {
        PipelineEvent::StreamFinished(StreamScope { stream })
    }

    /// Shorthand for a batch start event.
    pub fn batch_started(stream: usize, destination: usize, rows: Vec<Value>) -> Self {
        PipelineEvent::BatchStarted(Batch {
            stream,
            destination,
            rows,
        })
    }

    /// Shorthand for a batch success event.
    pub fn batch_succeeded(stream: usize, destination: usize, rows: Vec<Value>) -> Self {
        PipelineEvent::BatchSucceeded(Batch {
            stream,
            destination,
            rows,
        })
    }

    /// Shorthand for a batch failure event.
    pub fn batch_failed(
        stream: usize,
        destination: usize,
        rows: Vec<Value>,
        error: impl Into<String>,
    ) -> Self {
        PipelineEvent::BatchFailed(BatchError {
            stream,
            destination,
            rows,
            error: error.into(),
        })
    }

    /// Shorthand for a record success event.
    pub fn record_succeeded(stream: usize, destination: usize, row: impl Into<Value>) -> Self {
        PipelineEvent::RecordSucceeded(Record {
            stream,
            destination,
            row: row.into(),
        })
    }

    /// Shorthand for a record failure event.
    pub fn record_failed(
        stream: usize,
        destination: usize,
        row: impl Into<Value>,
        error: impl Into<String>,
    ) -> Self {
        PipelineEvent::RecordFailed(RecordError {
            stream,
            destination,
            row: row.into(),
            error: error.into(),
        })
    }

    /// Shorthand for a destination end event.
    pub fn destination_finished(stream: usize, destination: usize) -> Self {
        PipelineEvent::DestinationFinished(DestinationScope {
            stream,
            destination,
        })
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::JobStarted => "job_started",
            EventKind::JobFinished => "job_finished",
            EventKind::StreamStarted => "stream_started",
            EventKind::StreamData => "stream_data",
            EventKind::StreamInfo => "stream_info",
            EventKind::StreamFailed => "stream_failed",
            EventKind::StreamFinished => "stream_finished",
            EventKind::BatchStarted => "batch_started",
            EventKind::BatchSucceeded => "batch_succeeded",
            EventKind::BatchFailed => "batch_failed",
            EventKind::RecordSucceeded => "record_succeeded",
            EventKind::RecordFailed => "record_failed",
            EventKind::DestinationFinished => "destination_finished",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(
            PipelineEvent::stream_data(0, "test").kind(),
            EventKind::StreamData
        );
        assert_eq!(
            PipelineEvent::job_finished(JobOutcome::Cancelled).kind(),
            EventKind::JobFinished
        );
    }

    #[test]
    fn test_parse_tagged_event() {
        let event: PipelineEvent =
            serde_json::from_str(r#"{"event":"stream_data","stream":1,"row":"test"}"#).unwrap();
        assert_eq!(event, PipelineEvent::stream_data(1, "test"));
    }

    #[test]
    fn test_parse_job_finished_outcomes() {
        let completed: PipelineEvent = serde_json::from_str(r#"{"event":"job_finished"}"#).unwrap();
        assert_eq!(completed, PipelineEvent::job_finished(JobOutcome::Completed));

        let cancelled: PipelineEvent =
            serde_json::from_str(r#"{"event":"job_finished","outcome":"cancelled"}"#).unwrap();
        assert_eq!(cancelled, PipelineEvent::job_finished(JobOutcome::Cancelled));

        let failed: PipelineEvent = serde_json::from_str(
            r#"{"event":"job_finished","outcome":{"failed":{"error":"disk full"}}}"#,
        )
        .unwrap();
        assert_eq!(
            failed,
            PipelineEvent::job_finished(JobOutcome::Failed {
                error: "disk full".to_string()
            })
        );
    }

    #[test]
    fn test_batch_rows_default_to_empty() {
        let event: PipelineEvent =
            serde_json::from_str(r#"{"event":"batch_started","stream":0,"destination":2}"#)
                .unwrap();
        assert_eq!(event, PipelineEvent::batch_started(0, 2, vec![]));
    }

    #[test]
    fn test_serialize_uses_event_tag() {
        let value = serde_json::to_value(PipelineEvent::stream_info(0, json!({"table": "users"})))
            .unwrap();
        assert_eq!(value["event"], "stream_info");
        assert_eq!(value["info"]["table"], "users");
    }

    #[test]
    fn test_display_matches_serde_name() {
        for kind in EventKind::ALL {
            let serialized = serde_json::to_value(kind).unwrap();
            assert_eq!(serialized, json!(kind.to_string()));
        }
    }
}
