// Rust guideline compliant 2026-02-06

//! Event binding: forwards pipeline events to the progress state and the
//! renderer.
//!
//! Forwarding is fire-and-forget. A failing or panicking handler is logged
//! with `tracing` and dropped; nothing propagates back to the pipeline.

use crate::bus::EventBus;
use crate::clock::{Clock, SystemClock};
use crate::config::ReporterOptions;
use crate::event::{EventKind, JobOutcome, PipelineEvent};
use crate::render::{Phase, Renderer};
use crate::sink::{OutputSink, StdoutSink};
use crate::state::{JobStatus, ProgressState, RecordedError, CANCELLED_ERROR};
use crate::Result;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

struct Binder {
    state: ProgressState,
    renderer: Renderer,
    clock: Box<dyn Clock>,
}

impl Binder {
    fn dispatch(&mut self, event: &PipelineEvent) -> Result<()> {
        let now = self.clock.now();
        let phase = self.renderer.phase();

        match event {
            PipelineEvent::JobStarted(start) => {
                if phase == Phase::Running {
                    tracing::debug!("job already running, ignoring repeated start");
                    return Ok(());
                }
                self.state = ProgressState::new();
                let name = start
                    .job_name
                    .clone()
                    .unwrap_or_else(|| self.renderer.options().default_job_name.clone());
                self.state.start_job(&name, now);
                return self.renderer.job_started(&name, now);
            }
            _ if phase.is_terminal() => {
                tracing::debug!(kind = %event.kind(), "event after job end ignored");
                return Ok(());
            }
            _ if phase == Phase::NotStarted => {
                tracing::debug!(kind = %event.kind(), "event before job start, starting job");
                let name = self.renderer.options().default_job_name.clone();
                self.state.start_job(&name, now);
                self.renderer.job_started(&name, now)?;
            }
            _ => {}
        }

        match event {
            PipelineEvent::JobStarted(_) => Ok(()),
            PipelineEvent::JobFinished(end) => {
                match &end.outcome {
                    JobOutcome::Completed => {}
                    JobOutcome::Failed { error } => self.state.record_job_error(error),
                    JobOutcome::Cancelled => self.state.record_job_error(CANCELLED_ERROR),
                }
                self.renderer.job_finished(&self.state, &end.outcome, now)
            }
            PipelineEvent::StreamStarted(scope) => {
                self.state.start_stream(scope.stream);
                self.renderer.stream_started(scope.stream, now)
            }
            PipelineEvent::StreamData(data) => {
                let count = self.state.record_stream_row(data.stream, &data.row);
                self.renderer.stream_row(data.stream, &data.row, count, now)
            }
            PipelineEvent::StreamInfo(info) => {
                self.state.record_stream_info(info.stream, &info.info);
                self.renderer.stream_info(info.stream, &info.info, now)
            }
            PipelineEvent::StreamFailed(failure) => {
                self.state
                    .record_processor_error(Some(failure.stream), &failure.error);
                self.renderer
                    .stream_failed(failure.stream, &failure.error, now)
            }
            PipelineEvent::StreamFinished(scope) => {
                let progress = self.state.finish_stream(scope.stream);
                self.renderer
                    .stream_finished(scope.stream, progress.as_ref(), &self.state, now)
            }
            PipelineEvent::BatchStarted(batch) => {
                self.state.touch_destination(batch.stream, batch.destination);
                self.renderer
                    .batch_started(batch.stream, batch.destination, &batch.rows, now)
            }
            PipelineEvent::BatchSucceeded(batch) => {
                let outcome = self.state.record_destination_batch(
                    batch.stream,
                    batch.destination,
                    true,
                    batch.rows.len(),
                    None,
                );
                self.renderer.batch_succeeded(
                    batch.stream,
                    batch.destination,
                    &batch.rows,
                    outcome,
                    now,
                )
            }
            PipelineEvent::BatchFailed(failure) => {
                self.state.record_destination_batch(
                    failure.stream,
                    failure.destination,
                    false,
                    failure.rows.len(),
                    Some(&failure.error),
                );
                self.renderer.batch_failed(
                    failure.stream,
                    failure.destination,
                    &failure.rows,
                    &failure.error,
                    now,
                )
            }
            PipelineEvent::RecordSucceeded(record) => {
                let outcome = self.state.record_destination_record(
                    record.stream,
                    record.destination,
                    true,
                    None,
                );
                self.renderer.record_succeeded(
                    record.stream,
                    record.destination,
                    &record.row,
                    outcome,
                    now,
                )
            }
            PipelineEvent::RecordFailed(failure) => {
                self.state.record_destination_record(
                    failure.stream,
                    failure.destination,
                    false,
                    Some(&failure.error),
                );
                self.renderer.record_failed(
                    failure.stream,
                    failure.destination,
                    &failure.row,
                    &failure.error,
                    now,
                )
            }
            PipelineEvent::DestinationFinished(scope) => self.renderer.destination_finished(
                scope.stream,
                scope.destination,
                self.state.feed(scope.stream, scope.destination),
                now,
            ),
        }
    }
}

/// Console progress reporter for one pipeline job at a time.
///
/// Cloning yields another handle to the same reporter, which is how
/// [`Reporter::attach`] registers one handler per event kind. Handles are
/// single-threaded, matching the pipeline's synchronous event delivery.
///
/// # Example
///
/// ```
/// use pipewatch_core::{ManualClock, MemorySink, PipelineEvent, Reporter, ReporterOptions};
/// use pipewatch_core::JobOutcome;
///
/// let sink = MemorySink::new();
/// let clock = ManualClock::new(chrono::Utc::now());
/// let reporter = Reporter::with_parts(ReporterOptions::default(), sink.clone(), clock);
///
/// reporter.handle(&PipelineEvent::job_started(Some("demo")));
/// reporter.handle(&PipelineEvent::job_finished(JobOutcome::Completed));
/// assert!(sink.contents().contains("PASS"));
/// ```
#[derive(Clone)]
pub struct Reporter {
    inner: Rc<RefCell<Binder>>,
}

impl Reporter {
    /// Creates a reporter writing to stdout with the system clock.
    pub fn new(options: ReporterOptions) -> Self {
        Self::with_parts(options, StdoutSink, SystemClock)
    }

    /// Creates a reporter with an explicit sink and clock.
    pub fn with_parts<S, C>(options: ReporterOptions, sink: S, clock: C) -> Self
    where
        S: OutputSink + 'static,
        C: Clock + 'static,
    {
        Self {
            inner: Rc::new(RefCell::new(Binder {
                state: ProgressState::new(),
                renderer: Renderer::new(options, Box::new(sink)),
                clock: Box::new(clock),
            })),
        }
    }

    /// Registers one handler per event kind on `bus`.
    pub fn attach(&self, bus: &mut EventBus) {
        for kind in EventKind::ALL {
            let reporter = self.clone();
            bus.subscribe(kind, move |event| reporter.handle(event));
        }
    }

    /// Records and renders one event.
    ///
    /// Never fails and never panics outward: errors and panics raised while
    /// reporting are logged and swallowed.
    pub fn handle(&self, event: &PipelineEvent) {
        let Ok(mut binder) = self.inner.try_borrow_mut() else {
            tracing::warn!(kind = %event.kind(), "reporter re-entered, event dropped");
            return;
        };
        match panic::catch_unwind(AssertUnwindSafe(|| binder.dispatch(event))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::warn!(kind = %event.kind(), error = %err, "failed to report event");
            }
            Err(_) => {
                tracing::warn!(kind = %event.kind(), "reporter panicked while handling event");
            }
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.inner.borrow().renderer.phase()
    }

    /// Final verdict so far: failed iff any error was recorded.
    pub fn status(&self) -> JobStatus {
        self.inner.borrow().state.status()
    }

    /// Number of currently open groups; zero before start and after end.
    pub fn open_groups(&self) -> usize {
        self.inner.borrow().renderer.open_groups()
    }

    /// Every recorded error, in order of arrival.
    pub fn errors(&self) -> Vec<RecordedError> {
        self.inner.borrow().state.errors().to_vec()
    }

    /// Rows emitted across all streams.
    pub fn total_rows(&self) -> usize {
        self.inner.borrow().state.total_rows()
    }
}
