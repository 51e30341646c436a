// Rust guideline compliant 2026-02-06

//! Line-oriented output sinks.
//!
//! The renderer never prints directly; it hands each line and its
//! indentation depth to an [`OutputSink`], so tests capture output without
//! touching process-wide stdout.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Spaces per indentation level.
pub const INDENT: &str = "    ";

/// Destination for rendered lines.
pub trait OutputSink {
    /// Writes one line at the given indentation depth.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    fn write_line(&mut self, depth: usize, line: &str) -> io::Result<()>;
}

/// Prefixes `line` with `depth` indentation levels.
pub fn indent(depth: usize, line: &str) -> String {
    format!("{}{}", INDENT.repeat(depth), line)
}

/// Writes lines to any [`Write`] implementation.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    /// Wraps a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for WriterSink<W> {
    fn write_line(&mut self, depth: usize, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", indent(depth, line))
    }
}

/// Writes lines to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write_line(&mut self, depth: usize, line: &str) -> io::Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{}", indent(depth, line))
    }
}

/// Collects indented lines in memory.
///
/// Clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every line written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Returns all lines joined with newlines.
    pub fn contents(&self) -> String {
        self.lines().join("\n")
    }
}

impl OutputSink for MemorySink {
    fn write_line(&mut self, depth: usize, line: &str) -> io::Result<()> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(indent(depth, line));
        Ok(())
    }
}
