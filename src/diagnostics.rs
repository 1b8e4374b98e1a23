//! Per-record diagnostics
//!
//! Skipped records are reported through an injected sink rather than a
//! process-wide logger

use tracing::warn;

use crate::record::RecordError;

/// One record that was passed through without noise
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// 1-based line number in the input
    pub line_number: usize,
    pub error: RecordError,
}

impl std::fmt::Display for SkippedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at record {}; line left unchanged", self.error, self.line_number)
    }
}

/// Receiver for skipped-record events
pub trait DiagnosticSink {
    fn skipped(&mut self, event: &SkippedRecord);
}

/// Emits every event as a `warn!` with structured fields
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn skipped(&mut self, event: &SkippedRecord) {
        warn!(
            line = event.line_number,
            column = event.error.column(),
            "{event}"
        );
    }
}

impl DiagnosticSink for Vec<SkippedRecord> {
    fn skipped(&mut self, event: &SkippedRecord) {
        self.push(event.clone());
    }
}

impl<F> DiagnosticSink for F
where
    F: FnMut(&SkippedRecord),
{
    fn skipped(&mut self, event: &SkippedRecord) {
        self(event)
    }
}
