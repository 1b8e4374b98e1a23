//! Record processing
//!
//! Applies Laplace noise to one field of each delimited record. A record whose
//! target field is missing or not a number is passed through byte-for-byte
//! and reported to the diagnostics sink; it never aborts the run.

use std::io::{BufRead, Write};

use thiserror::Error;
use tracing::debug;

use crate::diagnostics::{DiagnosticSink, SkippedRecord};
use crate::noise::NoiseSource;
use crate::params::NoiseParams;
use crate::DpError;

/// Why a record was left unchanged
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("column index {column} out of range for {fields} field(s)")]
    ColumnOutOfRange { column: usize, fields: usize },
    #[error("non-numerical value {value:?} in column {column}")]
    NonNumeric { column: usize, value: String },
    #[error("noisy value for {value} in column {column} is not finite")]
    NonFiniteResult { column: usize, value: f64 },
}

impl RecordError {
    /// Target column the record was checked against
    pub fn column(&self) -> usize {
        match self {
            RecordError::ColumnOutOfRange { column, .. }
            | RecordError::NonNumeric { column, .. }
            | RecordError::NonFiniteResult { column, .. } => *column,
        }
    }
}

/// Result of processing a single line
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// Target field replaced by `value + noise`
    Perturbed(String),
    /// Original (terminator-stripped) line, unchanged
    PassedThrough { line: String, reason: RecordError },
}

impl LineOutcome {
    /// The line to write, without terminator
    pub fn line(&self) -> &str {
        match self {
            LineOutcome::Perturbed(line) | LineOutcome::PassedThrough { line, .. } => line,
        }
    }

    pub fn into_line(self) -> String {
        match self {
            LineOutcome::Perturbed(line) | LineOutcome::PassedThrough { line, .. } => line,
        }
    }

    pub fn is_perturbed(&self) -> bool {
        matches!(self, LineOutcome::Perturbed(_))
    }
}

/// Counts for one processing pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub records: usize,
    pub perturbed: usize,
    pub skipped: usize,
}

impl RunSummary {
    fn observe(&mut self, outcome: &LineOutcome) {
        self.records += 1;
        if outcome.is_perturbed() {
            self.perturbed += 1;
        } else {
            self.skipped += 1;
        }
    }
}

fn strip_terminator(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

fn parse_value(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Shortest round-trip decimal form; always carries a '.' or an exponent.
fn format_value(value: f64) -> String {
    format!("{value:?}")
}

pub(crate) fn check_delimiter(delimiter: &str) -> Result<(), DpError> {
    if delimiter.is_empty() {
        return Err(DpError::InvalidConfig(
            "delimiter must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Process one raw line.
///
/// Draws exactly one noise sample when the target field is present and
/// numeric, and none otherwise. A sum that overflows to infinity leaves the
/// line unchanged. `delimiter` must be non-empty.
pub fn process_line<N>(
    line: &str,
    column: usize,
    delimiter: &str,
    params: &NoiseParams,
    noise: &mut N,
) -> LineOutcome
where
    N: NoiseSource + ?Sized,
{
    debug_assert!(!delimiter.is_empty());
    let line = strip_terminator(line);
    let fields: Vec<&str> = line.split(delimiter).collect();

    let pass = |reason| LineOutcome::PassedThrough {
        line: line.to_string(),
        reason,
    };

    let Some(raw) = fields.get(column) else {
        return pass(RecordError::ColumnOutOfRange {
            column,
            fields: fields.len(),
        });
    };
    let Some(value) = parse_value(raw) else {
        return pass(RecordError::NonNumeric {
            column,
            value: (*raw).to_string(),
        });
    };

    let noisy = value + noise.sample(params);
    if !noisy.is_finite() {
        return pass(RecordError::NonFiniteResult { column, value });
    }

    let mut out = String::with_capacity(line.len() + 24);
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            out.push_str(delimiter);
        }
        if idx == column {
            out.push_str(&format_value(noisy));
        } else {
            out.push_str(field);
        }
    }
    LineOutcome::Perturbed(out)
}

/// Process a sequence of raw lines, returning one output line per input line
/// in the same order. Each skipped record is reported to `sink`.
pub fn process<I, N, S>(
    records: I,
    column: usize,
    delimiter: &str,
    params: &NoiseParams,
    noise: &mut N,
    sink: &mut S,
) -> Result<Vec<String>, DpError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
    N: NoiseSource + ?Sized,
    S: DiagnosticSink + ?Sized,
{
    check_delimiter(delimiter)?;

    let mut output = Vec::new();
    for (idx, raw) in records.into_iter().enumerate() {
        let outcome = process_line(raw.as_ref(), column, delimiter, params, noise);
        report(sink, idx + 1, &outcome);
        output.push(outcome.into_line());
    }
    Ok(output)
}

/// Streaming form of [`process`]: reads lines from `reader` and writes each
/// output line plus `\n` to `writer`.
///
/// Any read or write failure aborts the pass; lines already written stay
/// written.
pub fn process_stream<R, W, N, S>(
    mut reader: R,
    mut writer: W,
    column: usize,
    delimiter: &str,
    params: &NoiseParams,
    noise: &mut N,
    sink: &mut S,
) -> Result<RunSummary, DpError>
where
    R: BufRead,
    W: Write,
    N: NoiseSource + ?Sized,
    S: DiagnosticSink + ?Sized,
{
    check_delimiter(delimiter)?;
    debug!(
        column,
        delimiter,
        sensitivity = params.sensitivity(),
        epsilon = params.epsilon(),
        scale = params.scale(),
        "processing records"
    );

    let mut summary = RunSummary::default();
    let mut buf = String::new();
    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        let outcome = process_line(&buf, column, delimiter, params, noise);
        summary.observe(&outcome);
        report(sink, summary.records, &outcome);
        writeln!(writer, "{}", outcome.line())?;
    }
    writer.flush()?;
    Ok(summary)
}

fn report<S: DiagnosticSink + ?Sized>(sink: &mut S, line_number: usize, outcome: &LineOutcome) {
    if let LineOutcome::PassedThrough { reason, .. } = outcome {
        sink.skipped(&SkippedRecord {
            line_number,
            error: reason.clone(),
        });
    }
}
