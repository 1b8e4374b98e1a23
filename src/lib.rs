//! laplace-dp - Laplace mechanism for delimited text
//!
//! Perturbs one numeric column of a delimited text file with zero-centred
//! Laplace noise of scale `sensitivity / epsilon`. Records whose target field
//! is missing or non-numeric are passed through unchanged and reported to a
//! diagnostics sink instead of aborting the run.

pub mod config;
pub mod diagnostics;
pub mod noise;
pub mod params;
pub mod pipeline;
pub mod record;

use std::path::PathBuf;

use thiserror::Error;

// Re-export main types
pub use config::RunConfig;
pub use diagnostics::{DiagnosticSink, SkippedRecord, TracingSink};
pub use noise::{Laplace, LaplaceNoise, NoiseSource};
pub use params::NoiseParams;
pub use pipeline::run;
pub use record::{process, process_line, process_stream, LineOutcome, RecordError, RunSummary};

/// Run-level failures. Record-level problems are [`RecordError`] and never
/// surface here.
#[derive(Debug, Error)]
pub enum DpError {
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`DpError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad run parameters, detected before any record is read.
    Configuration,
    /// Missing or unreadable input, unwritable output, or an I/O fault mid-run.
    Resource,
}

impl DpError {
    pub fn class(&self) -> ErrorClass {
        match self {
            DpError::InvalidParameter { .. } | DpError::InvalidConfig(_) => {
                ErrorClass::Configuration
            }
            DpError::File { .. } | DpError::Io(_) => ErrorClass::Resource,
        }
    }

    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DpError::File {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        let err = DpError::InvalidParameter {
            name: "epsilon",
            value: 0.0,
            reason: "must be > 0",
        };
        assert_eq!(err.class(), ErrorClass::Configuration);
        assert_eq!(err.to_string(), "invalid parameter epsilon = 0: must be > 0");

        let err = DpError::InvalidConfig("delimiter must not be empty".to_string());
        assert_eq!(err.class(), ErrorClass::Configuration);

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = DpError::file("missing.csv", io);
        assert_eq!(err.class(), ErrorClass::Resource);
        assert!(err.to_string().starts_with("missing.csv: "));
    }
}
