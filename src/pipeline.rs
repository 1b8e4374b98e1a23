//! File-to-file noise pass

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};

use tracing::info;

use crate::config::RunConfig;
use crate::diagnostics::DiagnosticSink;
use crate::noise::NoiseSource;
use crate::record::{process_stream, RunSummary};
use crate::DpError;

/// Apply the Laplace mechanism to `config.input`, writing `config.output`.
///
/// Parameters are validated before any file is touched, and the input is
/// opened before the output is created. The output is not written
/// atomically: on a mid-run failure the lines written so far remain.
pub fn run<N, S>(config: &RunConfig, noise: &mut N, sink: &mut S) -> Result<RunSummary, DpError>
where
    N: NoiseSource + ?Sized,
    S: DiagnosticSink + ?Sized,
{
    let params = config.validate()?;

    let input = File::open(&config.input).map_err(|e| DpError::file(&config.input, e))?;
    if same_file(config)? {
        return Err(DpError::InvalidConfig(format!(
            "output {} would overwrite the input file",
            config.output.display()
        )));
    }
    let output = File::create(&config.output).map_err(|e| DpError::file(&config.output, e))?;

    let summary = process_stream(
        BufReader::new(input),
        BufWriter::new(output),
        config.column,
        &config.delimiter,
        &params,
        noise,
        sink,
    )?;

    info!(
        records = summary.records,
        perturbed = summary.perturbed,
        skipped = summary.skipped,
        "differential privacy applied; noisy data written to {}",
        config.output.display()
    );
    Ok(summary)
}

fn same_file(config: &RunConfig) -> Result<bool, DpError> {
    if !config.output.exists() {
        return Ok(false);
    }
    let input = fs::canonicalize(&config.input).map_err(|e| DpError::file(&config.input, e))?;
    let output = fs::canonicalize(&config.output).map_err(|e| DpError::file(&config.output, e))?;
    Ok(input == output)
}
