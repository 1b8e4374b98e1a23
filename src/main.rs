use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use laplace_dp::config::ConfigFile;
use laplace_dp::{run, DpError, ErrorClass, TracingSink};

#[derive(Debug, Parser)]
#[command(name = "laplace-dp")]
#[command(about = "Adds Laplace noise to a numerical column for differential privacy")]
struct Cli {
    /// Delimited text file to read (required unless --config sets `input`)
    #[arg(required_unless_present = "config")]
    data_file: Option<PathBuf>,

    /// Privacy budget; must be > 0, smaller means more noise (required unless
    /// --config sets `epsilon`)
    #[arg(required_unless_present = "config", allow_negative_numbers = true)]
    epsilon: Option<f64>,

    /// Destination for the noisy data (required unless --config sets `output`)
    #[arg(required_unless_present = "config")]
    output_file: Option<PathBuf>,

    /// Sensitivity of the released value [default: 1.0]
    #[arg(long, allow_negative_numbers = true)]
    sensitivity: Option<f64>,

    /// Zero-based column to perturb [default: 0]
    #[arg(long)]
    column: Option<usize>,

    /// Field delimiter [default: ","]
    #[arg(long)]
    delimiter: Option<String>,

    /// Seed for reproducible noise (default: operating system entropy)
    #[arg(long)]
    seed: Option<u64>,

    /// TOML file with any of the options above; command-line values win
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigFile {
        ConfigFile {
            input: self.data_file.clone(),
            output: self.output_file.clone(),
            epsilon: self.epsilon,
            sensitivity: self.sensitivity,
            column: self.column,
            delimiter: self.delimiter.clone(),
            seed: self.seed,
        }
    }
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn try_main(cli: Cli) -> Result<()> {
    let base = match &cli.config {
        Some(path) => ConfigFile::from_toml_file(path)?,
        None => ConfigFile::default(),
    };
    let config = base.merge(cli.overrides()).resolve()?;

    let mut noise = config.noise_source();
    run(&config, &mut noise, &mut TracingSink)
        .with_context(|| format!("failed to add noise to {}", config.input.display()))?;
    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match try_main(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let class = match err.downcast_ref::<DpError>().map(DpError::class) {
                Some(ErrorClass::Configuration) => "configuration error",
                Some(ErrorClass::Resource) => "resource error",
                None => "error",
            };
            error!("{class}: {err:#}");
            ExitCode::FAILURE
        }
    }
}
