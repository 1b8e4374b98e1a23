//! Run configuration
//!
//! Options for one noise pass, optionally loaded from a TOML file and
//! overridden from the command line

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::noise::LaplaceNoise;
use crate::params::{NoiseParams, DEFAULT_SENSITIVITY};
use crate::record::check_delimiter;
use crate::DpError;

pub const DEFAULT_DELIMITER: &str = ",";
pub const DEFAULT_COLUMN: usize = 0;

/// Fully resolved options for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub epsilon: f64,
    pub sensitivity: f64,
    /// Zero-based field to perturb
    pub column: usize,
    pub delimiter: String,
    /// Fixed seed for reproducible noise; entropy when `None`
    pub seed: Option<u64>,
}

impl RunConfig {
    /// Required options with defaults for the rest
    pub fn new(input: impl Into<PathBuf>, epsilon: f64, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            epsilon,
            sensitivity: DEFAULT_SENSITIVITY,
            column: DEFAULT_COLUMN,
            delimiter: DEFAULT_DELIMITER.to_string(),
            seed: None,
        }
    }

    /// Check run-wide options once, before any record is read
    pub fn validate(&self) -> Result<NoiseParams, DpError> {
        let params = NoiseParams::new(self.sensitivity, self.epsilon)?;
        check_delimiter(&self.delimiter)?;
        Ok(params)
    }

    pub fn noise_source(&self) -> LaplaceNoise {
        match self.seed {
            Some(seed) => LaplaceNoise::from_seed(seed),
            None => LaplaceNoise::from_entropy(),
        }
    }
}

/// Partial options as written in a TOML file or given on the command line
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub epsilon: Option<f64>,
    pub sensitivity: Option<f64>,
    pub column: Option<usize>,
    pub delimiter: Option<String>,
    pub seed: Option<u64>,
}

impl ConfigFile {
    pub fn from_toml_file(path: &Path) -> Result<Self, DpError> {
        let raw = fs::read_to_string(path).map_err(|e| DpError::file(path, e))?;
        Self::from_toml_str(&raw).map_err(|e| match e {
            DpError::InvalidConfig(msg) => {
                DpError::InvalidConfig(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, DpError> {
        toml::from_str(raw).map_err(|e| DpError::InvalidConfig(e.to_string()))
    }

    /// Values set in `overrides` win
    pub fn merge(self, overrides: ConfigFile) -> ConfigFile {
        ConfigFile {
            input: overrides.input.or(self.input),
            output: overrides.output.or(self.output),
            epsilon: overrides.epsilon.or(self.epsilon),
            sensitivity: overrides.sensitivity.or(self.sensitivity),
            column: overrides.column.or(self.column),
            delimiter: overrides.delimiter.or(self.delimiter),
            seed: overrides.seed.or(self.seed),
        }
    }

    /// Fill defaults; fails if a required option is missing
    pub fn resolve(self) -> Result<RunConfig, DpError> {
        let missing = |name: &str| DpError::InvalidConfig(format!("missing required option: {name}"));
        let input = self.input.ok_or_else(|| missing("input"))?;
        let epsilon = self.epsilon.ok_or_else(|| missing("epsilon"))?;
        let output = self.output.ok_or_else(|| missing("output"))?;

        let mut config = RunConfig::new(input, epsilon, output);
        if let Some(sensitivity) = self.sensitivity {
            config.sensitivity = sensitivity;
        }
        if let Some(column) = self.column {
            config.column = column;
        }
        if let Some(delimiter) = self.delimiter {
            config.delimiter = delimiter;
        }
        config.seed = self.seed;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorClass;

    #[test]
    fn test_defaults() {
        let config = RunConfig::new("in.csv", 1.0, "out.csv");
        assert_eq!(config.sensitivity, 1.0);
        assert_eq!(config.column, 0);
        assert_eq!(config.delimiter, ",");
        assert_eq!(config.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_epsilon() {
        let config = RunConfig::new("in.csv", 0.0, "out.csv");
        assert_eq!(config.validate().unwrap_err().class(), ErrorClass::Configuration);
    }

    #[test]
    fn test_validate_rejects_empty_delimiter() {
        let mut config = RunConfig::new("in.csv", 1.0, "out.csv");
        config.delimiter.clear();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, DpError::InvalidConfig(_)));
        assert_eq!(
            err.to_string(),
            check_delimiter("").unwrap_err().to_string()
        );
    }

    #[test]
    fn test_toml_and_overrides() {
        let file = ConfigFile::from_toml_str(
            r#"
            input = "data.csv"
            output = "noisy.csv"
            epsilon = 0.5
            column = 2
            delimiter = ";"
            "#,
        )
        .unwrap();

        let cli = ConfigFile {
            epsilon: Some(2.0),
            seed: Some(7),
            ..Default::default()
        };
        let config = file.merge(cli).resolve().unwrap();

        assert_eq!(config.input, PathBuf::from("data.csv"));
        assert_eq!(config.output, PathBuf::from("noisy.csv"));
        assert_eq!(config.epsilon, 2.0);
        assert_eq!(config.sensitivity, 1.0);
        assert_eq!(config.column, 2);
        assert_eq!(config.delimiter, ";");
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_missing_required_option() {
        let partial = ConfigFile {
            input: Some("data.csv".into()),
            epsilon: Some(1.0),
            ..Default::default()
        };
        let err = partial.resolve().unwrap_err();
        assert_eq!(err.to_string(), "invalid configuration: missing required option: output");
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(ConfigFile::from_toml_str("epsilon = 1.0\nmechanism = \"gaussian\"\n").is_err());
    }
}
