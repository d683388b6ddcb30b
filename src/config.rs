//! Server configuration from environment variables

use std::path::PathBuf;
use thiserror::Error;

use crate::core::{SolverConfig, SpreadConvention};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

/// Runtime settings for the API server
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `.onnx` or `.json` model export
    pub model_path: PathBuf,
    /// Directory holding the feature tables
    pub data_dir: PathBuf,
    pub spread_convention: SpreadConvention,
    pub solver: SolverConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            model_path: PathBuf::from("../models/margin_model.json"),
            data_dir: PathBuf::from("../data"),
            spread_convention: SpreadConvention::default(),
            solver: SolverConfig::default(),
        }
    }
}

fn parse<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        var,
        message: e.to_string(),
    })
}

impl ServerConfig {
    /// Read `HOST`, `PORT`, `MODEL_PATH`, `DATA_DIR`, `SPREAD_CONVENTION`,
    /// `KELLY_MAX_ITERATIONS` and `KELLY_TOLERANCE`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = parse("PORT", &port)?;
        }
        if let Some(path) = lookup("MODEL_PATH") {
            config.model_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(convention) = lookup("SPREAD_CONVENTION") {
            config.spread_convention = parse("SPREAD_CONVENTION", &convention)?;
        }
        if let Some(iterations) = lookup("KELLY_MAX_ITERATIONS") {
            let iterations: usize = parse("KELLY_MAX_ITERATIONS", &iterations)?;
            if iterations == 0 {
                return Err(ConfigError::Invalid {
                    var: "KELLY_MAX_ITERATIONS",
                    message: "must be at least 1".to_string(),
                });
            }
            config.solver.max_iterations = iterations;
        }
        if let Some(tolerance) = lookup("KELLY_TOLERANCE") {
            let tolerance: f64 = parse("KELLY_TOLERANCE", &tolerance)?;
            if !(tolerance > 0.0 && tolerance.is_finite()) {
                return Err(ConfigError::Invalid {
                    var: "KELLY_TOLERANCE",
                    message: format!("must be a positive number, got {}", tolerance),
                });
            }
            config.solver.tolerance = tolerance;
        }

        Ok(config)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
