//! Margin prediction oracles
//!
//! An oracle maps one normalized feature row to a predicted run differential
//! (away - home) and the standard deviation of that prediction.

use ort::{
    session::{builder::GraphOptimizationLevel, Session},
    value::Tensor,
};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use crate::core::CoreError;

/// Point estimate with its uncertainty
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointEstimate {
    pub value: f64,
    pub std_dev: f64,
}

/// Black-box regression model
pub trait PredictionOracle: Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<PointEstimate, CoreError>;

    /// Short description for logs
    fn name(&self) -> &str;
}

fn oracle_err<E: Display>(err: E) -> CoreError {
    CoreError::Oracle(err.to_string())
}

/// Exported Bayesian ridge regression
///
/// `sigma` is the posterior covariance of the coefficients and `alpha` the
/// noise precision, so the predictive variance is 1/alpha + xᵀΣx.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BayesianRidgeModel {
    pub intercept: f64,
    pub coef: Vec<f64>,
    pub alpha: f64,
    pub sigma: Vec<Vec<f64>>,
}

/// Linear-Gaussian oracle evaluated in process
#[derive(Debug, Clone)]
pub struct BayesianRidgeOracle {
    model: BayesianRidgeModel,
}

impl BayesianRidgeOracle {
    pub fn new(model: BayesianRidgeModel) -> Result<Self, CoreError> {
        let n = model.coef.len();
        if n == 0 {
            return Err(CoreError::Oracle("model has no coefficients".to_string()));
        }
        if model.sigma.len() != n || model.sigma.iter().any(|row| row.len() != n) {
            return Err(CoreError::Oracle(format!(
                "covariance must be {}x{} to match the coefficients",
                n, n
            )));
        }
        if !(model.alpha > 0.0 && model.alpha.is_finite()) {
            return Err(CoreError::Oracle(format!(
                "noise precision must be positive, got {}",
                model.alpha
            )));
        }
        Ok(Self { model })
    }

    /// Load a JSON export
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CoreError> {
        let path = path.as_ref();
        info!("Loading Bayesian ridge model: {:?}", path);
        let content = fs::read_to_string(path)
            .map_err(|e| CoreError::Oracle(format!("failed to read {:?}: {}", path, e)))?;
        let model: BayesianRidgeModel = serde_json::from_str(&content).map_err(oracle_err)?;
        Self::new(model)
    }

    pub fn num_features(&self) -> usize {
        self.model.coef.len()
    }
}

impl PredictionOracle for BayesianRidgeOracle {
    fn predict(&self, features: &[f64]) -> Result<PointEstimate, CoreError> {
        if features.len() != self.num_features() {
            return Err(CoreError::Oracle(format!(
                "expected {} features, got {}",
                self.num_features(),
                features.len()
            )));
        }

        let value = self.model.intercept
            + features
                .iter()
                .zip(&self.model.coef)
                .map(|(x, c)| x * c)
                .sum::<f64>();

        let quadratic: f64 = self
            .model
            .sigma
            .iter()
            .zip(features)
            .map(|(row, xi)| xi * row.iter().zip(features).map(|(s, xj)| s * xj).sum::<f64>())
            .sum();
        let variance = (1.0 / self.model.alpha + quadratic).max(0.0);

        Ok(PointEstimate {
            value,
            std_dev: variance.sqrt(),
        })
    }

    fn name(&self) -> &str {
        "bayesian-ridge"
    }
}

/// ONNX model whose single output holds [mean, std]
pub struct OnnxOracle {
    session: Mutex<Session>,
}

impl OnnxOracle {
    /// Create a new oracle by loading an ONNX model file
    pub fn load<P: AsRef<Path>>(model_path: P) -> Result<Self, CoreError> {
        let model_path = model_path.as_ref();
        info!("Loading model: {:?}", model_path);

        let session = Session::builder()
            .map_err(oracle_err)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(oracle_err)?
            .commit_from_file(model_path)
            .map_err(oracle_err)?;

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl PredictionOracle for OnnxOracle {
    fn predict(&self, features: &[f64]) -> Result<PointEstimate, CoreError> {
        let input_vec: Vec<f32> = features.iter().map(|&x| x as f32).collect();
        let input_tensor =
            Tensor::from_array(([1usize, features.len()], input_vec)).map_err(oracle_err)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| CoreError::Oracle("model session lock poisoned".to_string()))?;
        let outputs = session
            .run(ort::inputs!["input" => input_tensor])
            .map_err(oracle_err)?;
        let (_, output_data) = outputs[0].try_extract_tensor::<f32>().map_err(oracle_err)?;

        match output_data {
            [value, std_dev, ..] => Ok(PointEstimate {
                value: *value as f64,
                std_dev: *std_dev as f64,
            }),
            _ => Err(CoreError::Oracle(format!(
                "expected [mean, std] output, got {} values",
                output_data.len()
            ))),
        }
    }

    fn name(&self) -> &str {
        "onnx"
    }
}

/// Pick an oracle implementation from the model file extension
pub fn load_oracle<P: AsRef<Path>>(path: P) -> Result<Box<dyn PredictionOracle>, CoreError> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some("onnx") => Ok(Box::new(OnnxOracle::load(path)?)),
        Some("json") => Ok(Box::new(BayesianRidgeOracle::load(path)?)),
        _ => Err(CoreError::Oracle(format!(
            "unsupported model file {:?} (expected .onnx or .json)",
            path
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn model() -> BayesianRidgeModel {
        BayesianRidgeModel {
            intercept: 0.5,
            coef: vec![1.0, -2.0],
            alpha: 0.25,
            sigma: vec![vec![0.5, 0.1], vec![0.1, 0.2]],
        }
    }

    #[test]
    fn test_bayesian_ridge_mean_and_std() {
        let oracle = BayesianRidgeOracle::new(model()).unwrap();
        let estimate = oracle.predict(&[1.0, 2.0]).unwrap();

        // 0.5 + 1 - 4
        assert!((estimate.value + 2.5).abs() < 1e-12);
        // 1/0.25 + (0.5 + 2*0.1*2 + 0.2*4) = 4 + 1.7
        assert!((estimate.std_dev - 5.7f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_zero_features_leave_noise_only() {
        let oracle = BayesianRidgeOracle::new(model()).unwrap();
        let estimate = oracle.predict(&[0.0, 0.0]).unwrap();
        assert_eq!(estimate.value, 0.5);
        assert!((estimate.std_dev - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_feature_count_mismatch() {
        let oracle = BayesianRidgeOracle::new(model()).unwrap();
        let err = oracle.predict(&[1.0]).unwrap_err();
        assert!(matches!(err, CoreError::Oracle(_)));
    }

    #[test]
    fn test_invalid_model_rejected() {
        let mut bad = model();
        bad.sigma.pop();
        assert!(BayesianRidgeOracle::new(bad).is_err());

        let mut bad = model();
        bad.alpha = 0.0;
        assert!(BayesianRidgeOracle::new(bad).is_err());
    }

    #[test]
    fn test_load_oracle_from_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(serde_json::to_string(&model()).unwrap().as_bytes())
            .unwrap();
        file.flush().unwrap();

        let oracle = load_oracle(file.path()).unwrap();
        assert_eq!(oracle.name(), "bayesian-ridge");
        assert!(oracle.predict(&[0.0, 0.0]).is_ok());
    }

    #[test]
    fn test_load_oracle_rejects_unknown_extension() {
        assert!(load_oracle("model.pkl").is_err());
    }
}
