//! Prediction context
//!
//! Everything a request needs, built once at startup and shared read-only.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::core::{
    BetRecommendation, CoreError, KellyAllocation, KellyOptimizer, SpreadConvention, SpreadEngine,
};
use crate::data::{FeatureProvider, FeatureStore};
use crate::predictor::{load_oracle, PointEstimate, PredictionOracle};
use crate::validation::{ValidatedKellyRequest, ValidatedPredictQuery};

/// Decimal places kept in allocation responses
pub const ALLOCATION_DECIMALS: i32 = 4;

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Oracle output plus the betting edge derived from it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GamePrediction {
    pub estimate: PointEstimate,
    pub recommendation: BetRecommendation,
}

/// Rounded allocations ready for a response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSizing {
    pub allocations: Vec<f64>,
    pub total_fraction: f64,
}

impl PortfolioSizing {
    pub fn from_allocation(allocation: &KellyAllocation) -> Self {
        let allocations: Vec<f64> = allocation
            .fractions
            .iter()
            .map(|f| round_to(*f, ALLOCATION_DECIMALS))
            .collect();
        let total_fraction = round_to(allocations.iter().sum(), ALLOCATION_DECIMALS);
        Self {
            allocations,
            total_fraction,
        }
    }
}

/// Solve a validated Kelly request and round the result
pub fn optimize_portfolio(
    optimizer: &KellyOptimizer,
    request: &ValidatedKellyRequest,
) -> Result<PortfolioSizing, CoreError> {
    let allocation = optimizer.optimize(
        &request.probabilities,
        &request.odds,
        request.kelly_fraction,
    )?;
    Ok(PortfolioSizing::from_allocation(&allocation))
}

/// Oracle output must be usable before it reaches the spread engine.
/// An exact-zero margin is left to the engine.
fn check_estimate(estimate: &PointEstimate, oracle: &str) -> Result<(), CoreError> {
    if !estimate.value.is_finite() {
        return Err(CoreError::Oracle(format!(
            "{} returned a non-finite margin ({})",
            oracle, estimate.value
        )));
    }
    if !(estimate.std_dev.is_finite() && estimate.std_dev > 0.0) {
        return Err(CoreError::Oracle(format!(
            "{} returned an unusable standard deviation ({})",
            oracle, estimate.std_dev
        )));
    }
    Ok(())
}

/// Immutable collaborators for game predictions
pub struct PredictionContext {
    oracle: Box<dyn PredictionOracle>,
    features: Box<dyn FeatureProvider>,
    engine: SpreadEngine,
}

impl PredictionContext {
    pub fn new(
        oracle: Box<dyn PredictionOracle>,
        features: Box<dyn FeatureProvider>,
        engine: SpreadEngine,
    ) -> Self {
        Self {
            oracle,
            features,
            engine,
        }
    }

    /// Load the model file and feature tables from disk
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        model_path: P,
        data_dir: Q,
        convention: SpreadConvention,
    ) -> Result<Self, CoreError> {
        let oracle = load_oracle(model_path)?;
        let features = FeatureStore::load(data_dir)?;
        info!(
            "Prediction context ready (oracle: {}, run line convention: {:?})",
            oracle.name(),
            convention
        );
        Ok(Self::new(
            oracle,
            Box::new(features),
            SpreadEngine::new(convention),
        ))
    }

    pub fn engine(&self) -> &SpreadEngine {
        &self.engine
    }

    /// Features, then oracle, then the spread engine
    pub fn predict_game(&self, query: &ValidatedPredictQuery) -> Result<GamePrediction, CoreError> {
        let features = self.features.feature_row(&query.matchup)?;
        let estimate = self.oracle.predict(&features)?;
        check_estimate(&estimate, self.oracle.name())?;
        debug!(
            away = %query.matchup.away_team,
            home = %query.matchup.home_team,
            y_pred = estimate.value,
            y_std = estimate.std_dev,
            "oracle estimate"
        );

        let recommendation = self.engine.evaluate(
            estimate.value,
            estimate.std_dev,
            query.run_line,
            query.away_odds,
            query.home_odds,
        )?;

        Ok(GamePrediction {
            estimate,
            recommendation,
        })
    }
}
