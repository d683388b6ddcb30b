use serde::{Deserialize, Serialize};

use crate::core::BetRecommendation;

/// Game prediction query (`GET /predict`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictQuery {
    pub away_team: String,
    pub home_team: String,
    pub away_pitcher: String,
    pub home_pitcher: String,
    #[serde(rename = "runLine")]
    pub run_line: f64,
    pub away_odds: f64,
    pub home_odds: f64,
}

/// Game prediction response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub y_pred: f64,
    pub y_std: f64,
    pub bet_recommendation: BetRecommendation,
}

fn default_kelly_fraction() -> f64 {
    1.0
}

/// Portfolio sizing request (`POST /kelly-optimize`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KellyRequest {
    pub probabilities: Vec<f64>,
    pub odds: Vec<f64>,
    #[serde(default = "default_kelly_fraction")]
    pub kelly_fraction: f64,
}

/// Portfolio sizing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KellyResponse {
    pub allocations: Vec<f64>,
    pub total_fraction: f64,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model_loaded: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
