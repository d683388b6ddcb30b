//! Runline - MLB run line betting edge engine
//!
//! This library provides:
//! - Skew-normal cover probabilities for a predicted run differential
//! - Profitability edges against American odds
//! - Kelly portfolio sizing under a shared bankroll
//! - Feature table loading and margin prediction oracles
//!
//! # Example
//!
//! ```
//! use runline::core::{KellyOptimizer, SpreadEngine};
//!
//! let engine = SpreadEngine::default();
//! let rec = engine.evaluate(1.2, 3.8, -1.5, 140.0, -160.0).unwrap();
//! assert!((rec.p_away + rec.p_home - 1.0).abs() < 1e-9);
//!
//! let allocation = KellyOptimizer::default()
//!     .optimize(&[0.6, 0.55], &[100.0, 150.0], 0.5)
//!     .unwrap();
//! assert!(allocation.total() <= 0.5 + 1e-9);
//! ```

pub mod config;
pub mod context;
pub mod core;
pub mod data;
pub mod models;
pub mod predictor;
pub mod validation;

// API-specific modules (only available with api feature)
#[cfg(feature = "api")]
pub mod error;
#[cfg(feature = "api")]
pub mod handlers;

// Re-export commonly used types
pub use config::ServerConfig;
pub use context::{optimize_portfolio, GamePrediction, PortfolioSizing, PredictionContext};
pub use models::{HealthResponse, KellyRequest, KellyResponse, PredictQuery, PredictResponse};
pub use predictor::{load_oracle, BayesianRidgeOracle, OnnxOracle, PointEstimate, PredictionOracle};
