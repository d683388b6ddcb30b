//! Core betting-decision logic

pub mod distribution;
pub mod error;
pub mod kelly;
pub mod odds;
pub mod spread;

// Re-export commonly used types
pub use distribution::SkewNormal;
pub use error::{CoreError, ValidationError};
pub use kelly::{
    calculate_kelly_fraction, expected_log_growth, BetCandidate, KellyAllocation, KellyOptimizer,
    SolverConfig,
};
pub use odds::{american_to_decimal, american_to_implied};
pub use spread::{BetRecommendation, SpreadConvention, SpreadEngine};
