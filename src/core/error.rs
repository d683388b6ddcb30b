//! Error taxonomy shared by the core engines, data loading and oracles

use thiserror::Error;

/// Why a caller-supplied value was rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyName { field: &'static str },

    #[error("away team and home team must be different (got {0})")]
    SameTeam(String),

    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} must be nonzero American odds")]
    ZeroOdds { field: &'static str },

    #[error("predicted margin must be nonzero")]
    ZeroMargin,

    #[error("margin uncertainty must be positive, got {0}")]
    NonPositiveUncertainty(f64),

    #[error("distribution scale must be positive, got {0}")]
    NonPositiveScale(f64),

    #[error("at least one bet is required")]
    EmptyBatch,

    #[error("probabilities and odds differ in length ({probabilities} vs {odds})")]
    LengthMismatch { probabilities: usize, odds: usize },

    #[error("probability at index {index} must lie strictly between 0 and 1, got {value}")]
    ProbabilityOutOfRange { index: usize, value: f64 },

    #[error("odds at index {index} must be nonzero and finite, got {value}")]
    InvalidOdds { index: usize, value: f64 },

    #[error("kelly fraction must lie in (0, 1], got {0}")]
    KellyFractionOutOfRange(f64),
}

/// Core failure modes
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("upstream data error: {0}")]
    UpstreamData(String),

    #[error("optimization failed: {0}")]
    Optimization(String),

    #[error("prediction oracle failed: {0}")]
    Oracle(String),
}

impl CoreError {
    /// True when the failure was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(self, CoreError::InvalidInput(_))
    }
}

impl From<polars::prelude::PolarsError> for CoreError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        CoreError::UpstreamData(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_converts_to_invalid_input() {
        let err: CoreError = ValidationError::ZeroMargin.into();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("nonzero"));
    }

    #[test]
    fn test_server_side_errors_are_not_client_errors() {
        assert!(!CoreError::Optimization("diverged".to_string()).is_client_error());
        assert!(!CoreError::UpstreamData("2 rows".to_string()).is_client_error());
        assert!(!CoreError::Oracle("boom".to_string()).is_client_error());
    }

    #[test]
    fn test_length_mismatch_message() {
        let err = ValidationError::LengthMismatch {
            probabilities: 3,
            odds: 2,
        };
        assert_eq!(
            err.to_string(),
            "probabilities and odds differ in length (3 vs 2)"
        );
    }
}
