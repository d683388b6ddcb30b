//! Spread Probability Engine
//!
//! Turns a predicted run differential (away - home) and its uncertainty into
//! cover probabilities for both sides of a run line, then compares them with
//! the bookmaker-implied probabilities.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use super::distribution::SkewNormal;
use super::error::{CoreError, ValidationError};
use super::odds::american_to_implied_for;

/// Magnitude of the skew applied toward the favored side
pub const DEFAULT_SKEW_MAGNITUDE: f64 = 0.25;

/// Which side the quoted run line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpreadConvention {
    /// Line is the away team's handicap: away covers when margin > -line
    #[default]
    Away,
    /// Line is the home team's handicap: away covers when margin > line
    Home,
}

impl SpreadConvention {
    /// Margin (away - home) the away side has to exceed to cover
    pub fn away_threshold(self, spread_line: f64) -> f64 {
        match self {
            SpreadConvention::Away => -spread_line,
            SpreadConvention::Home => spread_line,
        }
    }
}

impl FromStr for SpreadConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "away" => Ok(SpreadConvention::Away),
            "home" => Ok(SpreadConvention::Home),
            other => Err(format!("unknown spread convention '{}'", other)),
        }
    }
}

/// Per-game betting edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetRecommendation {
    pub p_away: f64,
    pub p_home: f64,
    pub away_profitability: f64,
    pub home_profitability: f64,
}

impl BetRecommendation {
    /// Side with the larger positive edge, if any
    pub fn best_side(&self) -> Option<(&'static str, f64)> {
        let (side, edge) = if self.away_profitability >= self.home_profitability {
            ("away", self.away_profitability)
        } else {
            ("home", self.home_profitability)
        };
        (edge > 0.0).then_some((side, edge))
    }
}

/// Skew-normal cover model
#[derive(Debug, Clone, Copy)]
pub struct SpreadEngine {
    skew_magnitude: f64,
    convention: SpreadConvention,
}

impl SpreadEngine {
    pub fn new(convention: SpreadConvention) -> Self {
        Self {
            skew_magnitude: DEFAULT_SKEW_MAGNITUDE,
            convention,
        }
    }

    pub fn convention(&self) -> SpreadConvention {
        self.convention
    }

    /// Skew follows the sign of the predicted margin
    pub fn skew_for(&self, predicted_margin: f64) -> Result<f64, CoreError> {
        if !predicted_margin.is_finite() {
            return Err(ValidationError::NonFinite {
                field: "predicted_margin",
                value: predicted_margin,
            }
            .into());
        }
        if predicted_margin == 0.0 {
            return Err(ValidationError::ZeroMargin.into());
        }
        Ok(predicted_margin.signum() * self.skew_magnitude)
    }

    /// Cover probabilities and edges for both sides
    pub fn evaluate(
        &self,
        predicted_margin: f64,
        margin_uncertainty: f64,
        spread_line: f64,
        away_odds: f64,
        home_odds: f64,
    ) -> Result<BetRecommendation, CoreError> {
        if margin_uncertainty.is_nan() || margin_uncertainty <= 0.0 {
            return Err(ValidationError::NonPositiveUncertainty(margin_uncertainty).into());
        }
        if !spread_line.is_finite() {
            return Err(ValidationError::NonFinite {
                field: "runLine",
                value: spread_line,
            }
            .into());
        }
        let skew = self.skew_for(predicted_margin)?;
        let away_implied = american_to_implied_for(away_odds, "away_odds")?;
        let home_implied = american_to_implied_for(home_odds, "home_odds")?;

        let dist = SkewNormal::new(skew, predicted_margin, margin_uncertainty)?;
        let p_away = dist.sf(self.convention.away_threshold(spread_line));
        let p_home = 1.0 - p_away;

        debug!(
            predicted_margin,
            margin_uncertainty, spread_line, skew, p_away, "evaluated run line"
        );

        Ok(BetRecommendation {
            p_away,
            p_home,
            away_profitability: p_away - away_implied,
            home_profitability: p_home - home_implied,
        })
    }
}

impl Default for SpreadEngine {
    fn default() -> Self {
        Self::new(SpreadConvention::default())
    }
}
