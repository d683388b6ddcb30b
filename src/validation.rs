//! Request validation
//!
//! Runs before any model or solver work. Each check yields either a
//! validated value with precise types or the first reason it was rejected.

use crate::core::kelly::validate_candidates;
use crate::core::ValidationError;
use crate::data::team_acronym;
use crate::models::{KellyRequest, PredictQuery};

/// Teams and starting pitchers for one game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matchup {
    pub away_team: String,
    pub home_team: String,
    pub away_pitcher: String,
    pub home_pitcher: String,
}

/// Prediction query that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPredictQuery {
    pub matchup: Matchup,
    pub run_line: f64,
    pub away_odds: f64,
    pub home_odds: f64,
}

/// Kelly request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedKellyRequest {
    pub probabilities: Vec<f64>,
    pub odds: Vec<f64>,
    pub kelly_fraction: f64,
}

fn required_name(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName { field });
    }
    Ok(trimmed.to_string())
}

/// Full franchise names become acronyms; unknown names pass through
fn team_name(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let name = required_name(value, field)?;
    Ok(team_acronym(&name).map(str::to_string).unwrap_or(name))
}

fn finite(value: f64, field: &'static str) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite { field, value });
    }
    Ok(value)
}

fn odds(value: f64, field: &'static str) -> Result<f64, ValidationError> {
    if finite(value, field)? == 0.0 {
        return Err(ValidationError::ZeroOdds { field });
    }
    Ok(value)
}

pub fn validate_predict_query(query: &PredictQuery) -> Result<ValidatedPredictQuery, ValidationError> {
    let matchup = Matchup {
        away_team: team_name(&query.away_team, "away_team")?,
        home_team: team_name(&query.home_team, "home_team")?,
        away_pitcher: required_name(&query.away_pitcher, "away_pitcher")?,
        home_pitcher: required_name(&query.home_pitcher, "home_pitcher")?,
    };
    if matchup.away_team == matchup.home_team {
        return Err(ValidationError::SameTeam(matchup.away_team));
    }

    Ok(ValidatedPredictQuery {
        matchup,
        run_line: finite(query.run_line, "runLine")?,
        away_odds: odds(query.away_odds, "away_odds")?,
        home_odds: odds(query.home_odds, "home_odds")?,
    })
}

pub fn validate_kelly_request(request: &KellyRequest) -> Result<ValidatedKellyRequest, ValidationError> {
    validate_candidates(&request.probabilities, &request.odds, request.kelly_fraction)?;
    Ok(ValidatedKellyRequest {
        probabilities: request.probabilities.clone(),
        odds: request.odds.clone(),
        kelly_fraction: request.kelly_fraction,
    })
}
