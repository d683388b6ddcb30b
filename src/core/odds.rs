//! American odds conversions
//!
//! American odds quote either the stake needed to win 100 (negative) or the
//! profit on a 100 stake (positive). Zero has no meaning and is rejected.

use super::error::{CoreError, ValidationError};

fn check_odds(odds: f64, field: &'static str) -> Result<f64, CoreError> {
    if !odds.is_finite() {
        return Err(ValidationError::NonFinite { field, value: odds }.into());
    }
    if odds == 0.0 {
        return Err(ValidationError::ZeroOdds { field }.into());
    }
    Ok(odds)
}

/// Bookmaker-implied win probability, ignoring the vig
///
/// # Examples
/// ```
/// use runline::core::odds::american_to_implied;
/// let p = american_to_implied(-150.0).unwrap();
/// assert!((p - 0.6).abs() < 1e-12);
/// ```
pub fn american_to_implied(odds: f64) -> Result<f64, CoreError> {
    american_to_implied_for(odds, "odds")
}

/// Same as [`american_to_implied`], naming the offending field on failure
pub fn american_to_implied_for(odds: f64, field: &'static str) -> Result<f64, CoreError> {
    let odds = check_odds(odds, field)?;
    Ok(if odds < 0.0 {
        -odds / (-odds + 100.0)
    } else {
        100.0 / (odds + 100.0)
    })
}

/// Decimal odds: total return per unit staked (stake included)
pub fn american_to_decimal(odds: f64) -> Result<f64, CoreError> {
    let odds = check_odds(odds, "odds")?;
    Ok(if odds > 0.0 {
        odds / 100.0 + 1.0
    } else {
        -100.0 / odds + 1.0
    })
}
