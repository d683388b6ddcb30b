//! Kelly Criterion Portfolio Sizing
//!
//! Bankroll fractions for several simultaneous, independent bets that
//! maximize expected log growth:
//!     max  Σ p_i·ln(1 + f_i·b_i) + (1 - p_i)·ln(1 - f_i)
//!     s.t. Σ f_i <= 1,  f_i >= 0
//!
//! Where:
//!     f_i = fraction of bankroll staked on bet i
//!     p_i = probability that bet i wins
//!     b_i = decimal odds - 1 (net odds)
//!
//! The objective is separable, so the budget constraint is handled through
//! its Lagrange multiplier λ: each bet's stake solves
//!     p·b / (1 + f·b) - (1 - p) / (1 - f) = λ
//! and λ is bisected until the budget is met (λ = 0 when it is slack).

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::{CoreError, ValidationError};
use super::odds::american_to_decimal;

/// Bisection steps for a single stake; enough to exhaust f64 precision on [0, 1)
const STAKE_BISECTION_STEPS: usize = 128;

/// Calculate Kelly fraction for a single bet
///
/// # Arguments
/// * `probability` - Estimated probability of winning (0-1)
/// * `odds` - Decimal odds (e.g., 2.5 = 2.5x return)
///
/// # Returns
/// Kelly fraction (negative when the bet has no edge)
///
/// # Examples
/// ```
/// use runline::core::kelly::calculate_kelly_fraction;
/// let kelly = calculate_kelly_fraction(0.6, 2.5);
/// assert!((kelly - 1.0 / 3.0).abs() < 1e-12);
/// ```
pub fn calculate_kelly_fraction(probability: f64, odds: f64) -> f64 {
    if odds <= 1.0 {
        return 0.0;
    }

    // f* = p - (1 - p) / (odds - 1)
    probability - (1.0 - probability) / (odds - 1.0)
}

/// Expected log growth of staking `fraction` on one bet
///
/// Staking the whole bankroll on a bet that can lose yields `-inf`.
pub fn expected_log_growth(probability: f64, odds: f64, fraction: f64) -> f64 {
    let win = probability * (fraction * (odds - 1.0)).ln_1p();
    let lose = if probability < 1.0 {
        (1.0 - probability) * (-fraction).ln_1p()
    } else {
        0.0
    };
    win + lose
}

/// A bet the optimizer may fund
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetCandidate {
    pub probability: f64,
    pub american_odds: f64,
}

/// Check a batch before any solving happens
pub fn validate_candidates(
    probabilities: &[f64],
    american_odds: &[f64],
    kelly_fraction: f64,
) -> Result<(), ValidationError> {
    if probabilities.is_empty() || american_odds.is_empty() {
        return Err(ValidationError::EmptyBatch);
    }
    if probabilities.len() != american_odds.len() {
        return Err(ValidationError::LengthMismatch {
            probabilities: probabilities.len(),
            odds: american_odds.len(),
        });
    }
    for (index, &value) in probabilities.iter().enumerate() {
        if !(value > 0.0 && value < 1.0) {
            return Err(ValidationError::ProbabilityOutOfRange { index, value });
        }
    }
    for (index, &value) in american_odds.iter().enumerate() {
        if !value.is_finite() || value == 0.0 {
            return Err(ValidationError::InvalidOdds { index, value });
        }
    }
    if !(kelly_fraction > 0.0 && kelly_fraction <= 1.0) {
        return Err(ValidationError::KellyFractionOutOfRange(kelly_fraction));
    }
    Ok(())
}

/// Solver limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Maximum bisection steps on the budget multiplier
    pub max_iterations: usize,
    /// Accepted slack between the allocated total and the budget
    pub tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-10,
        }
    }
}

/// Optimizer output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KellyAllocation {
    /// Full-Kelly solution, sums to at most 1
    pub raw: Vec<f64>,
    /// `raw` scaled by `kelly_fraction`
    pub fractions: Vec<f64>,
    pub kelly_fraction: f64,
    /// Objective value at `raw`
    pub expected_log_growth: f64,
    /// Whether the budget constraint was active
    pub budget_binding: bool,
}

impl KellyAllocation {
    pub fn total(&self) -> f64 {
        self.fractions.iter().sum()
    }
}

#[derive(Debug, Clone, Copy)]
struct PreparedBet {
    probability: f64,
    decimal_odds: f64,
}

impl PreparedBet {
    fn net_odds(&self) -> f64 {
        self.decimal_odds - 1.0
    }

    /// d/df of the bet's log-growth term
    fn marginal_growth(&self, fraction: f64) -> f64 {
        let b = self.net_odds();
        self.probability * b / (1.0 + fraction * b) - (1.0 - self.probability) / (1.0 - fraction)
    }

    /// Stake at which marginal growth equals `lambda`
    fn stake_at(&self, lambda: f64) -> f64 {
        if self.marginal_growth(0.0) <= lambda {
            return 0.0;
        }

        // Marginal growth falls to -inf as f -> 1, so the root is interior
        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        for _ in 0..STAKE_BISECTION_STEPS {
            let mid = 0.5 * (lo + hi);
            if mid <= lo || mid >= hi {
                break;
            }
            if self.marginal_growth(mid) > lambda {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        lo
    }
}

/// Multi-bet Kelly optimizer
#[derive(Debug, Clone, Default)]
pub struct KellyOptimizer {
    config: SolverConfig,
}

impl KellyOptimizer {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Optimal bankroll fractions, scaled by `kelly_fraction` afterwards
    pub fn optimize(
        &self,
        probabilities: &[f64],
        american_odds: &[f64],
        kelly_fraction: f64,
    ) -> Result<KellyAllocation, CoreError> {
        validate_candidates(probabilities, american_odds, kelly_fraction)?;

        let bets = probabilities
            .iter()
            .zip(american_odds)
            .map(|(&probability, &odds)| {
                Ok(PreparedBet {
                    probability,
                    decimal_odds: american_to_decimal(odds)?,
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        debug!(
            ?probabilities,
            ?american_odds,
            decimal_odds = ?bets.iter().map(|b| b.decimal_odds).collect::<Vec<_>>(),
            kelly_fraction,
            "optimizing kelly portfolio"
        );

        let (raw, budget_binding) = self.solve(&bets)?;

        let growth: f64 = bets
            .iter()
            .zip(&raw)
            .map(|(bet, &f)| expected_log_growth(bet.probability, bet.decimal_odds, f))
            .sum();
        if !growth.is_finite() {
            return Err(CoreError::Optimization(format!(
                "objective is not finite at the solution ({})",
                growth
            )));
        }

        let fractions: Vec<f64> = raw.iter().map(|f| f * kelly_fraction).collect();

        info!(
            bets = bets.len(),
            total = fractions.iter().sum::<f64>(),
            budget_binding,
            "kelly optimization result: {:?}",
            fractions
        );

        Ok(KellyAllocation {
            raw,
            fractions,
            kelly_fraction,
            expected_log_growth: growth,
            budget_binding,
        })
    }

    /// Convenience wrapper over [`KellyOptimizer::optimize`]
    pub fn optimize_candidates(
        &self,
        candidates: &[BetCandidate],
        kelly_fraction: f64,
    ) -> Result<KellyAllocation, CoreError> {
        let probabilities: Vec<f64> = candidates.iter().map(|c| c.probability).collect();
        let odds: Vec<f64> = candidates.iter().map(|c| c.american_odds).collect();
        self.optimize(&probabilities, &odds, kelly_fraction)
    }

    fn stakes_at(bets: &[PreparedBet], lambda: f64) -> Vec<f64> {
        bets.iter().map(|b| b.stake_at(lambda)).collect()
    }

    fn solve(&self, bets: &[PreparedBet]) -> Result<(Vec<f64>, bool), CoreError> {
        let unconstrained = Self::stakes_at(bets, 0.0);
        let total: f64 = unconstrained.iter().sum();
        if total <= 1.0 {
            return Self::checked(unconstrained, false);
        }

        // Budget binds: find λ > 0 with Σ f(λ) = 1
        let mut lo = 0.0_f64;
        let mut hi = bets
            .iter()
            .map(|b| b.marginal_growth(0.0))
            .fold(0.0_f64, f64::max);
        let mut stakes = vec![0.0; bets.len()];

        for iteration in 0..self.config.max_iterations {
            let lambda = 0.5 * (lo + hi);
            let trial = Self::stakes_at(bets, lambda);
            let total: f64 = trial.iter().sum();

            if total > 1.0 {
                lo = lambda;
            } else {
                hi = lambda;
                stakes = trial;
                if 1.0 - total <= self.config.tolerance {
                    debug!(iteration, lambda, "budget multiplier converged");
                    return Self::checked(stakes, true);
                }
            }
        }

        Err(CoreError::Optimization(format!(
            "budget multiplier did not converge after {} iterations (allocated {:.12})",
            self.config.max_iterations,
            stakes.iter().sum::<f64>()
        )))
    }

    fn checked(stakes: Vec<f64>, binding: bool) -> Result<(Vec<f64>, bool), CoreError> {
        if let Some(bad) = stakes.iter().find(|f| !f.is_finite() || **f < 0.0) {
            return Err(CoreError::Optimization(format!(
                "solver produced an invalid stake {}",
                bad
            )));
        }
        let total: f64 = stakes.iter().sum();
        if total > 1.0 + 1e-12 {
            return Err(CoreError::Optimization(format!(
                "allocation {} exceeds the bankroll",
                total
            )));
        }
        Ok((stakes, binding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kelly_fraction_positive_ev() {
        // p = 0.6 at +150 (decimal 2.5)
        let kelly = calculate_kelly_fraction(0.6, 2.5);
        assert!((kelly - 0.3333).abs() < 0.0001);
    }

    #[test]
    fn test_kelly_fraction_negative_ev() {
        let kelly = calculate_kelly_fraction(0.3, 2.0);
        assert!(kelly < 0.0);
    }

    #[test]
    fn test_kelly_fraction_no_profit_odds() {
        assert_eq!(calculate_kelly_fraction(0.9, 1.0), 0.0);
    }

    #[test]
    fn test_log_growth_diverges_at_full_stake() {
        let growth = expected_log_growth(0.6, 2.5, 1.0);
        assert!(growth.is_infinite() && growth < 0.0);
        assert_eq!(expected_log_growth(0.6, 2.5, 0.0), 0.0);
    }

    #[test]
    fn test_single_bet_matches_closed_form() {
        let optimizer = KellyOptimizer::default();
        let result = optimizer.optimize(&[0.6], &[150.0], 1.0).unwrap();
        let expected = calculate_kelly_fraction(0.6, 2.5);
        assert!((result.fractions[0] - expected).abs() < 1e-9);
        assert!(!result.budget_binding);
    }

    #[test]
    fn test_single_bet_closed_form_for_favorite() {
        let optimizer = KellyOptimizer::default();
        let result = optimizer.optimize(&[0.7], &[-150.0], 1.0).unwrap();
        let expected = calculate_kelly_fraction(0.7, american_to_decimal(-150.0).unwrap());
        assert!((result.raw[0] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_no_edge_gets_nothing() {
        let optimizer = KellyOptimizer::default();
        let result = optimizer.optimize(&[0.4, 0.45], &[100.0, -110.0], 1.0).unwrap();
        assert_eq!(result.fractions, vec![0.0, 0.0]);
        assert_eq!(result.total(), 0.0);
    }

    #[test]
    fn test_budget_binds_for_strong_bets() {
        let optimizer = KellyOptimizer::default();
        let probabilities = [0.9, 0.85, 0.8, 0.88];
        let odds = [200.0, 180.0, 250.0, 150.0];
        let result = optimizer.optimize(&probabilities, &odds, 1.0).unwrap();

        assert!(result.budget_binding);
        assert!(result.fractions.iter().all(|f| *f >= 0.0));
        let total = result.total();
        assert!(total <= 1.0 + 1e-9);
        assert!(total > 1.0 - 1e-6);
    }

    #[test]
    fn test_binding_solution_equalizes_marginal_growth() {
        let optimizer = KellyOptimizer::default();
        let result = optimizer
            .optimize(&[0.9, 0.85, 0.8], &[200.0, 180.0, 250.0], 1.0)
            .unwrap();
        let marginals: Vec<f64> = [(0.9, 3.0), (0.85, 2.8), (0.8, 3.5)]
            .iter()
            .zip(&result.raw)
            .filter(|(_, f)| **f > 0.0)
            .map(|(&(p, o), &f)| {
                PreparedBet {
                    probability: p,
                    decimal_odds: o,
                }
                .marginal_growth(f)
            })
            .collect();
        for m in &marginals {
            assert!((m - marginals[0]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_kelly_fraction_scales_linearly() {
        let optimizer = KellyOptimizer::default();
        let probabilities = [0.6, 0.55, 0.52];
        let odds = [100.0, -110.0, 150.0];
        let full = optimizer.optimize(&probabilities, &odds, 1.0).unwrap();
        let quarter = optimizer.optimize(&probabilities, &odds, 0.25).unwrap();

        for (f, q) in full.fractions.iter().zip(&quarter.fractions) {
            assert!((f * 0.25 - q).abs() < 1e-15);
        }
        assert_eq!(full.raw, quarter.raw);
    }

    #[test]
    fn test_half_kelly_scenario() {
        let optimizer = KellyOptimizer::default();
        let result = optimizer
            .optimize(&[0.6, 0.55, 0.52], &[100.0, -110.0, 150.0], 0.5)
            .unwrap();

        assert!(result.fractions.iter().all(|f| *f >= 0.0));
        assert!(result.raw.iter().sum::<f64>() <= 1.0 + 1e-9);
        assert!(result.total() <= 0.5 + 1e-9);
        assert!(result.expected_log_growth > 0.0);
    }

    #[test]
    fn test_even_money_odds_with_zero_profit() {
        // Decimal odds of 1 + 1e-10: practically no profit on a win
        let optimizer = KellyOptimizer::default();
        let result = optimizer.optimize(&[0.99], &[-1e12], 1.0).unwrap();
        assert!(result.fractions[0] < 1e-6);
    }

    #[test]
    fn test_validation_failures() {
        let optimizer = KellyOptimizer::default();
        assert!(matches!(
            optimizer.optimize(&[], &[], 1.0),
            Err(CoreError::InvalidInput(ValidationError::EmptyBatch))
        ));
        assert!(matches!(
            optimizer.optimize(&[0.6, 0.5], &[100.0], 1.0),
            Err(CoreError::InvalidInput(ValidationError::LengthMismatch { .. }))
        ));
        assert!(optimizer.optimize(&[1.0], &[100.0], 1.0).is_err());
        assert!(optimizer.optimize(&[0.0], &[100.0], 1.0).is_err());
        assert!(optimizer.optimize(&[0.6], &[0.0], 1.0).is_err());
        assert!(optimizer.optimize(&[0.6], &[100.0], 0.0).is_err());
        assert!(optimizer.optimize(&[0.6], &[100.0], 1.5).is_err());
    }

    #[test]
    fn test_non_convergence_is_an_error() {
        let optimizer = KellyOptimizer::new(SolverConfig {
            max_iterations: 1,
            tolerance: 0.0,
        });
        let err = optimizer
            .optimize(&[0.9, 0.85, 0.8], &[200.0, 180.0, 250.0], 1.0)
            .unwrap_err();
        assert!(matches!(err, CoreError::Optimization(_)));
    }

    #[test]
    fn test_candidates_wrapper() {
        let optimizer = KellyOptimizer::default();
        let candidates = [BetCandidate {
            probability: 0.6,
            american_odds: 150.0,
        }];
        let result = optimizer.optimize_candidates(&candidates, 1.0).unwrap();
        assert!((result.fractions[0] - 1.0 / 3.0).abs() < 1e-9);
    }
}
