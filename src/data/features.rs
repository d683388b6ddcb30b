//! Feature rows for the margin model
//!
//! One row per game: home batting, away batting, games played, home starter,
//! away starter. Every column is z-normalized with the saved training
//! statistics.

use std::path::Path;
use tracing::info;

use super::csv_loader::{
    BattingTable, NormalizationParams, PitcherLine, PitchingTable, TeamBatting, BATTING_STATS,
    PITCHING_STATS,
};
use crate::core::CoreError;
use crate::validation::Matchup;

/// Number of features expected by the model
pub const NUM_FEATURES: usize = 2 * BATTING_STATS.len() + 1 + 2 * PITCHING_STATS.len();

/// Games-played feature; always zero at prediction time
pub const GAMES_FEATURE: &str = "Number_of_Games";

pub const BATTING_FILE: &str = "batting.csv";
pub const PITCHING_FILE: &str = "pitching.csv";
pub const NORMALIZATION_FILE: &str = "normalization_params.csv";

/// Feature names in model order
pub fn feature_names() -> Vec<String> {
    let mut names = Vec::with_capacity(NUM_FEATURES);
    for side in ["home", "away"] {
        names.extend(BATTING_STATS.iter().map(|s| format!("{}_{}", side, s)));
    }
    names.push(GAMES_FEATURE.to_string());
    for side in ["home", "away"] {
        names.extend(PITCHING_STATS.iter().map(|s| format!("{}_{}", side, s)));
    }
    names
}

/// Supplies one normalized feature row per game
pub trait FeatureProvider: Send + Sync {
    fn feature_row(&self, matchup: &Matchup) -> Result<Vec<f64>, CoreError>;
}

fn exactly_one<'a, T>(matches: Vec<&'a T>, label: &str, key: &str) -> Result<&'a T, CoreError> {
    match matches.as_slice() {
        [row] => Ok(*row),
        rows => Err(CoreError::UpstreamData(format!(
            "{} returned {} rows for '{}', expected exactly 1",
            label,
            rows.len(),
            key
        ))),
    }
}

/// In-memory feature tables loaded once at startup
#[derive(Debug, Clone)]
pub struct FeatureStore {
    batting: BattingTable,
    pitching: PitchingTable,
    /// (mean, std) aligned with [`feature_names`]
    normalization: Vec<(f64, f64)>,
}

impl FeatureStore {
    pub fn new(
        batting: BattingTable,
        pitching: PitchingTable,
        params: &NormalizationParams,
    ) -> Result<Self, CoreError> {
        let normalization = feature_names()
            .iter()
            .map(|name| match params.get(name) {
                Some((_, std)) if std == 0.0 || !std.is_finite() => Err(CoreError::UpstreamData(
                    format!("normalization std for '{}' is {}", name, std),
                )),
                Some(pair) => Ok(pair),
                None => Err(CoreError::UpstreamData(format!(
                    "no normalization parameters for '{}'",
                    name
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            batting,
            pitching,
            normalization,
        })
    }

    /// Load `batting.csv`, `pitching.csv` and `normalization_params.csv`
    pub fn load<P: AsRef<Path>>(data_dir: P) -> Result<Self, CoreError> {
        let dir = data_dir.as_ref();
        info!("Loading feature tables from {:?}", dir);

        let batting = BattingTable::load(dir.join(BATTING_FILE))?;
        let pitching = PitchingTable::load(dir.join(PITCHING_FILE))?;
        let params = NormalizationParams::load(dir.join(NORMALIZATION_FILE))?;
        Self::new(batting, pitching, &params)
    }

    pub fn teams(&self) -> Vec<&str> {
        let mut teams = self.batting.teams();
        teams.sort_unstable();
        teams
    }

    fn team(&self, team: &str, label: &str) -> Result<&TeamBatting, CoreError> {
        exactly_one(self.batting.matching(team), label, team)
    }

    fn pitcher(&self, player: &str, label: &str) -> Result<&PitcherLine, CoreError> {
        exactly_one(self.pitching.matching(player), label, player)
    }

    /// Raw (unnormalized) row in model order
    pub fn raw_row(&self, matchup: &Matchup) -> Result<Vec<f64>, CoreError> {
        let home = self.team(&matchup.home_team, "home_data")?;
        let away = self.team(&matchup.away_team, "away_data")?;
        let home_pitcher = self.pitcher(&matchup.home_pitcher, "home_pitcher_data")?;
        let away_pitcher = self.pitcher(&matchup.away_pitcher, "away_pitcher_data")?;

        let mut row = Vec::with_capacity(NUM_FEATURES);
        row.extend_from_slice(&home.stats);
        row.extend_from_slice(&away.stats);
        row.push(0.0);
        row.extend_from_slice(&home_pitcher.stats);
        row.extend_from_slice(&away_pitcher.stats);
        Ok(row)
    }
}

impl FeatureProvider for FeatureStore {
    fn feature_row(&self, matchup: &Matchup) -> Result<Vec<f64>, CoreError> {
        let raw = self.raw_row(matchup)?;
        let names = feature_names();

        raw.iter()
            .zip(&self.normalization)
            .zip(&names)
            .map(|((&value, &(mean, std)), name)| {
                if !value.is_finite() {
                    return Err(CoreError::UpstreamData(format!(
                        "missing or non-finite value for '{}'",
                        name
                    )));
                }
                Ok((value - mean) / std)
            })
            .collect()
    }
}
