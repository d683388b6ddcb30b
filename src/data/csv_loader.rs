//! CSV loading for team batting, pitcher and normalization tables

use polars::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use super::teams::team_acronym;
use crate::core::CoreError;

/// Team batting columns in model order
pub const BATTING_STATS: [&str; 18] = [
    "R/G", "PA", "AB", "R", "H", "2B", "3B", "HR", "RBI", "SB", "CS", "BB", "SO", "BA", "OBP",
    "SLG", "OPS", "OPS+",
];

/// Season counting stats converted to per-game rates
pub const PER_GAME_STATS: [&str; 12] = [
    "PA", "AB", "R", "H", "2B", "3B", "HR", "RBI", "SB", "CS", "BB", "SO",
];

/// Starting pitcher columns in model order
pub const PITCHING_STATS: [&str; 5] = ["SO/BB", "ERA+", "WAR", "FIP", "WHIP"];

/// Per-game batting line for one team
#[derive(Debug, Clone, PartialEq)]
pub struct TeamBatting {
    pub team: String,
    pub stats: [f64; BATTING_STATS.len()],
}

/// Season line for one pitcher
#[derive(Debug, Clone, PartialEq)]
pub struct PitcherLine {
    pub player: String,
    pub stats: [f64; PITCHING_STATS.len()],
}

fn read_csv(path: &Path) -> Result<DataFrame, CoreError> {
    let df = LazyCsvReader::new(path)
        .finish()
        .and_then(|lf| lf.collect())
        .map_err(|e| CoreError::UpstreamData(format!("failed to read {:?}: {}", path, e)))?;
    debug!("Loaded {} rows from {:?}", df.height(), path);
    Ok(df)
}

/// Numeric column as f64; nulls and unparsable cells become NaN
fn float_column(df: &DataFrame, name: &str) -> Result<Vec<f64>, CoreError> {
    let series = df
        .column(name)
        .map_err(|_| CoreError::UpstreamData(format!("missing column '{}'", name)))?
        .cast(&DataType::Float64)?;
    Ok(series
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<String>, CoreError> {
    let series = df
        .column(name)
        .map_err(|_| CoreError::UpstreamData(format!("missing column '{}'", name)))?
        .cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or("").to_string())
        .collect())
}

/// Strip the handedness/injury markers baseball-reference appends to names
pub fn clean_player_name(raw: &str) -> String {
    raw.replace(['*', '#'], "").trim().to_string()
}

/// Team batting table keyed by acronym
#[derive(Debug, Clone, Default)]
pub struct BattingTable {
    rows: Vec<TeamBatting>,
}

impl BattingTable {
    /// Load a season batting export (`Tm`, `G` and [`BATTING_STATS`])
    ///
    /// Counting stats are divided by games played. Rows whose team does not
    /// map to a franchise (league totals, averages) are dropped.
    pub fn load<P: AsRef<Path>>(csv_path: P) -> Result<Self, CoreError> {
        let df = read_csv(csv_path.as_ref())?;
        Self::from_dataframe(&df)
    }

    fn from_dataframe(df: &DataFrame) -> Result<Self, CoreError> {
        let teams = string_column(df, "Tm")?;
        let games = float_column(df, "G")?;
        let columns = BATTING_STATS
            .iter()
            .map(|name| float_column(df, name))
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = Vec::with_capacity(df.height());
        for (i, name) in teams.iter().enumerate() {
            let Some(team) = team_acronym(name) else {
                debug!("Skipping unmapped batting row '{}'", name);
                continue;
            };

            let mut stats = [0.0; BATTING_STATS.len()];
            for (j, stat) in BATTING_STATS.iter().enumerate() {
                let value = columns[j][i];
                stats[j] = if PER_GAME_STATS.contains(stat) {
                    value / games[i]
                } else {
                    value
                };
            }

            rows.push(TeamBatting {
                team: team.to_string(),
                stats,
            });
        }

        info!("Batting table: {} teams", rows.len());
        Ok(Self { rows })
    }

    pub fn from_rows(rows: Vec<TeamBatting>) -> Self {
        Self { rows }
    }

    /// Every row for the given acronym
    pub fn matching(&self, team: &str) -> Vec<&TeamBatting> {
        self.rows.iter().filter(|r| r.team == team).collect()
    }

    pub fn teams(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.team.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Pitcher table keyed by cleaned player name
#[derive(Debug, Clone, Default)]
pub struct PitchingTable {
    rows: Vec<PitcherLine>,
}

impl PitchingTable {
    /// Load a pitching export (`Player` and [`PITCHING_STATS`])
    pub fn load<P: AsRef<Path>>(csv_path: P) -> Result<Self, CoreError> {
        let df = read_csv(csv_path.as_ref())?;
        Self::from_dataframe(&df)
    }

    fn from_dataframe(df: &DataFrame) -> Result<Self, CoreError> {
        let players = string_column(df, "Player")?;
        let columns = PITCHING_STATS
            .iter()
            .map(|name| float_column(df, name))
            .collect::<Result<Vec<_>, _>>()?;

        let rows: Vec<PitcherLine> = players
            .iter()
            .enumerate()
            .map(|(i, player)| {
                let mut stats = [0.0; PITCHING_STATS.len()];
                for (j, column) in columns.iter().enumerate() {
                    stats[j] = column[i];
                }
                PitcherLine {
                    player: clean_player_name(player),
                    stats,
                }
            })
            .collect();

        info!("Pitching table: {} pitchers", rows.len());
        Ok(Self { rows })
    }

    pub fn from_rows(rows: Vec<PitcherLine>) -> Self {
        Self { rows }
    }

    pub fn matching(&self, player: &str) -> Vec<&PitcherLine> {
        self.rows.iter().filter(|r| r.player == player).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Saved feature means and standard deviations
#[derive(Debug, Clone, Default)]
pub struct NormalizationParams {
    params: HashMap<String, (f64, f64)>,
}

impl NormalizationParams {
    /// Load a `feature,mean,std` table
    pub fn load<P: AsRef<Path>>(csv_path: P) -> Result<Self, CoreError> {
        let df = read_csv(csv_path.as_ref())?;
        let features = string_column(&df, "feature")?;
        let means = float_column(&df, "mean")?;
        let stds = float_column(&df, "std")?;

        let params = features
            .into_iter()
            .zip(means.into_iter().zip(stds))
            .collect();
        Ok(Self { params })
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64, f64)>,
        S: Into<String>,
    {
        Self {
            params: pairs
                .into_iter()
                .map(|(name, mean, std)| (name.into(), (mean, std)))
                .collect(),
        }
    }

    /// (mean, std) for a feature
    pub fn get(&self, feature: &str) -> Option<(f64, f64)> {
        self.params.get(feature).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const BATTING_CSV: &str = "\
Tm,G,R/G,PA,AB,R,H,2B,3B,HR,RBI,SB,CS,BB,SO,BA,OBP,SLG,OPS,OPS+
New York Yankees,10,5.2,380,340,52,90,18,1,15,50,6,2,35,80,0.265,0.340,0.450,0.790,115
Boston Red Sox,10,4.6,370,335,46,88,20,2,10,44,8,3,30,85,0.263,0.325,0.420,0.745,104
League Average,10,4.4,375,338,44,85,17,1,11,42,5,2,31,84,0.251,0.318,0.405,0.723,100
";

    #[test]
    fn test_batting_per_game_and_acronyms() {
        let file = write_csv(BATTING_CSV);
        let table = BattingTable::load(file.path()).unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.matching("LgAvg").is_empty());

        let nyy = table.matching("NYY");
        assert_eq!(nyy.len(), 1);
        let stats = &nyy[0].stats;
        // R/G is already a rate
        assert!((stats[0] - 5.2).abs() < 1e-12);
        // PA is divided by games
        assert!((stats[1] - 38.0).abs() < 1e-12);
        // SO per game
        assert!((stats[12] - 8.0).abs() < 1e-12);
        // OPS+ untouched
        assert!((stats[17] - 115.0).abs() < 1e-12);
    }

    #[test]
    fn test_pitching_names_are_cleaned() {
        let file = write_csv(
            "Player,WAR,ERA+,FIP,WHIP,SO/BB\nGerrit Cole*,2.1,130,3.10,1.05,4.2\nBrayan Bello#,0.8,98,4.20,1.31,2.4\n",
        );
        let table = PitchingTable::load(file.path()).unwrap();

        assert_eq!(table.len(), 2);
        let cole = table.matching("Gerrit Cole");
        assert_eq!(cole.len(), 1);
        // Model order: SO/BB, ERA+, WAR, FIP, WHIP
        assert_eq!(cole[0].stats, [4.2, 130.0, 2.1, 3.10, 1.05]);
    }

    #[test]
    fn test_missing_column_is_upstream_error() {
        let file = write_csv("Player,WAR\nSomeone,1.0\n");
        let err = PitchingTable::load(file.path()).unwrap_err();
        assert!(matches!(err, CoreError::UpstreamData(_)));
        assert!(err.to_string().contains("ERA+"));
    }

    #[test]
    fn test_normalization_params() {
        let file = write_csv("feature,mean,std\nhome_R/G,4.5,0.6\nNumber_of_Games,81,40\n");
        let params = NormalizationParams::load(file.path()).unwrap();
        assert_eq!(params.get("home_R/G"), Some((4.5, 0.6)));
        assert_eq!(params.get("Number_of_Games"), Some((81.0, 40.0)));
        assert_eq!(params.get("away_R/G"), None);
    }

    #[test]
    fn test_clean_player_name() {
        assert_eq!(clean_player_name(" Tarik Skubal* "), "Tarik Skubal");
        assert_eq!(clean_player_name("Paul Skenes"), "Paul Skenes");
    }
}
