//! Feature tables and feature-row construction

pub mod csv_loader;
pub mod features;
pub mod teams;

// Re-export commonly used types
pub use csv_loader::{BattingTable, NormalizationParams, PitcherLine, PitchingTable, TeamBatting};
pub use features::{feature_names, FeatureProvider, FeatureStore, NUM_FEATURES};
pub use teams::{all_acronyms, team_acronym};
