//! Team name to acronym mapping used by the feature tables

/// Full franchise names (including former names) and their acronyms
const TEAM_ACRONYMS: &[(&str, &str)] = &[
    ("Arizona Diamondbacks", "ARI"),
    ("Athletics", "OAK"),
    ("Oakland Athletics", "OAK"),
    ("Atlanta Braves", "ATL"),
    ("Baltimore Orioles", "BAL"),
    ("Boston Red Sox", "BOS"),
    ("Chicago Cubs", "CHC"),
    ("Chicago White Sox", "CWS"),
    ("Cincinnati Reds", "CIN"),
    ("Cleveland Indians", "CLE"),
    ("Cleveland Guardians", "CLE"),
    ("Colorado Rockies", "COL"),
    ("Detroit Tigers", "DET"),
    ("Houston Astros", "HOU"),
    ("Kansas City Royals", "KCR"),
    ("Los Angeles Angels of Anaheim", "LAA"),
    ("Los Angeles Angels", "LAA"),
    ("Los Angeles Dodgers", "LAD"),
    ("Miami Marlins", "MIA"),
    ("Milwaukee Brewers", "MIL"),
    ("Minnesota Twins", "MIN"),
    ("New York Mets", "NYM"),
    ("New York Yankees", "NYY"),
    ("Philadelphia Phillies", "PHI"),
    ("Pittsburgh Pirates", "PIT"),
    ("San Diego Padres", "SDP"),
    ("San Francisco Giants", "SFG"),
    ("Seattle Mariners", "SEA"),
    ("St. Louis Cardinals", "STL"),
    ("Tampa Bay Rays", "TBR"),
    ("Texas Rangers", "TEX"),
    ("Toronto Blue Jays", "TOR"),
    ("Washington Nationals", "WSN"),
];

/// Acronym for a full team name; acronyms map to themselves
pub fn team_acronym(name: &str) -> Option<&'static str> {
    let name = name.trim();
    TEAM_ACRONYMS
        .iter()
        .find(|(full, acronym)| *full == name || *acronym == name)
        .map(|(_, acronym)| *acronym)
}

/// All acronyms, sorted and deduplicated
pub fn all_acronyms() -> Vec<&'static str> {
    let mut acronyms: Vec<&'static str> = TEAM_ACRONYMS.iter().map(|(_, a)| *a).collect();
    acronyms.sort_unstable();
    acronyms.dedup();
    acronyms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_names_map_to_acronyms() {
        assert_eq!(team_acronym("New York Yankees"), Some("NYY"));
        assert_eq!(team_acronym("Athletics"), Some("OAK"));
        assert_eq!(team_acronym(" St. Louis Cardinals "), Some("STL"));
    }

    #[test]
    fn test_former_names_share_acronym() {
        assert_eq!(team_acronym("Cleveland Indians"), Some("CLE"));
        assert_eq!(team_acronym("Cleveland Guardians"), Some("CLE"));
    }

    #[test]
    fn test_acronym_maps_to_itself() {
        assert_eq!(team_acronym("SFG"), Some("SFG"));
    }

    #[test]
    fn test_unknown_rows_are_unmapped() {
        assert_eq!(team_acronym("League Average"), None);
        assert_eq!(team_acronym(""), None);
    }

    #[test]
    fn test_thirty_franchises() {
        assert_eq!(all_acronyms().len(), 30);
    }
}
