use crate::model::{Side, TeamIdentity};

pub const HOME_FALLBACK_COLOR: &str = "#BE0E2C";
pub const AWAY_FALLBACK_COLOR: &str = "#1C3F80";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamInfo {
    pub team_id: &'static str,
    pub abbreviation: &'static str,
    pub name: &'static str,
    pub color: &'static str,
}

const NBA_TEAMS: &[TeamInfo] = &[
    TeamInfo { team_id: "1610612737", abbreviation: "ATL", name: "Atlanta Hawks", color: "#E03A3E" },
    TeamInfo { team_id: "1610612738", abbreviation: "BOS", name: "Boston Celtics", color: "#007A33" },
    TeamInfo { team_id: "1610612751", abbreviation: "BKN", name: "Brooklyn Nets", color: "#777D84" },
    TeamInfo { team_id: "1610612766", abbreviation: "CHA", name: "Charlotte Hornets", color: "#1D1160" },
    TeamInfo { team_id: "1610612741", abbreviation: "CHI", name: "Chicago Bulls", color: "#CE1141" },
    TeamInfo { team_id: "1610612739", abbreviation: "CLE", name: "Cleveland Cavaliers", color: "#860038" },
    TeamInfo { team_id: "1610612742", abbreviation: "DAL", name: "Dallas Mavericks", color: "#00538C" },
    TeamInfo { team_id: "1610612743", abbreviation: "DEN", name: "Denver Nuggets", color: "#0E2240" },
    TeamInfo { team_id: "1610612765", abbreviation: "DET", name: "Detroit Pistons", color: "#C8102E" },
    TeamInfo { team_id: "1610612744", abbreviation: "GSW", name: "Golden State Warriors", color: "#1D428A" },
    TeamInfo { team_id: "1610612745", abbreviation: "HOU", name: "Houston Rockets", color: "#CE1141" },
    TeamInfo { team_id: "1610612754", abbreviation: "IND", name: "Indiana Pacers", color: "#002D62" },
    TeamInfo { team_id: "1610612746", abbreviation: "LAC", name: "LA Clippers", color: "#C8102E" },
    TeamInfo { team_id: "1610612747", abbreviation: "LAL", name: "Los Angeles Lakers", color: "#552583" },
    TeamInfo { team_id: "1610612763", abbreviation: "MEM", name: "Memphis Grizzlies", color: "#5D76A9" },
    TeamInfo { team_id: "1610612748", abbreviation: "MIA", name: "Miami Heat", color: "#98002E" },
    TeamInfo { team_id: "1610612749", abbreviation: "MIL", name: "Milwaukee Bucks", color: "#00471B" },
    TeamInfo { team_id: "1610612750", abbreviation: "MIN", name: "Minnesota Timberwolves", color: "#0C2340" },
    TeamInfo { team_id: "1610612740", abbreviation: "NOP", name: "New Orleans Pelicans", color: "#0C2340" },
    TeamInfo { team_id: "1610612752", abbreviation: "NYK", name: "New York Knicks", color: "#F58426" },
    TeamInfo { team_id: "1610612760", abbreviation: "OKC", name: "Oklahoma City Thunder", color: "#007AC1" },
    TeamInfo { team_id: "1610612753", abbreviation: "ORL", name: "Orlando Magic", color: "#0077C0" },
    TeamInfo { team_id: "1610612755", abbreviation: "PHI", name: "Philadelphia 76ers", color: "#006BB6" },
    TeamInfo { team_id: "1610612756", abbreviation: "PHX", name: "Phoenix Suns", color: "#1D1160" },
    TeamInfo { team_id: "1610612757", abbreviation: "POR", name: "Portland Trail Blazers", color: "#E03A3E" },
    TeamInfo { team_id: "1610612758", abbreviation: "SAC", name: "Sacramento Kings", color: "#5A2D81" },
    TeamInfo { team_id: "1610612759", abbreviation: "SAS", name: "San Antonio Spurs", color: "#C4CED4" },
    TeamInfo { team_id: "1610612761", abbreviation: "TOR", name: "Toronto Raptors", color: "#CE1141" },
    TeamInfo { team_id: "1610612762", abbreviation: "UTA", name: "Utah Jazz", color: "#002B5C" },
    TeamInfo { team_id: "1610612764", abbreviation: "WAS", name: "Washington Wizards", color: "#002B5C" },
];

pub fn fallback_color(side: Side) -> &'static str {
    match side {
        Side::Home => HOME_FALLBACK_COLOR,
        Side::Away => AWAY_FALLBACK_COLOR,
    }
}

pub fn team_for_abbreviation(abbreviation: &str) -> Option<&'static TeamInfo> {
    let needle = abbreviation.trim();
    if needle.is_empty() {
        return None;
    }
    NBA_TEAMS
        .iter()
        .find(|team| team.abbreviation.eq_ignore_ascii_case(needle))
}

pub fn team_for_id(team_id: &str) -> Option<&'static TeamInfo> {
    let needle = team_id.trim();
    if needle.is_empty() {
        return None;
    }
    NBA_TEAMS.iter().find(|team| team.team_id == needle)
}

pub fn color_for_abbreviation(abbreviation: &str, side: Side) -> &'static str {
    team_for_abbreviation(abbreviation)
        .map(|team| team.color)
        .unwrap_or_else(|| fallback_color(side))
}

pub fn color_for_team_id(team_id: &str, side: Side) -> &'static str {
    team_for_id(team_id)
        .map(|team| team.color)
        .unwrap_or_else(|| fallback_color(side))
}

/// Builds a display identity. An id match wins over the abbreviation; the
/// caller-supplied values are kept verbatim when present.
pub fn resolve_identity(team_id: &str, abbreviation: &str, side: Side) -> TeamIdentity {
    let known = team_for_id(team_id).or_else(|| team_for_abbreviation(abbreviation));
    let abbreviation = if abbreviation.trim().is_empty() {
        known.map(|team| team.abbreviation).unwrap_or_default()
    } else {
        abbreviation.trim()
    };
    let team_id = if team_id.trim().is_empty() {
        known.map(|team| team.team_id).unwrap_or_default()
    } else {
        team_id.trim()
    };
    TeamIdentity {
        team_id: team_id.to_string(),
        abbreviation: abbreviation.to_uppercase(),
        color: known
            .map(|team| team.color)
            .unwrap_or_else(|| fallback_color(side))
            .to_string(),
    }
}
