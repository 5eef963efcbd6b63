use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamIdentity {
    pub team_id: String,
    pub abbreviation: String,
    pub color: String,
}

/// Game selection handed in by the caller; the core never reads global selection state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMatchup {
    pub game_id: String,
    /// `YYYYMMDD`, as the game feed expects it.
    pub game_date: String,
    pub home: TeamIdentity,
    pub away: TeamIdentity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub sequence: u64,
    pub home_score: u32,
    pub away_score: u32,
    pub quarter: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadTrackerEntry {
    pub sequence: u64,
    /// `None` exactly when the score is level.
    pub leading_team_id: Option<String>,
    pub margin: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterDelta {
    pub quarter: u8,
    pub home_points: u32,
    pub away_points: u32,
    pub provisional: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamBoxscoreRow {
    pub team_id: String,
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
    pub steals: u32,
    pub blocks: u32,
    pub turnovers: u32,
    pub field_goal_pct: Option<f32>,
    pub three_point_pct: Option<f32>,
    pub free_throw_pct: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedGameData {
    pub matchup: GameMatchup,
    pub snapshots: Vec<ScoreSnapshot>,
    /// Provider line score, used when no snapshots are available.
    pub line_score: Vec<QuarterDelta>,
    pub boxscore: Vec<TeamBoxscoreRow>,
    pub provider_times_tied: Option<u32>,
    pub provider_lead_changes: Option<u32>,
    pub is_live: bool,
}

impl NormalizedGameData {
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty() && self.line_score.is_empty() && self.boxscore.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStatsSummary {
    pub home: TeamIdentity,
    pub away: TeamIdentity,
    pub times_tied: u32,
    pub lead_changes: u32,
    pub entries: Vec<LeadTrackerEntry>,
    pub quarter_scores: Vec<QuarterDelta>,
    pub boxscore: Vec<TeamBoxscoreRow>,
}

impl TeamStatsSummary {
    /// A game that has not tipped off yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.quarter_scores.is_empty() && self.boxscore.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeasonType {
    RegularSeason,
    Playoffs,
}

impl SeasonType {
    pub fn provider_label(self) -> &'static str {
        match self {
            SeasonType::RegularSeason => "Regular Season",
            SeasonType::Playoffs => "Playoffs",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerGameLogRow {
    pub game_id: String,
    pub game_date: String,
    pub matchup: String,
    /// `W` / `L`, empty while the game is unresolved.
    pub result: String,
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
    pub season_type: SeasonType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareerDashboard {
    pub player_id: String,
    pub season: String,
    pub games_played: u32,
    pub minutes: Option<f32>,
    pub points: Option<f32>,
    pub rebounds: Option<f32>,
    pub assists: Option<f32>,
}

/// Roster details shown in the player header. Comes with the selection, not
/// from a fetch, so every field is kept as the roster feed spelled it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    pub jersey_number: String,
    /// `R` for rookies.
    pub years_pro: String,
    /// Feet and inches joined by a dash, e.g. `6-7`.
    pub height: String,
    pub weight_lbs: String,
    pub school: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerViewModel {
    pub player_id: String,
    pub season: String,
    pub image_url: String,
    pub team_color: String,
    pub profile: PlayerProfile,
    /// `profile.height` split into feet and inches, when it parses.
    pub height_ft_in: Option<(u8, u8)>,
    pub dashboard: CareerDashboard,
    pub game_log: Vec<PlayerGameLogRow>,
}

impl PlayerViewModel {
    pub fn is_empty(&self) -> bool {
        self.game_log.is_empty() && self.dashboard.games_played == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SubjectSummary {
    Game(TeamStatsSummary),
    Player(PlayerViewModel),
}

impl SubjectSummary {
    pub fn is_empty(&self) -> bool {
        match self {
            SubjectSummary::Game(summary) => summary.is_empty(),
            SubjectSummary::Player(view) => view.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubjectKey {
    Game { game_id: String },
    Player { player_id: String, season: String },
}

impl SubjectKey {
    pub fn game(game_id: impl Into<String>) -> Self {
        SubjectKey::Game {
            game_id: game_id.into(),
        }
    }

    pub fn player(player_id: impl Into<String>, season: impl Into<String>) -> Self {
        SubjectKey::Player {
            player_id: player_id.into(),
            season: season.into(),
        }
    }
}

impl std::fmt::Display for SubjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubjectKey::Game { game_id } => write!(f, "game:{game_id}"),
            SubjectKey::Player { player_id, season } => write!(f, "player:{player_id}@{season}"),
        }
    }
}
