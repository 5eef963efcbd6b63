use tracing::debug;

use crate::game_log::{SortDirection, merge_game_logs};
use crate::lead_tracker::track_leads;
use crate::model::{
    CareerDashboard, NormalizedGameData, PlayerGameLogRow, PlayerProfile, PlayerViewModel, Side,
    TeamStatsSummary,
};
use crate::quarter_scores::quarter_deltas;
use crate::team_colors;

/// Recomputed from scratch on every refresh; nothing carries over from the
/// previous summary.
pub fn build_team_stats_summary(data: &NormalizedGameData) -> TeamStatsSummary {
    let home = &data.matchup.home;
    let away = &data.matchup.away;
    let leads = track_leads(&data.snapshots, &home.team_id, &away.team_id);

    if let Some(provided) = data.provider_times_tied
        && !data.snapshots.is_empty()
        && provided != leads.times_tied
    {
        debug!(provided, derived = leads.times_tied, "provider tie count differs");
    }
    if let Some(provided) = data.provider_lead_changes
        && !data.snapshots.is_empty()
        && provided != leads.lead_changes
    {
        debug!(provided, derived = leads.lead_changes, "provider lead change count differs");
    }

    let quarter_scores = if data.snapshots.is_empty() {
        data.line_score.clone()
    } else {
        quarter_deltas(&data.snapshots, data.is_live)
    };

    TeamStatsSummary {
        home: home.clone(),
        away: away.clone(),
        times_tied: leads.times_tied,
        lead_changes: leads.lead_changes,
        entries: leads.entries,
        quarter_scores,
        boxscore: data.boxscore.clone(),
    }
}

#[derive(Debug, Clone)]
pub struct PlayerInputs {
    pub player_id: String,
    pub season: String,
    pub team_id: String,
    pub image_url: String,
    pub profile: PlayerProfile,
    pub playoffs: Vec<PlayerGameLogRow>,
    pub regular_season: Vec<PlayerGameLogRow>,
    pub dashboard: CareerDashboard,
}

pub fn build_player_view(inputs: PlayerInputs, direction: SortDirection) -> PlayerViewModel {
    let game_log = merge_game_logs(&inputs.playoffs, &inputs.regular_season, direction);
    PlayerViewModel {
        team_color: team_colors::color_for_team_id(&inputs.team_id, Side::Home).to_string(),
        height_ft_in: format_height(&inputs.profile.height),
        profile: inputs.profile,
        player_id: inputs.player_id,
        season: inputs.season,
        image_url: inputs.image_url,
        dashboard: inputs.dashboard,
        game_log,
    }
}

/// `"6-7"` to `(6, 7)`. Anything else, including a bare `"6"`, is `None`.
pub fn format_height(raw: &str) -> Option<(u8, u8)> {
    let (feet, inches) = raw.trim().split_once('-')?;
    let feet = feet.trim().parse::<u8>().ok()?;
    let inches = inches.trim().parse::<u8>().ok()?;
    (inches < 12).then_some((feet, inches))
}
