use anyhow::{Context, Result};
use tracing::debug;

use crate::config::Config;
use crate::http_cache::fetch_json_cached;
use crate::http_client::http_client;
use crate::model::{GameMatchup, SeasonType};

/// Remote stats source. Methods return raw bodies; shaping them is the
/// normalizer's job so every provider shares one tolerance policy.
pub trait StatsProvider: Send + Sync {
    fn season_player_game_log(
        &self,
        player_id: &str,
        season: &str,
        season_type: SeasonType,
    ) -> Result<String>;

    fn player_dashboard_by_year(&self, player_id: &str, season: &str) -> Result<String>;

    fn player_image_url(&self, player_id: &str) -> String;

    /// Body shaped `{ leadTracker, miniBoxscoreData, teamBoxscoreData, timesTied, leadChanges }`.
    fn game_team_stats(&self, matchup: &GameMatchup) -> Result<String>;
}

const STATS_HEADERS: &[(&str, &str)] = &[
    ("Accept", "application/json, text/plain, */*"),
    ("Referer", "https://www.nba.com/"),
    ("Origin", "https://www.nba.com"),
    ("x-nba-stats-origin", "stats"),
    ("x-nba-stats-token", "true"),
];

#[derive(Debug, Clone)]
pub struct HttpStatsProvider {
    config: Config,
}

impl HttpStatsProvider {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<String> {
        let client = http_client(self.config.request_timeout)?;
        debug!(url, "fetching");
        fetch_json_cached(client, url, headers)
    }
}

impl StatsProvider for HttpStatsProvider {
    fn season_player_game_log(
        &self,
        player_id: &str,
        season: &str,
        season_type: SeasonType,
    ) -> Result<String> {
        let url = format!(
            "{}/playergamelog?PlayerID={}&Season={}&SeasonType={}",
            self.config.stats_base_url,
            encode(player_id),
            encode(season),
            encode(season_type.provider_label()),
        );
        self.get(&url, STATS_HEADERS)
            .with_context(|| format!("game log request for player {player_id} failed"))
    }

    fn player_dashboard_by_year(&self, player_id: &str, season: &str) -> Result<String> {
        let url = format!(
            "{}/playerdashboardbyyearoveryear?PlayerID={}&Season={}&PerMode=PerGame&MeasureType=Base&SeasonType=Regular%20Season",
            self.config.stats_base_url,
            encode(player_id),
            encode(season),
        );
        self.get(&url, STATS_HEADERS)
            .with_context(|| format!("dashboard request for player {player_id} failed"))
    }

    fn player_image_url(&self, player_id: &str) -> String {
        self.config
            .player_image_url
            .replace("{player_id}", &encode(player_id))
    }

    fn game_team_stats(&self, matchup: &GameMatchup) -> Result<String> {
        let url = self
            .config
            .game_feed_url
            .replace("{date}", &encode(&matchup.game_date))
            .replace("{game_id}", &encode(&matchup.game_id));
        self.get(&url, &[])
            .with_context(|| format!("team stats request for game {} failed", matchup.game_id))
    }
}

fn encode(raw: &str) -> String {
    urlencoding::encode(raw.trim()).into_owned()
}
