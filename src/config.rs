use std::env;
use std::time::Duration;

use anyhow::{Result, anyhow};

const DEFAULT_STATS_BASE_URL: &str = "https://stats.nba.com/stats";
const DEFAULT_GAME_FEED_URL: &str =
    "https://data.nba.net/prod/v1/{date}/{game_id}_team_stats.json";
const DEFAULT_PLAYER_IMAGE_URL: &str =
    "https://ak-static.cms.nba.com/wp-content/uploads/headshots/nba/latest/260x190/{player_id}.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsSource {
    Http,
    Fake,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub stats_source: StatsSource,
    pub stats_base_url: String,
    /// `{date}` and `{game_id}` are substituted per request.
    pub game_feed_url: String,
    /// `{player_id}` is substituted per request.
    pub player_image_url: String,
    pub request_timeout: Duration,
    pub fetch_parallelism: usize,
    /// `None` when refreshes are only triggered by hand.
    pub auto_refresh: Option<Duration>,
    pub fake_feed_seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stats_source: StatsSource::Fake,
            stats_base_url: DEFAULT_STATS_BASE_URL.to_string(),
            game_feed_url: DEFAULT_GAME_FEED_URL.to_string(),
            player_image_url: DEFAULT_PLAYER_IMAGE_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            fetch_parallelism: 4,
            auto_refresh: None,
            fake_feed_seed: 7,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let stats_source = match opt_env("STATS_SOURCE").map(|v| v.to_lowercase()).as_deref() {
            None | Some("fake") => StatsSource::Fake,
            Some("http") => StatsSource::Http,
            Some(other) => return Err(anyhow!("unknown STATS_SOURCE {other:?} (expected http or fake)")),
        };

        Ok(Self {
            stats_source,
            stats_base_url: opt_env("STATS_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.stats_base_url),
            game_feed_url: opt_env("GAME_FEED_URL").unwrap_or(defaults.game_feed_url),
            player_image_url: opt_env("PLAYER_IMAGE_URL").unwrap_or(defaults.player_image_url),
            request_timeout: Duration::from_secs(
                parse_env::<u64>("REQUEST_TIMEOUT_SECS")
                    .unwrap_or(defaults.request_timeout.as_secs())
                    .clamp(2, 60),
            ),
            fetch_parallelism: parse_env::<usize>("FETCH_PARALLELISM")
                .unwrap_or(defaults.fetch_parallelism)
                .clamp(1, 16),
            auto_refresh: parse_env::<u64>("AUTO_REFRESH_SECS")
                .filter(|secs| *secs > 0)
                .map(|secs| Duration::from_secs(secs.max(5))),
            fake_feed_seed: parse_env::<u64>("FAKE_FEED_SEED").unwrap_or(defaults.fake_feed_seed),
        })
    }
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .and_then(|val| if val.trim().is_empty() { None } else { Some(val.trim().to_string()) })
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    opt_env(key).and_then(|val| val.parse::<T>().ok())
}
