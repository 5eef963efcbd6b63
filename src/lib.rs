pub mod config;
pub mod error;
pub mod fake_feed;
pub mod feed;
pub mod game_log;
pub mod http_cache;
pub mod http_client;
pub mod lead_tracker;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod quarter_scores;
pub mod refresh;
pub mod state;
pub mod summary;
pub mod team_colors;
