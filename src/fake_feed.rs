use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use anyhow::{Result, anyhow};
use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Value, json};

use crate::model::{GameMatchup, SeasonType};
use crate::provider::StatsProvider;

const EVENTS_PER_QUARTER: u32 = 36;
const EVENTS_PER_FETCH: u32 = 9;
const REGULAR_SEASON_GAMES: u32 = 24;
const PLAYOFF_GAMES: u32 = 6;
const OPPONENTS: &[&str] = &[
    "BOS", "MIL", "PHI", "NYK", "MIA", "CLE", "DEN", "LAL", "GSW", "PHX", "DAL", "OKC",
];

/// In-process provider: every `game_team_stats` call advances a simulated
/// game by a few possessions, so repeated refreshes show a game in progress.
/// Output is a pure function of the seed and the number of calls per game.
pub struct FakeStatsProvider {
    seed: u64,
    latency: Duration,
    fail_every: Option<u32>,
    games: Mutex<HashMap<String, SimGame>>,
}

#[derive(Debug, Clone)]
struct SimGame {
    rng: StdRng,
    calls: u32,
    events: u32,
    quarter: u8,
    home: u32,
    away: u32,
    snapshots: Vec<Value>,
    finished: bool,
}

impl FakeStatsProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            latency: Duration::ZERO,
            fail_every: None,
            games: Mutex::new(HashMap::new()),
        }
    }

    /// Sleeps up to `latency` per request, so overlapping refreshes resolve out of order.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fails every `n`th game stats call with a transport-style error.
    pub fn with_failures_every(mut self, n: u32) -> Self {
        self.fail_every = (n > 0).then_some(n);
        self
    }

    fn rng_for(&self, subject: &str) -> StdRng {
        let mut hasher = DefaultHasher::new();
        subject.hash(&mut hasher);
        StdRng::seed_from_u64(self.seed ^ hasher.finish())
    }

    fn simulate_latency(&self, rng: &mut StdRng) {
        if self.latency.is_zero() {
            return;
        }
        let millis = rng.gen_range(0..=self.latency.as_millis() as u64);
        thread::sleep(Duration::from_millis(millis));
    }
}

impl SimGame {
    fn new(rng: StdRng) -> Self {
        Self {
            rng,
            calls: 0,
            events: 0,
            quarter: 1,
            home: 0,
            away: 0,
            snapshots: Vec::new(),
            finished: false,
        }
    }

    fn advance(&mut self, events: u32) {
        for _ in 0..events {
            if self.finished {
                return;
            }
            let points = match self.rng.gen_range(0..10) {
                0 => 1,
                1..=6 => 2,
                _ => 3,
            };
            if self.rng.gen_bool(0.5) {
                self.home += points;
            } else {
                self.away += points;
            }
            self.events += 1;
            self.snapshots.push(json!({
                "sequence": self.events,
                "quarter": self.quarter,
                "homeScore": self.home,
                "awayScore": self.away,
            }));

            if self.events % EVENTS_PER_QUARTER == 0 {
                let regulation_over = self.quarter >= 4;
                if regulation_over && self.home != self.away {
                    self.finished = true;
                } else {
                    self.quarter += 1;
                }
            }
        }
    }

    fn line_score(&self) -> Vec<Value> {
        let mut out = Vec::new();
        let mut prev = (0u64, 0u64);
        let mut closing: Vec<(u64, u64, u64)> = Vec::new();
        for snap in &self.snapshots {
            let q = snap["quarter"].as_u64().unwrap_or(1);
            let h = snap["homeScore"].as_u64().unwrap_or(0);
            let a = snap["awayScore"].as_u64().unwrap_or(0);
            match closing.last_mut() {
                Some(last) if last.0 == q => *last = (q, h, a),
                _ => closing.push((q, h, a)),
            }
        }
        for (q, h, a) in closing {
            out.push(json!({ "quarter": q, "home": h.saturating_sub(prev.0), "away": a.saturating_sub(prev.1) }));
            prev = (h, a);
        }
        out
    }

    fn boxscore(&mut self, matchup: &GameMatchup) -> Vec<Value> {
        if self.snapshots.is_empty() {
            return Vec::new();
        }
        let home_row = team_row(&mut self.rng, &matchup.home.team_id, self.home, self.events);
        let away_row = team_row(&mut self.rng, &matchup.away.team_id, self.away, self.events);
        vec![home_row, away_row]
    }
}

fn team_row(rng: &mut StdRng, team_id: &str, points: u32, events: u32) -> Value {
    let scale = events.max(1);
    json!({
        "teamId": team_id,
        "points": points,
        "totReb": scale / 3 + rng.gen_range(0..4),
        "assists": scale / 6 + rng.gen_range(0..3),
        "steals": rng.gen_range(0..=scale / 12 + 1),
        "blocks": rng.gen_range(0..=scale / 15 + 1),
        "turnovers": rng.gen_range(0..=scale / 10 + 1),
        "fgp": format!("{:.1}", rng.gen_range(38.0..55.0)),
        "tpp": format!("{:.1}", rng.gen_range(28.0..42.0)),
        "ftp": format!("{:.1}", rng.gen_range(68.0..88.0)),
    })
}

impl StatsProvider for FakeStatsProvider {
    fn season_player_game_log(
        &self,
        player_id: &str,
        season: &str,
        season_type: SeasonType,
    ) -> Result<String> {
        let mut rng = self.rng_for(&format!("log:{player_id}:{season}:{season_type:?}"));
        self.simulate_latency(&mut rng);

        let (count, id_base, start_month) = match season_type {
            SeasonType::RegularSeason => (REGULAR_SEASON_GAMES, 21_800_000u32, 11u32),
            SeasonType::Playoffs => (PLAYOFF_GAMES, 41_800_000u32, 4u32),
        };
        let year = season_start_year(season) + u32::from(season_type == SeasonType::Playoffs);
        let opening = NaiveDate::from_ymd_opt(year as i32, start_month, 1).unwrap_or_default();
        let own = "TOR";

        let rows: Vec<Value> = (0..count)
            .map(|idx| {
                let opponent = OPPONENTS[rng.gen_range(0..OPPONENTS.len())];
                let matchup = if rng.gen_bool(0.5) {
                    format!("{own} vs. {opponent}")
                } else {
                    format!("{own} @ {opponent}")
                };
                // Provider order is newest first.
                let date = opening
                    .checked_add_days(Days::new(u64::from((count - idx) * 3)))
                    .unwrap_or(opening);
                json!([
                    format!("00{}", id_base + count - idx),
                    date.format("%Y-%m-%d").to_string(),
                    matchup,
                    if rng.gen_bool(0.6) { "W" } else { "L" },
                    rng.gen_range(12..38u32),
                    rng.gen_range(2..12u32),
                    rng.gen_range(1..9u32),
                ])
            })
            .collect();

        let body = json!({
            "resource": "playergamelog",
            "resultSets": [{
                "name": "PlayerGameLog",
                "headers": ["Game_ID", "GAME_DATE", "MATCHUP", "WL", "PTS", "REB", "AST"],
                "rowSet": rows,
            }]
        });
        Ok(body.to_string())
    }

    fn player_dashboard_by_year(&self, player_id: &str, season: &str) -> Result<String> {
        let mut rng = self.rng_for(&format!("dash:{player_id}:{season}"));
        self.simulate_latency(&mut rng);
        let body = json!({
            "resultSets": [{
                "name": "OverallPlayerDashboard",
                "headers": ["GROUP_VALUE", "GP", "MIN", "PTS", "REB", "AST"],
                "rowSet": [[
                    season,
                    REGULAR_SEASON_GAMES,
                    (f64::from(rng.gen_range(280..370u32))) / 10.0,
                    (f64::from(rng.gen_range(180..300u32))) / 10.0,
                    (f64::from(rng.gen_range(40..90u32))) / 10.0,
                    (f64::from(rng.gen_range(20..70u32))) / 10.0,
                ]]
            }]
        });
        Ok(body.to_string())
    }

    fn player_image_url(&self, player_id: &str) -> String {
        format!("fake://players/{}.png", player_id.trim())
    }

    fn game_team_stats(&self, matchup: &GameMatchup) -> Result<String> {
        let (body, mut latency_rng) = {
            let mut games = self.games.lock().unwrap_or_else(PoisonError::into_inner);
            let game = games
                .entry(matchup.game_id.trim().to_string())
                .or_insert_with(|| SimGame::new(self.rng_for(&format!("game:{}", matchup.game_id.trim()))));
            game.calls += 1;

            if let Some(n) = self.fail_every
                && game.calls % n == 0
            {
                return Err(anyhow!("simulated provider outage (call {})", game.calls));
            }

            // The first call returns the pre-tip-off state.
            if game.calls > 1 {
                game.advance(EVENTS_PER_FETCH);
            }
            let status = if game.finished {
                3
            } else if game.snapshots.is_empty() {
                1
            } else {
                2
            };
            let body = json!({
                "gameId": matchup.game_id.trim(),
                "gameStatus": status,
                "leadTracker": game.snapshots,
                "miniBoxscoreData": game.line_score(),
                "teamBoxscoreData": game.boxscore(matchup),
            });
            (body, self.rng_for(&format!("lat:{}:{}", matchup.game_id, game.calls)))
        };
        self.simulate_latency(&mut latency_rng);
        Ok(body.to_string())
    }
}

fn season_start_year(season: &str) -> u32 {
    season
        .split('-')
        .next()
        .and_then(|y| y.trim().parse::<u32>().ok())
        .unwrap_or(2018)
}
