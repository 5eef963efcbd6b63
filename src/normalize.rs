//! Provider payloads into the internal data model.
//!
//! Two layouts are accepted everywhere: plain JSON objects/arrays, and the
//! stats provider's tabular `resultSets: [{ name, headers, rowSet }]` form.
//! Missing counts become zero, missing aggregates become `None`; only missing
//! identity fields fail with `ErrorKind::MalformedPayload`.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ErrorKind;
use crate::model::{
    CareerDashboard, GameMatchup, NormalizedGameData, PlayerGameLogRow, QuarterDelta,
    ScoreSnapshot, SeasonType, TeamBoxscoreRow,
};

const GAME_STATUS_FINAL: u64 = 3;

pub fn normalize_game_json(raw: &str, matchup: &GameMatchup) -> Result<NormalizedGameData, ErrorKind> {
    validate_matchup(matchup)?;

    let mut data = NormalizedGameData {
        matchup: matchup.clone(),
        snapshots: Vec::new(),
        line_score: Vec::new(),
        boxscore: Vec::new(),
        provider_times_tied: None,
        provider_lead_changes: None,
        is_live: true,
    };

    let Some(root) = parse_root(raw, "game stats")? else {
        return Ok(data);
    };
    let stats = field(&root, "teamStats").unwrap_or(&root);
    if stats.is_null() {
        return Ok(data);
    }

    let expected = matchup.game_id.trim();
    if let Some(game_id) = pick_string(stats, &["gameId", "game_id"])
        && !game_id.is_empty()
        && game_id != expected
    {
        return Err(ErrorKind::malformed(format!(
            "payload is for game {game_id}, expected {expected}"
        )));
    }

    data.is_live = parse_is_live(stats);
    data.snapshots = parse_snapshots(field(stats, "leadTracker"));
    data.line_score = parse_line_score(field(stats, "miniBoxscoreData"), data.is_live);
    data.boxscore = parse_team_boxscore(field(stats, "teamBoxscoreData"), matchup)?;
    data.provider_times_tied = pick_u32(stats, &["timesTied"]);
    data.provider_lead_changes = pick_u32(stats, &["leadChanges"]);

    Ok(data)
}

pub fn normalize_game_log_json(
    raw: &str,
    player_id: &str,
    season_type: SeasonType,
) -> Result<Vec<PlayerGameLogRow>, ErrorKind> {
    require_player_id(player_id)?;

    let Some(root) = parse_root(raw, "game log")? else {
        return Ok(Vec::new());
    };
    let rows = collect_rows(&root, &["PlayerGameLog", "gameLog", "rows"]);

    let mut out = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        let Some(game_id) = pick_string(row, &["game_id", "gameId"]).filter(|id| !id.is_empty())
        else {
            return Err(ErrorKind::malformed(format!(
                "game log row {idx} for player {player_id} has no game id"
            )));
        };
        out.push(PlayerGameLogRow {
            game_id,
            game_date: pick_string(row, &["game_date", "gameDate"]).unwrap_or_default(),
            matchup: pick_string(row, &["matchup"]).unwrap_or_default(),
            result: pick_string(row, &["wl", "result"]).unwrap_or_default(),
            points: pick_u32(row, &["pts", "points"]).unwrap_or(0),
            rebounds: pick_u32(row, &["reb", "rebounds"]).unwrap_or(0),
            assists: pick_u32(row, &["ast", "assists"]).unwrap_or(0),
            season_type,
        });
    }
    Ok(out)
}

pub fn normalize_dashboard_json(
    raw: &str,
    player_id: &str,
    season: &str,
) -> Result<CareerDashboard, ErrorKind> {
    require_player_id(player_id)?;

    let mut dashboard = CareerDashboard {
        player_id: player_id.trim().to_string(),
        season: season.trim().to_string(),
        games_played: 0,
        minutes: None,
        points: None,
        rebounds: None,
        assists: None,
    };

    let Some(root) = parse_root(raw, "dashboard")? else {
        return Ok(dashboard);
    };
    let rows = collect_rows(&root, &["OverallPlayerDashboard"]);
    let Some(row) = rows.first() else {
        return Ok(dashboard);
    };

    dashboard.games_played = pick_u32(row, &["gp", "games_played"]).unwrap_or(0);
    dashboard.minutes = pick_f32(row, &["min", "minutes"]);
    dashboard.points = pick_f32(row, &["pts", "points"]);
    dashboard.rebounds = pick_f32(row, &["reb", "rebounds"]);
    dashboard.assists = pick_f32(row, &["ast", "assists"]);
    Ok(dashboard)
}

fn validate_matchup(matchup: &GameMatchup) -> Result<(), ErrorKind> {
    if matchup.game_id.trim().is_empty() {
        return Err(ErrorKind::malformed("game id is missing"));
    }
    if matchup.home.team_id.trim().is_empty() {
        return Err(ErrorKind::malformed("home team id is missing"));
    }
    if matchup.away.team_id.trim().is_empty() {
        return Err(ErrorKind::malformed("away team id is missing"));
    }
    if matchup.home.team_id == matchup.away.team_id {
        return Err(ErrorKind::malformed(format!(
            "home and away share team id {}",
            matchup.home.team_id
        )));
    }
    Ok(())
}

fn require_player_id(player_id: &str) -> Result<(), ErrorKind> {
    if player_id.trim().is_empty() {
        return Err(ErrorKind::malformed("player id is missing"));
    }
    Ok(())
}

fn parse_root(raw: &str, what: &str) -> Result<Option<Value>, ErrorKind> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|err| ErrorKind::malformed(format!("invalid {what} json: {err}")))
}

fn parse_is_live(stats: &Value) -> bool {
    if let Some(live) = field(stats, "isLive").and_then(Value::as_bool) {
        return live;
    }
    match pick_u32(stats, &["gameStatus", "statusNum"]) {
        Some(status) => u64::from(status) != GAME_STATUS_FINAL,
        None => true,
    }
}

fn parse_snapshots(value: Option<&Value>) -> Vec<ScoreSnapshot> {
    let Some(list) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(list.len());
    let mut last_quarter = 1u8;
    for (idx, entry) in list.iter().enumerate() {
        let quarter = pick_u32(entry, &["quarter", "period"])
            .map(|q| q.clamp(1, u32::from(u8::MAX)) as u8)
            .unwrap_or(last_quarter);
        last_quarter = quarter;
        out.push(ScoreSnapshot {
            sequence: pick_u64(entry, &["sequence", "seq", "actionNumber", "eventNum"])
                .unwrap_or(idx as u64 + 1),
            home_score: pick_u32(entry, &["homeScore", "hScore", "scoreHome"]).unwrap_or(0),
            away_score: pick_u32(entry, &["awayScore", "vScore", "scoreAway"]).unwrap_or(0),
            quarter,
        });
    }

    // Stable sort keeps feed order among equal sequences; the later reading wins.
    out.sort_by_key(|snap| snap.sequence);
    let mut deduped: Vec<ScoreSnapshot> = Vec::with_capacity(out.len());
    for snap in out {
        match deduped.last_mut() {
            Some(prev) if prev.sequence == snap.sequence => *prev = snap,
            _ => deduped.push(snap),
        }
    }

    for pair in deduped.windows(2) {
        if pair[1].home_score < pair[0].home_score || pair[1].away_score < pair[0].away_score {
            warn!(
                sequence = pair[1].sequence,
                "score decreased between snapshots; keeping provider values"
            );
        }
    }
    deduped
}

fn parse_line_score(value: Option<&Value>, is_live: bool) -> Vec<QuarterDelta> {
    let Some(list) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut out: Vec<QuarterDelta> = list
        .iter()
        .enumerate()
        .map(|(idx, entry)| QuarterDelta {
            quarter: pick_u32(entry, &["quarter", "period"])
                .map(|q| q.clamp(1, u32::from(u8::MAX)) as u8)
                .unwrap_or((idx + 1).min(usize::from(u8::MAX)) as u8),
            home_points: pick_u32(entry, &["home", "homePoints", "homeScore"]).unwrap_or(0),
            away_points: pick_u32(entry, &["away", "awayPoints", "awayScore", "visitor"])
                .unwrap_or(0),
            provisional: false,
        })
        .collect();
    out.sort_by_key(|q| q.quarter);
    out.dedup_by_key(|q| q.quarter);
    if is_live && let Some(last) = out.last_mut() {
        last.provisional = true;
    }
    out
}

fn parse_team_boxscore(
    value: Option<&Value>,
    matchup: &GameMatchup,
) -> Result<Vec<TeamBoxscoreRow>, ErrorKind> {
    let Some(list) = value.and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    let mut home = None;
    let mut away = None;
    for (idx, entry) in list.iter().enumerate() {
        let Some(team_id) = pick_string(entry, &["teamId", "team_id"]).filter(|id| !id.is_empty())
        else {
            return Err(ErrorKind::malformed(format!(
                "team boxscore row {idx} has no team id"
            )));
        };
        let row = TeamBoxscoreRow {
            points: pick_u32(entry, &["points", "pts"]).unwrap_or(0),
            rebounds: pick_u32(entry, &["totReb", "rebounds", "reb"]).unwrap_or(0),
            assists: pick_u32(entry, &["assists", "ast"]).unwrap_or(0),
            steals: pick_u32(entry, &["steals", "stl"]).unwrap_or(0),
            blocks: pick_u32(entry, &["blocks", "blk"]).unwrap_or(0),
            turnovers: pick_u32(entry, &["turnovers", "tov"]).unwrap_or(0),
            field_goal_pct: pick_f32(entry, &["fgp", "fieldGoalPct"]),
            three_point_pct: pick_f32(entry, &["tpp", "threePointPct"]),
            free_throw_pct: pick_f32(entry, &["ftp", "freeThrowPct"]),
            team_id,
        };
        if row.team_id == matchup.home.team_id {
            home = Some(row);
        } else if row.team_id == matchup.away.team_id {
            away = Some(row);
        } else {
            debug!(team_id = %row.team_id, "dropping boxscore row for a team outside the matchup");
        }
    }
    Ok(home.into_iter().chain(away).collect())
}

/// Rows from either a `resultSets` table (matched by name, falling back to the
/// first set) or a plain array under one of `names` or at the root.
fn collect_rows(root: &Value, names: &[&str]) -> Vec<Value> {
    if let Some(sets) = field(root, "resultSets").and_then(Value::as_array) {
        let named = sets.iter().find(|set| {
            pick_string(set, &["name"]).is_some_and(|name| names.iter().any(|n| n.eq_ignore_ascii_case(&name)))
        });
        return named.or_else(|| sets.first()).map(table_rows).unwrap_or_default();
    }
    if let Some(list) = root.as_array() {
        return list.clone();
    }
    for name in names {
        if let Some(list) = field(root, name).and_then(Value::as_array) {
            return list.clone();
        }
    }
    Vec::new()
}

fn table_rows(set: &Value) -> Vec<Value> {
    let headers: Vec<String> = field(set, "headers")
        .and_then(Value::as_array)
        .map(|h| h.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();
    let Some(rows) = field(set, "rowSet").and_then(Value::as_array) else {
        return Vec::new();
    };
    rows.iter()
        .filter_map(Value::as_array)
        .map(|cells| {
            let map: Map<String, Value> = headers
                .iter()
                .cloned()
                .zip(cells.iter().cloned())
                .collect();
            Value::Object(map)
        })
        .collect()
}

/// Exact key first, then a case-insensitive scan (`PTS` vs `pts`).
fn field<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let map = value.as_object()?;
    map.get(key).or_else(|| {
        map.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(v) = field(value, key) {
            match v {
                Value::String(s) => return Some(s.trim().to_string()),
                Value::Number(n) => return Some(n.to_string()),
                _ => {}
            }
        }
    }
    None
}

fn pick_f64(value: &Value, keys: &[&str]) -> Option<f64> {
    for key in keys {
        if let Some(v) = field(value, key) {
            if let Some(num) = v.as_f64() {
                return Some(num);
            }
            if let Some(s) = v.as_str()
                && let Ok(num) = s.trim().parse::<f64>()
            {
                return Some(num);
            }
        }
    }
    None
}

fn pick_u64(value: &Value, keys: &[&str]) -> Option<u64> {
    pick_f64(value, keys)
        .filter(|num| num.is_finite() && *num >= 0.0)
        .map(|num| num.round() as u64)
}

fn pick_u32(value: &Value, keys: &[&str]) -> Option<u32> {
    pick_u64(value, keys).map(|num| num.min(u64::from(u32::MAX)) as u32)
}

fn pick_f32(value: &Value, keys: &[&str]) -> Option<f32> {
    pick_f64(value, keys)
        .filter(|num| num.is_finite())
        .map(|num| num as f32)
}
