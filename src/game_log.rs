use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};

use crate::model::PlayerGameLogRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// Stable identity of a row, for list virtualization in a rendering layer.
pub fn game_log_key(row: &PlayerGameLogRow) -> &str {
    &row.game_id
}

/// Playoff rows come first in source order, so a game id present in both
/// lists keeps its playoff row. The date sort is stable: rows sharing a date
/// keep that order too. Rows whose date does not parse go last.
pub fn merge_game_logs(
    playoffs: &[PlayerGameLogRow],
    regular_season: &[PlayerGameLogRow],
    direction: SortDirection,
) -> Vec<PlayerGameLogRow> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(playoffs.len() + regular_season.len());
    let mut merged: Vec<(Option<NaiveDate>, &PlayerGameLogRow)> = Vec::new();
    for row in playoffs.iter().chain(regular_season) {
        if !seen.insert(game_log_key(row)) {
            tracing::debug!(game_id = %row.game_id, "dropping duplicate game log row");
            continue;
        }
        merged.push((parse_game_date(&row.game_date), row));
    }

    merged.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => match direction {
            SortDirection::Ascending => a.cmp(b),
            SortDirection::Descending => b.cmp(a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    merged.into_iter().map(|(_, row)| row.clone()).collect()
}

/// Accepts `2019-04-13`, `2019-04-13T00:00:00` and `APR 13, 2019`.
pub fn parse_game_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%b %d, %Y"))
        .ok()
}

/// Drops the player's own team from a matchup string:
/// `TOR @ NYK` becomes `@ NYK`, `TOR vs. WAS` becomes `vs WAS`.
pub fn opponent_label(matchup: &str) -> Option<String> {
    let mut parts = matchup.split_whitespace();
    while let Some(token) = parts.next() {
        let marker = match token {
            "@" => "@",
            "vs." | "vs" => "vs",
            _ => continue,
        };
        let opponent = parts.next()?;
        if opponent.chars().all(|c| c.is_ascii_alphabetic()) {
            return Some(format!("{marker} {opponent}"));
        }
        return None;
    }
    None
}
