use std::fs;
use std::path::PathBuf;

use courtside::error::ErrorKind;
use courtside::model::{GameMatchup, SeasonType, Side};
use courtside::normalize::{normalize_dashboard_json, normalize_game_json, normalize_game_log_json};
use courtside::team_colors::resolve_identity;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn finals_matchup() -> GameMatchup {
    GameMatchup {
        game_id: "0041800406".to_string(),
        game_date: "20190613".to_string(),
        home: resolve_identity("1610612761", "TOR", Side::Home),
        away: resolve_identity("1610612744", "GSW", Side::Away),
    }
}

#[test]
fn parses_team_stats_fixture() {
    let raw = read_fixture("team_stats.json");
    let data = normalize_game_json(&raw, &finals_matchup()).expect("fixture should parse");

    assert_eq!(data.snapshots.len(), 7);
    assert_eq!(data.snapshots[6].home_score, 8);
    assert_eq!(data.snapshots[6].away_score, 9);
    assert_eq!(data.snapshots[6].quarter, 2);
    assert!(data.is_live);
    assert_eq!(data.provider_times_tied, Some(2));
    assert_eq!(data.provider_lead_changes, Some(3));

    assert_eq!(data.line_score.len(), 2);
    assert!(!data.line_score[0].provisional);
    assert!(data.line_score[1].provisional);

    // Home row first regardless of payload order.
    assert_eq!(data.boxscore.len(), 2);
    assert_eq!(data.boxscore[0].team_id, "1610612761");
    assert_eq!(data.boxscore[0].points, 8);
    assert_eq!(data.boxscore[0].steals, 0);
    assert_eq!(data.boxscore[0].field_goal_pct, None);
    assert_eq!(data.boxscore[1].points, 9);
    assert_eq!(data.boxscore[1].field_goal_pct, Some(44.7));
}

#[test]
fn normalizing_twice_is_identical() {
    let raw = read_fixture("team_stats.json");
    let first = normalize_game_json(&raw, &finals_matchup()).expect("fixture should parse");
    let second = normalize_game_json(&raw, &finals_matchup()).expect("fixture should parse");
    assert_eq!(first, second);
}

#[test]
fn team_stats_null_is_empty_not_error() {
    for raw in ["", "null", "{}", r#"{"teamStats": null}"#, r#"{"leadTracker": []}"#] {
        let data = normalize_game_json(raw, &finals_matchup()).expect("empty should parse");
        assert!(data.is_empty(), "{raw:?} should be empty");
    }
}

#[test]
fn missing_team_id_in_matchup_is_malformed() {
    let mut matchup = finals_matchup();
    matchup.away.team_id.clear();
    let err = normalize_game_json("{}", &matchup).expect_err("identity is required");
    assert!(matches!(err, ErrorKind::MalformedPayload(_)));
    assert!(!err.is_retryable());
}

#[test]
fn boxscore_row_without_team_id_is_malformed() {
    let raw = r#"{ "teamBoxscoreData": [ { "points": 10 } ] }"#;
    let err = normalize_game_json(raw, &finals_matchup()).expect_err("row identity is required");
    assert!(matches!(err, ErrorKind::MalformedPayload(_)));
}

#[test]
fn payload_for_other_game_is_malformed() {
    let raw = r#"{ "gameId": "0041800405", "leadTracker": [] }"#;
    assert!(normalize_game_json(raw, &finals_matchup()).is_err());
}

#[test]
fn padded_game_id_is_trimmed_before_comparison() {
    let mut matchup = finals_matchup();
    matchup.game_id = " 0041800406".to_string();
    let raw = r#"{ "gameId": "0041800406", "leadTracker": [] }"#;
    let data = normalize_game_json(raw, &matchup).expect("same game after trimming");
    assert!(data.is_empty());
}

#[test]
fn invalid_json_is_malformed() {
    let err = normalize_game_json("{ not json", &finals_matchup()).expect_err("should fail");
    assert!(matches!(err, ErrorKind::MalformedPayload(_)));
}

#[test]
fn final_game_has_no_provisional_quarter() {
    let raw = r#"{ "gameStatus": 3, "miniBoxscoreData": [ { "quarter": 1, "home": 20, "away": 18 } ] }"#;
    let data = normalize_game_json(raw, &finals_matchup()).expect("should parse");
    assert!(!data.is_live);
    assert!(!data.line_score[0].provisional);
}

#[test]
fn snapshots_without_sequence_fall_back_to_position() {
    let raw = r#"{ "leadTracker": [ { "homeScore": 2, "awayScore": 0 }, { "homeScore": 2, "awayScore": 2, "quarter": 2 } ] }"#;
    let data = normalize_game_json(raw, &finals_matchup()).expect("should parse");
    assert_eq!(data.snapshots[0].sequence, 1);
    assert_eq!(data.snapshots[0].quarter, 1);
    assert_eq!(data.snapshots[1].sequence, 2);
    assert_eq!(data.snapshots[1].quarter, 2);
}

#[test]
fn parses_result_set_game_log_fixture() {
    let raw = read_fixture("player_game_log.json");
    let rows = normalize_game_log_json(&raw, "202695", SeasonType::RegularSeason)
        .expect("fixture should parse");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].game_id, "0021801213");
    assert_eq!(rows[0].game_date, "APR 09, 2019");
    assert_eq!(rows[0].matchup, "TOR vs. MIN");
    assert_eq!(rows[0].result, "W");
    assert_eq!(rows[0].points, 24);
    assert_eq!(rows[2].points, 0, "null count falls back to zero");
    assert!(rows.iter().all(|r| r.season_type == SeasonType::RegularSeason));
}

#[test]
fn plain_array_game_log_is_accepted() {
    let raw = r#"[ { "game_id": "0041800101", "game_date": "2019-04-13", "matchup": "TOR vs. ORL", "wl": "L", "pts": 27 } ]"#;
    let rows = normalize_game_log_json(raw, "202695", SeasonType::Playoffs).expect("should parse");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].rebounds, 0);
    assert_eq!(rows[0].season_type, SeasonType::Playoffs);
}

#[test]
fn game_log_row_without_game_id_is_malformed() {
    let raw = r#"[ { "game_date": "2019-04-13", "pts": 27 } ]"#;
    let err = normalize_game_log_json(raw, "202695", SeasonType::Playoffs).expect_err("should fail");
    assert!(matches!(err, ErrorKind::MalformedPayload(_)));
}

#[test]
fn missing_player_id_is_malformed() {
    assert!(normalize_game_log_json("[]", " ", SeasonType::RegularSeason).is_err());
    assert!(normalize_dashboard_json("{}", "", "2018-19").is_err());
}

#[test]
fn empty_result_sets_are_empty() {
    let raw = r#"{ "resultSets": [] }"#;
    let rows = normalize_game_log_json(raw, "202695", SeasonType::RegularSeason).expect("should parse");
    assert!(rows.is_empty());
}

#[test]
fn parses_dashboard_fixture() {
    let raw = read_fixture("player_dashboard.json");
    let dash = normalize_dashboard_json(&raw, "202695", "2018-19").expect("fixture should parse");
    assert_eq!(dash.games_played, 60);
    assert_eq!(dash.minutes, Some(34.0));
    assert_eq!(dash.points, Some(26.6));
    assert_eq!(dash.rebounds, Some(7.3));
    assert_eq!(dash.assists, None);
}

#[test]
fn dashboard_with_empty_rows_has_null_aggregates() {
    let raw = r#"{ "OverallPlayerDashboard": [] }"#;
    let dash = normalize_dashboard_json(raw, "202695", "2018-19").expect("should parse");
    assert_eq!(dash.games_played, 0);
    assert_eq!(dash.points, None);
    assert_eq!(dash.season, "2018-19");
}
