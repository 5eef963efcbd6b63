use courtside::lead_tracker::track_leads;
use courtside::model::ScoreSnapshot;

const HOME: &str = "1610612761";
const AWAY: &str = "1610612744";

fn snaps(scores: &[(u32, u32)]) -> Vec<ScoreSnapshot> {
    scores
        .iter()
        .enumerate()
        .map(|(idx, &(home_score, away_score))| ScoreSnapshot {
            sequence: idx as u64 + 1,
            home_score,
            away_score,
            quarter: 1,
        })
        .collect()
}

#[test]
fn one_entry_per_snapshot_in_order() {
    let out = track_leads(&snaps(&[(2, 0), (2, 3), (4, 4)]), HOME, AWAY);
    let leaders: Vec<Option<&str>> = out
        .entries
        .iter()
        .map(|e| e.leading_team_id.as_deref())
        .collect();
    assert_eq!(leaders, vec![Some(HOME), Some(AWAY), None]);
    let sequences: Vec<u64> = out.entries.iter().map(|e| e.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3]);
    assert_eq!(out.entries[2].margin, 0);
}

#[test]
fn runs_of_ties_count_once() {
    // home, home, tie, tie, away, tie
    let out = track_leads(
        &snaps(&[(2, 0), (4, 0), (4, 4), (6, 6), (6, 8), (8, 8)]),
        HOME,
        AWAY,
    );
    assert_eq!(out.times_tied, 2);
}

#[test]
fn lead_taken_from_a_tie_is_not_a_change() {
    // home, home, tie, away
    let out = track_leads(&snaps(&[(2, 0), (4, 0), (4, 4), (4, 6)]), HOME, AWAY);
    assert_eq!(out.lead_changes, 0);
    assert_eq!(out.times_tied, 1);
}

#[test]
fn direct_swaps_count_as_changes() {
    // home, away, home
    let out = track_leads(&snaps(&[(2, 0), (2, 3), (5, 3)]), HOME, AWAY);
    assert_eq!(out.lead_changes, 2);
    assert_eq!(out.times_tied, 0);
}

#[test]
fn empty_input_yields_zero_counts() {
    let out = track_leads(&[], HOME, AWAY);
    assert!(out.entries.is_empty());
    assert_eq!(out.times_tied, 0);
    assert_eq!(out.lead_changes, 0);
}

#[test]
fn scoreless_opening_is_a_tie() {
    let out = track_leads(&snaps(&[(0, 0)]), HOME, AWAY);
    assert_eq!(out.times_tied, 1);
    assert_eq!(out.entries[0].leading_team_id, None);
}
