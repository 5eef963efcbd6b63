use crate::model::{QuarterDelta, ScoreSnapshot};

pub const REGULATION_QUARTERS: u8 = 4;

/// Per-quarter points from cumulative snapshots.
///
/// Each quarter's delta is its last snapshot minus the previous encountered
/// quarter's last snapshot (zero before the first). Quarters without a
/// snapshot are left out so "not started" stays distinct from a scoreless
/// quarter. When `is_live`, the final quarter is flagged provisional.
pub fn quarter_deltas(snapshots: &[ScoreSnapshot], is_live: bool) -> Vec<QuarterDelta> {
    let mut closing: Vec<(u8, u32, u32)> = Vec::new();
    for snap in snapshots {
        match closing.iter_mut().find(|(q, _, _)| *q == snap.quarter) {
            Some(slot) => *slot = (snap.quarter, snap.home_score, snap.away_score),
            None => closing.push((snap.quarter, snap.home_score, snap.away_score)),
        }
    }
    closing.sort_by_key(|(q, _, _)| *q);

    let mut prev_home = 0u32;
    let mut prev_away = 0u32;
    let mut out = Vec::with_capacity(closing.len());
    for (quarter, home, away) in closing {
        out.push(QuarterDelta {
            quarter,
            home_points: home.saturating_sub(prev_home),
            away_points: away.saturating_sub(prev_away),
            provisional: false,
        });
        prev_home = home;
        prev_away = away;
    }
    if is_live && let Some(last) = out.last_mut() {
        last.provisional = true;
    }
    out
}

pub fn quarter_label(quarter: u8) -> String {
    match quarter {
        0 => "-".to_string(),
        q if q <= REGULATION_QUARTERS => format!("Q{q}"),
        q if q == REGULATION_QUARTERS + 1 => "OT".to_string(),
        q => format!("{}OT", q - REGULATION_QUARTERS),
    }
}
