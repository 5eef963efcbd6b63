use crate::model::{LeadTrackerEntry, ScoreSnapshot};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LeadTracker {
    pub entries: Vec<LeadTrackerEntry>,
    pub times_tied: u32,
    pub lead_changes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Leader<'a> {
    NoneYet,
    Tied,
    Team(&'a str),
}

/// Single pass over the snapshots.
///
/// A tie counts once per run of tied snapshots. A lead change is counted only
/// when one team's lead passes directly to the other; going through a tie
/// first establishes a new lead rather than swapping it.
pub fn track_leads(snapshots: &[ScoreSnapshot], home_team_id: &str, away_team_id: &str) -> LeadTracker {
    let mut out = LeadTracker {
        entries: Vec::with_capacity(snapshots.len()),
        ..LeadTracker::default()
    };
    let mut previous = Leader::NoneYet;

    for snap in snapshots {
        let current = if snap.home_score > snap.away_score {
            Leader::Team(home_team_id)
        } else if snap.away_score > snap.home_score {
            Leader::Team(away_team_id)
        } else {
            Leader::Tied
        };

        match (previous, current) {
            (prev, Leader::Tied) if prev != Leader::Tied => out.times_tied += 1,
            (Leader::Team(prev), Leader::Team(cur)) if prev != cur => out.lead_changes += 1,
            _ => {}
        }

        out.entries.push(LeadTrackerEntry {
            sequence: snap.sequence,
            leading_team_id: match current {
                Leader::Team(id) => Some(id.to_string()),
                _ => None,
            },
            margin: snap.home_score.abs_diff(snap.away_score),
        });
        previous = current;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(sequence: u64, home: u32, away: u32) -> ScoreSnapshot {
        ScoreSnapshot {
            sequence,
            home_score: home,
            away_score: away,
            quarter: 1,
        }
    }

    #[test]
    fn opening_tie_counts_as_a_tie_event() {
        let out = track_leads(&[snap(1, 0, 0), snap(2, 2, 0)], "H", "A");
        assert_eq!(out.times_tied, 1);
        assert_eq!(out.lead_changes, 0);
    }

    #[test]
    fn margin_is_absolute() {
        let out = track_leads(&[snap(1, 3, 10)], "H", "A");
        assert_eq!(out.entries[0].margin, 7);
        assert_eq!(out.entries[0].leading_team_id.as_deref(), Some("A"));
    }
}
