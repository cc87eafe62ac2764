//! Post-match summary record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::{DuelMatch, MatchOutcome, MatchStats, Side};

/// What the binary emits once a match is over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: Uuid,
    pub finished_at: DateTime<Utc>,
    /// `None` when the match was stopped before it ended
    pub outcome: Option<MatchOutcome>,
    pub stats: MatchStats,
}

impl MatchRecord {
    pub fn from_match(duel: &DuelMatch) -> Self {
        Self {
            match_id: duel.id(),
            finished_at: Utc::now(),
            outcome: duel.outcome(),
            stats: duel.stats(),
        }
    }

    pub fn winner(&self) -> Option<Side> {
        self.outcome.and_then(|outcome| outcome.winner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Controller, MatchRules};
    use crate::input::NoInput;
    use crate::roster::Roster;

    #[test]
    fn record_of_unfinished_match() {
        let roster = Roster::builtin().unwrap();
        let duel = DuelMatch::new(
            &roster,
            ["steven_seagal", "chuck_norris"],
            [
                Controller::human(NoInput, &[]).unwrap(),
                Controller::human(NoInput, &[]).unwrap(),
            ],
            MatchRules::default(),
        )
        .unwrap();

        let record = MatchRecord::from_match(&duel);
        assert_eq!(record.match_id, duel.id());
        assert_eq!(record.winner(), None);
        assert_eq!(record.stats.fighters[1].key, "chuck_norris");

        let json = serde_json::to_value(&record).unwrap();
        assert!(json["outcome"].is_null());
        assert!(json["finished_at"].is_string());
    }
}
