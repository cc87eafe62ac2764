//! Events a match step produces, for logging and downstream consumers

use serde::{Deserialize, Serialize};

use super::fighter::CombatState;
use super::Side;

/// Why the match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Knockout,
    /// Simulation-time limit reached; decided on remaining hp fraction
    TimeLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MatchOutcome {
    Winner { side: Side, reason: EndReason },
    Draw { reason: EndReason },
}

impl MatchOutcome {
    pub fn winner(&self) -> Option<Side> {
        match self {
            MatchOutcome::Winner { side, .. } => Some(*side),
            MatchOutcome::Draw { .. } => None,
        }
    }

    pub fn reason(&self) -> EndReason {
        match self {
            MatchOutcome::Winner { reason, .. } | MatchOutcome::Draw { reason } => *reason,
        }
    }
}

/// Match events (transitions, hits, knockouts)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum MatchEvent {
    StateChanged {
        side: Side,
        from: CombatState,
        to: CombatState,
    },

    /// Strike delivered to an unguarded defender
    Hit {
        attacker: Side,
        defender: Side,
        damage: u32,
        defender_hp: u32,
    },

    /// A hit landed inside the counter window
    Reversal { side: Side },

    ComboTriggered { side: Side, name: String },

    Knockout { side: Side },

    MatchEnded { outcome: MatchOutcome },
}
