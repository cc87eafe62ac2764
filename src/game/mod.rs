//! Duel simulation modules

pub mod ai;
pub mod combat;
pub mod events;
pub mod fighter;
pub mod r#match;
pub mod snapshot;

pub use ai::{Decision, DecisionPolicy, PolicyConfig, PolicyError};
pub use combat::{CombatResolver, Hit, DEFAULT_HIT_RANGE};
pub use events::{EndReason, MatchEvent, MatchOutcome};
pub use fighter::{ActiveMove, CombatState, Fighter, FighterEvent, Position, StateChange};
pub use r#match::{
    Controller, DuelMatch, FighterMatchStats, MatchPhase, MatchRules, MatchStats, SetupError,
};
pub use snapshot::{display_color, FighterView, MatchSnapshot, RenderThrottle};

use serde::{Deserialize, Serialize};

/// Which of the two fighters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    One,
    Two,
}

impl Side {
    /// Processing order within a step
    pub const BOTH: [Side; 2] = [Side::One, Side::Two];

    pub fn index(self) -> usize {
        match self {
            Side::One => 0,
            Side::Two => 1,
        }
    }
}
