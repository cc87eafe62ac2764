//! Input intent resolution: history buffer, combo matching, priority reduction

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::actions::{Action, ActionSet, HeldActionProvider};

/// Frames of held-action history kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 60;
/// Frames a combo scan may walk back before giving up
pub const DEFAULT_COMBO_LOOKBACK: usize = 20;

/// A registered button sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboDefinition {
    pub name: String,
    #[serde(rename = "sequence")]
    pub action_sequence: Vec<Action>,
    #[serde(default = "default_priority")]
    pub priority: i32,
}

fn default_priority() -> i32 {
    1
}

impl ComboDefinition {
    pub fn new(name: impl Into<String>, action_sequence: Vec<Action>) -> Self {
        Self {
            name: name.into(),
            action_sequence,
            priority: default_priority(),
        }
    }
}

/// Attack strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackVariant {
    Light,
    Heavy,
}

/// Directional intent; each axis is -1, 0 or 1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveVector {
    pub x: i8,
    pub y: i8,
}

/// The single action resolved for one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    Combo { name: String },
    Ultimate,
    Block,
    Attack { variant: AttackVariant },
    Move { vector: MoveVector },
}

/// One recorded step of held actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputFrame {
    pub sequence_index: u64,
    pub held_actions: ActionSet,
}

/// Turns held actions into one [`Intent`] per step
pub struct InputResolver {
    provider: Box<dyn HeldActionProvider>,
    history: VecDeque<InputFrame>,
    capacity: usize,
    lookback: usize,
    combos: Vec<ComboDefinition>,
}

impl InputResolver {
    pub fn new(provider: impl HeldActionProvider + 'static) -> Self {
        Self::with_limits(provider, DEFAULT_HISTORY_CAPACITY, DEFAULT_COMBO_LOOKBACK)
    }

    pub fn with_limits(
        provider: impl HeldActionProvider + 'static,
        capacity: usize,
        lookback: usize,
    ) -> Self {
        let capacity = capacity.max(1);
        Self {
            provider: Box::new(provider),
            history: VecDeque::with_capacity(capacity),
            capacity,
            lookback,
            combos: Vec::new(),
        }
    }

    /// Combos match in registration order
    pub fn register_combo(&mut self, combo: ComboDefinition) {
        self.combos.push(combo);
    }

    pub fn combos(&self) -> &[ComboDefinition] {
        &self.combos
    }

    /// Recorded frames, oldest first
    pub fn history(&self) -> impl Iterator<Item = &InputFrame> {
        self.history.iter()
    }

    /// Sample the provider, record the frame and resolve this step's intent
    pub fn update(&mut self, step_index: u64) -> Option<Intent> {
        let held = self.provider.held_actions();

        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(InputFrame {
            sequence_index: step_index,
            held_actions: held,
        });

        if let Some(name) = self.match_combo() {
            debug!(combo = %name, step = step_index, "Combo matched");
            self.history.clear();
            return Some(Intent::Combo { name });
        }

        reduce_held(held)
    }

    fn match_combo(&self) -> Option<String> {
        self.combos
            .iter()
            .find(|combo| self.sequence_matches(&combo.action_sequence))
            .map(|combo| combo.name.clone())
    }

    /// Walk history newest to oldest, consuming the sequence from its end.
    /// At most one required action is consumed per frame.
    fn sequence_matches(&self, sequence: &[Action]) -> bool {
        let Some(mut cursor) = sequence.len().checked_sub(1) else {
            return false;
        };

        for (scanned, frame) in self.history.iter().rev().enumerate() {
            if frame.held_actions.contains(sequence[cursor]) {
                if cursor == 0 {
                    return true;
                }
                cursor -= 1;
            }
            if scanned > self.lookback {
                return false;
            }
        }
        false
    }
}

/// Priority: ultimate, block, heavy, light, then movement
fn reduce_held(held: ActionSet) -> Option<Intent> {
    if held.contains(Action::Ultimate) {
        return Some(Intent::Ultimate);
    }
    if held.contains(Action::Block) {
        return Some(Intent::Block);
    }
    if held.contains(Action::HeavyPunch) {
        return Some(Intent::Attack {
            variant: AttackVariant::Heavy,
        });
    }
    if held.contains(Action::LightPunch) {
        return Some(Intent::Attack {
            variant: AttackVariant::Light,
        });
    }

    let vector = MoveVector {
        x: axis(held, Action::Left, Action::Right),
        y: axis(held, Action::Down, Action::Up),
    };
    let directional = [Action::Up, Action::Down, Action::Left, Action::Right]
        .into_iter()
        .any(|a| held.contains(a));
    directional.then_some(Intent::Move { vector })
}

/// Positive direction wins when both are held
fn axis(held: ActionSet, negative: Action, positive: Action) -> i8 {
    if held.contains(positive) {
        1
    } else if held.contains(negative) {
        -1
    } else {
        0
    }
}
