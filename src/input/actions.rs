//! Resolved input actions and the providers that report them

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// A logical input, already decoupled from physical keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    LightPunch,
    HeavyPunch,
    Block,
    Ultimate,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::LightPunch,
        Action::HeavyPunch,
        Action::Block,
        Action::Ultimate,
    ];

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Set of held actions, one bit per [`Action`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ActionSet(u8);

impl ActionSet {
    pub const EMPTY: ActionSet = ActionSet(0);

    pub fn contains(self, action: Action) -> bool {
        self.0 & action.bit() != 0
    }

    pub fn insert(&mut self, action: Action) {
        self.0 |= action.bit();
    }

    pub fn remove(&mut self, action: Action) {
        self.0 &= !action.bit();
    }

    pub fn with(mut self, action: Action) -> Self {
        self.insert(action);
        self
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Action> {
        Action::ALL.into_iter().filter(move |a| self.contains(*a))
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        iter.into_iter().fold(ActionSet::EMPTY, ActionSet::with)
    }
}

/// Source of the currently held actions, sampled once per step
pub trait HeldActionProvider {
    fn held_actions(&self) -> ActionSet;
}

/// Provider that never reports anything held
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInput;

impl HeldActionProvider for NoInput {
    fn held_actions(&self) -> ActionSet {
        ActionSet::EMPTY
    }
}

/// Shared press/release state. Clones observe the same set, so a capture
/// layer can keep one handle while the resolver samples the other.
#[derive(Debug, Clone, Default)]
pub struct ActionLatch {
    held: Rc<Cell<ActionSet>>,
}

impl ActionLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self, action: Action) {
        let mut held = self.held.get();
        held.insert(action);
        self.held.set(held);
    }

    pub fn release(&self, action: Action) {
        let mut held = self.held.get();
        held.remove(action);
        self.held.set(held);
    }

    /// Replace the whole held set
    pub fn set(&self, held: ActionSet) {
        self.held.set(held);
    }

    pub fn release_all(&self) {
        self.held.set(ActionSet::EMPTY);
    }
}

impl HeldActionProvider for ActionLatch {
    fn held_actions(&self) -> ActionSet {
        self.held.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_membership() {
        let mut set = ActionSet::EMPTY.with(Action::Down).with(Action::HeavyPunch);
        assert!(set.contains(Action::Down));
        assert!(!set.contains(Action::Up));
        set.remove(Action::Down);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Action::HeavyPunch]);
    }

    #[test]
    fn latch_clones_share_state() {
        let latch = ActionLatch::new();
        let sampler = latch.clone();
        latch.press(Action::Left);
        latch.press(Action::Block);
        latch.release(Action::Left);
        assert_eq!(sampler.held_actions(), ActionSet::EMPTY.with(Action::Block));
        latch.release_all();
        assert!(sampler.held_actions().is_empty());
    }

    #[test]
    fn actions_use_screaming_case_names() {
        let parsed: Vec<Action> = serde_json::from_str(r#"["HEAVY_PUNCH","LIGHT_PUNCH","UP"]"#).unwrap();
        assert_eq!(parsed, vec![Action::HeavyPunch, Action::LightPunch, Action::Up]);
    }
}
