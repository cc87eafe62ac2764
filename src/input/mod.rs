//! Player input: held actions in, one intent per simulation step out

pub mod actions;
pub mod resolver;

pub use actions::{Action, ActionLatch, ActionSet, HeldActionProvider, NoInput};
pub use resolver::{
    AttackVariant, ComboDefinition, InputFrame, InputResolver, Intent, MoveVector,
    DEFAULT_COMBO_LOOKBACK, DEFAULT_HISTORY_CAPACITY,
};
