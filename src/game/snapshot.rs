//! Read-only render snapshots and the throttle for emitting them

use serde::{Deserialize, Serialize};

use super::events::MatchEvent;
use super::fighter::{CombatState, Fighter};

pub const COLOR_ATTACKING: u32 = 0xff0000;
pub const COLOR_BLOCKING: u32 = 0xffff00;
pub const COLOR_HURT: u32 = 0xffffff;
pub const COLOR_REVERSAL: u32 = 0x550000;

/// Display colour for a state; states without an entry show the base colour
pub fn display_color(state: CombatState, base_color: u32) -> u32 {
    match state {
        CombatState::Attacking => COLOR_ATTACKING,
        CombatState::Blocking => COLOR_BLOCKING,
        CombatState::Hurt => COLOR_HURT,
        CombatState::Reversal => COLOR_REVERSAL,
        _ => base_color,
    }
}

/// What a renderer or HUD gets per fighter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterView {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub display_color: u32,
    pub state: CombatState,
    pub hp: u32,
    pub max_hp: u32,
    pub ultimate_meter: u32,
}

impl FighterView {
    pub fn of(fighter: &Fighter) -> Self {
        let position = fighter.position();
        Self {
            name: fighter.name().to_string(),
            x: position.x,
            y: position.y,
            display_color: display_color(fighter.state(), fighter.base_color()),
            state: fighter.state(),
            hp: fighter.hp(),
            max_hp: fighter.max_hp(),
            ultimate_meter: fighter.ultimate_meter(),
        }
    }
}

/// Full render-side view of a match at one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub tick: u64,
    pub fighters: [FighterView; 2],
    /// Events from the most recent step
    pub events: Vec<MatchEvent>,
}

/// Lets every Nth render through
#[derive(Debug, Clone)]
pub struct RenderThrottle {
    renders_since_emit: u32,
    interval: u32,
}

impl RenderThrottle {
    pub fn new(interval: u32) -> Self {
        let interval = interval.max(1);
        Self {
            renders_since_emit: 0,
            interval,
        }
    }

    /// Count one render; true when it should be emitted
    pub fn should_emit(&mut self) -> bool {
        self.renders_since_emit += 1;
        if self.renders_since_emit >= self.interval {
            self.renders_since_emit = 0;
            true
        } else {
            false
        }
    }

    /// Emit on the next check (used for important events)
    pub fn force_next(&mut self) {
        self.renders_since_emit = self.interval;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::fighter::{FighterEvent, Position};
    use crate::roster::Roster;

    #[test]
    fn colour_table() {
        let base = 0x00ff00;
        assert_eq!(display_color(CombatState::Attacking, base), COLOR_ATTACKING);
        assert_eq!(display_color(CombatState::Blocking, base), COLOR_BLOCKING);
        assert_eq!(display_color(CombatState::Hurt, base), COLOR_HURT);
        assert_eq!(display_color(CombatState::Reversal, base), COLOR_REVERSAL);
        assert_eq!(display_color(CombatState::Idle, base), base);
        assert_eq!(display_color(CombatState::SpecialMove, base), base);
        assert_eq!(display_color(CombatState::KnockedOut, base), base);
    }

    #[test]
    fn view_reflects_fighter() {
        let roster = Roster::builtin().unwrap();
        let mut fighter = Fighter::new(
            "steven_seagal",
            roster.fighter("steven_seagal").unwrap().clone(),
            Position::new(-2.0, 0.0),
            0x00ff00,
        );
        fighter.send(FighterEvent::HitReceived { damage: Some(40) });

        let view = FighterView::of(&fighter);
        assert_eq!(view.name, "Steven Seagal");
        assert_eq!(view.x, -2.0);
        assert_eq!(view.display_color, COLOR_HURT);
        assert_eq!(view.hp, 60);
    }

    #[test]
    fn throttle_emits_every_nth() {
        let mut throttle = RenderThrottle::new(3);
        let emitted: Vec<bool> = (0..6).map(|_| throttle.should_emit()).collect();
        assert_eq!(emitted, vec![false, false, true, false, false, true]);

        throttle.force_next();
        assert!(throttle.should_emit());
    }
}
