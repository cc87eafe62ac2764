//! Combat resolution - range checks and hit delivery between the two fighters

use serde::{Deserialize, Serialize};

use super::fighter::{Fighter, FighterEvent};
use super::Side;

/// Reach of a strike in simulation units
pub const DEFAULT_HIT_RANGE: f64 = 1.5;

/// A strike that connects this step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hit {
    pub attacker: Side,
    pub defender: Side,
    pub damage: u32,
}

impl Hit {
    /// Event to deliver to the defender's state machine
    pub fn event(&self) -> FighterEvent {
        FighterEvent::HitReceived {
            damage: Some(self.damage),
        }
    }
}

/// Decides hit, block or whiff for each ordered pair. Never mutates fighters:
/// hits are handed back for the defenders' own state machines to apply.
#[derive(Debug, Clone, Copy)]
pub struct CombatResolver {
    hit_range: f64,
}

impl CombatResolver {
    pub fn new(hit_range: f64) -> Self {
        Self { hit_range }
    }

    /// Both directions are judged from the same pre-step states, so two
    /// fighters striking each other in range both get hit (a trade).
    pub fn resolve(&self, one: &Fighter, two: &Fighter) -> Vec<Hit> {
        let distance = one.position().distance_to(two.position());
        if distance >= self.hit_range {
            return Vec::new();
        }

        [(Side::One, one, Side::Two, two), (Side::Two, two, Side::One, one)]
            .into_iter()
            .filter(|(_, _, _, defender)| !defender.state().is_guarded())
            .filter_map(|(attacker_side, attacker, defender_side, _)| {
                attacker.outgoing_damage().map(|damage| Hit {
                    attacker: attacker_side,
                    defender: defender_side,
                    damage,
                })
            })
            .collect()
    }
}

impl Default for CombatResolver {
    fn default() -> Self {
        Self::new(DEFAULT_HIT_RANGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::fighter::{CombatState, Position};
    use crate::input::AttackVariant;
    use crate::roster::Roster;

    fn pair(gap: f64) -> (Fighter, Fighter) {
        let roster = Roster::builtin().unwrap();
        let one = Fighter::new(
            "steven_seagal",
            roster.fighter("steven_seagal").unwrap().clone(),
            Position::new(0.0, 0.0),
            0x00ff00,
        );
        let two = Fighter::new(
            "chuck_norris",
            roster.fighter("chuck_norris").unwrap().clone(),
            Position::new(gap, 0.0),
            0xff0000,
        );
        (one, two)
    }

    fn heavy() -> FighterEvent {
        FighterEvent::Attack {
            variant: AttackVariant::Heavy,
        }
    }

    fn deliver(hits: &[Hit], one: &mut Fighter, two: &mut Fighter) {
        for hit in hits {
            match hit.defender {
                Side::One => one.send(hit.event()),
                Side::Two => two.send(hit.event()),
            };
        }
    }

    #[test]
    fn attack_in_range_hits_idle_defender() {
        let (mut one, two) = pair(1.0);
        one.send(heavy());
        let hits = CombatResolver::default().resolve(&one, &two);
        assert_eq!(
            hits,
            vec![Hit {
                attacker: Side::One,
                defender: Side::Two,
                damage: 10
            }]
        );
    }

    #[test]
    fn out_of_range_whiffs() {
        let (mut one, two) = pair(1.5);
        one.send(heavy());
        assert!(CombatResolver::default().resolve(&one, &two).is_empty());
    }

    #[test]
    fn mutual_trade_hurts_both() {
        let (mut one, mut two) = pair(1.0);
        one.send(heavy());
        two.send(heavy());

        let hits = CombatResolver::default().resolve(&one, &two);
        assert_eq!(hits.len(), 2);
        deliver(&hits, &mut one, &mut two);

        assert_eq!(one.state(), CombatState::Hurt);
        assert_eq!(two.state(), CombatState::Hurt);
        assert_eq!(one.hp(), 100 - 12);
        assert_eq!(two.hp(), 120 - 10);
    }

    #[test]
    fn blocking_defender_reverses_without_damage() {
        let (mut one, mut two) = pair(1.0);
        one.send(heavy());
        two.send(FighterEvent::Block);

        // blocking is guarded, so the resolver sends nothing
        let hits = CombatResolver::default().resolve(&one, &two);
        assert!(hits.is_empty());

        // a hit delivered to a blocker reverses it
        let change = two.send(FighterEvent::HitReceived { damage: Some(10) }).unwrap();
        assert_eq!(change.to, CombatState::Reversal);
        assert_eq!(two.hp(), 120);
    }

    #[test]
    fn special_move_deals_special_damage() {
        let (mut one, mut two) = pair(0.5);
        one.send(FighterEvent::Special {
            name: "JOINT_LOCK".into(),
        });
        let hits = CombatResolver::default().resolve(&one, &two);
        deliver(&hits, &mut one, &mut two);
        assert_eq!(two.hp(), 120 - 25);
    }

    #[test]
    fn hurt_defender_is_not_hit_again() {
        let (mut one, mut two) = pair(1.0);
        one.send(heavy());
        let resolver = CombatResolver::default();
        let hits = resolver.resolve(&one, &two);
        deliver(&hits, &mut one, &mut two);

        assert!(resolver.resolve(&one, &two).is_empty());
        assert_eq!(two.hp(), 110);
    }
}
