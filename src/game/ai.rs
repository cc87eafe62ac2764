//! Decision policy for a computer-controlled fighter

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::fighter::{Fighter, FighterEvent};
use crate::input::{AttackVariant, MoveVector};

/// Slack so a reaction time that is a whole number of steps fires on that step
const REACTION_EPSILON: f64 = 1e-9;

/// Policy tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyConfig {
    /// Seconds between decisions
    pub reaction_time: f64,
    /// Distance under which the policy fights instead of closing in
    pub attack_range: f64,
    /// Multiplier on the step length when closing in
    pub approach_scale: f64,
    /// Relative weight of a heavy attack
    pub attack_weight: f64,
    /// Relative weight of blocking
    pub block_weight: f64,
    /// Relative weight of holding still
    pub hold_weight: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            reaction_time: 0.5,
            attack_range: 1.6,
            approach_scale: 25.0,
            attack_weight: 0.6,
            block_weight: 0.2,
            hold_weight: 0.2,
        }
    }
}

impl PolicyConfig {
    pub fn validate(&self) -> Result<(), PolicyError> {
        let weights = [self.attack_weight, self.block_weight, self.hold_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(PolicyError::NegativeWeight);
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(PolicyError::ZeroWeights);
        }
        if !(self.reaction_time.is_finite() && self.reaction_time > 0.0) {
            return Err(PolicyError::ReactionTime(self.reaction_time));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PolicyError {
    #[error("Decision weights must be non-negative numbers")]
    NegativeWeight,

    #[error("At least one decision weight must be positive")]
    ZeroWeights,

    #[error("Reaction time must be positive, got {0}")]
    ReactionTime(f64),
}

/// What the policy wants this step; the same vocabulary a human produces
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Walk toward the target with an already-scaled step length
    Approach { vector: MoveVector, dt: f64 },
    Send(FighterEvent),
}

/// Acts once per reaction window, not every step
#[derive(Debug, Clone)]
pub struct DecisionPolicy {
    config: PolicyConfig,
    timer: f64,
    rng: ChaCha8Rng,
}

impl DecisionPolicy {
    pub fn new(config: PolicyConfig, seed: u64) -> Result<Self, PolicyError> {
        config.validate()?;
        Ok(Self {
            config,
            timer: 0.0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    /// Called every step; returns a decision only when the reaction timer fires
    pub fn update(&mut self, dt: f64, me: &Fighter, target: &Fighter) -> Option<Decision> {
        self.timer += dt;
        if self.timer + REACTION_EPSILON < self.config.reaction_time {
            return None;
        }
        self.timer = 0.0;

        let here = me.position();
        let there = target.position();
        let distance = here.distance_to(there);

        if distance > self.config.attack_range {
            let x = if there.x - here.x > 0.0 { 1 } else { -1 };
            return Some(Decision::Approach {
                vector: MoveVector { x, y: 0 },
                dt: dt * self.config.approach_scale,
            });
        }

        Some(Decision::Send(self.pick_action()))
    }

    fn pick_action(&mut self) -> FighterEvent {
        let c = &self.config;
        let total = c.attack_weight + c.block_weight + c.hold_weight;
        let roll = self.rng.gen::<f64>() * total;

        if roll < c.attack_weight {
            FighterEvent::Attack {
                variant: AttackVariant::Heavy,
            }
        } else if roll < c.attack_weight + c.block_weight {
            FighterEvent::Block
        } else {
            FighterEvent::Stop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::fighter::Position;
    use crate::roster::Roster;

    const STEP: f64 = 1.0 / 60.0;

    fn fighter_at(x: f64) -> Fighter {
        let roster = Roster::builtin().unwrap();
        Fighter::new(
            "chuck_norris",
            roster.fighter("chuck_norris").unwrap().clone(),
            Position::new(x, 0.0),
            0xff0000,
        )
    }

    #[test]
    fn waits_for_reaction_time() {
        let mut policy = DecisionPolicy::new(PolicyConfig::default(), 7).unwrap();
        let me = fighter_at(5.0);
        let target = fighter_at(0.0);

        let decisions: Vec<usize> = (0..90)
            .filter_map(|i| policy.update(STEP, &me, &target).map(|_| i))
            .collect();
        // 0.5s at 60Hz: first decision on the 30th step, then every 30
        assert_eq!(decisions, vec![29, 59, 89]);
    }

    #[test]
    fn approaches_distant_target() {
        let mut policy = DecisionPolicy::new(
            PolicyConfig {
                reaction_time: STEP,
                ..PolicyConfig::default()
            },
            1,
        )
        .unwrap();
        let me = fighter_at(5.0);
        let target = fighter_at(0.0);

        match policy.update(STEP, &me, &target) {
            Some(Decision::Approach { vector, dt }) => {
                assert_eq!(vector, MoveVector { x: -1, y: 0 });
                assert!((dt - STEP * 25.0).abs() < 1e-12);
            }
            other => panic!("expected approach, got {other:?}"),
        }
    }

    #[test]
    fn fights_in_range_with_fixed_vocabulary() {
        let mut policy = DecisionPolicy::new(
            PolicyConfig {
                reaction_time: STEP,
                ..PolicyConfig::default()
            },
            3,
        )
        .unwrap();
        let me = fighter_at(1.0);
        let target = fighter_at(0.0);

        let mut attacks = 0;
        for _ in 0..1_000 {
            match policy.update(STEP, &me, &target) {
                Some(Decision::Send(FighterEvent::Attack {
                    variant: AttackVariant::Heavy,
                })) => attacks += 1,
                Some(Decision::Send(FighterEvent::Block | FighterEvent::Stop)) => {}
                other => panic!("unexpected decision {other:?}"),
            }
        }
        // 60% weight; loose bounds
        assert!((500..700).contains(&attacks), "attacks = {attacks}");
    }

    #[test]
    fn same_seed_same_choices() {
        let config = PolicyConfig {
            reaction_time: STEP,
            ..PolicyConfig::default()
        };
        let me = fighter_at(1.0);
        let target = fighter_at(0.0);
        let run = |seed| {
            let mut policy = DecisionPolicy::new(config, seed).unwrap();
            (0..50)
                .map(|_| policy.update(STEP, &me, &target))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn invalid_weights_rejected() {
        let config = PolicyConfig {
            attack_weight: 0.0,
            block_weight: 0.0,
            hold_weight: 0.0,
            ..PolicyConfig::default()
        };
        assert_eq!(config.validate(), Err(PolicyError::ZeroWeights));

        let config = PolicyConfig {
            block_weight: -1.0,
            ..PolicyConfig::default()
        };
        assert!(DecisionPolicy::new(config, 0).is_err());
    }
}
