//! Duel state and the per-step simulation order

use tracing::{debug, info};
use uuid::Uuid;

use crate::engine::Tick;
use crate::input::{ComboDefinition, HeldActionProvider, InputResolver, Intent};
use crate::roster::{validate_combos, Roster, RosterError};

use super::ai::{Decision, DecisionPolicy, PolicyConfig, PolicyError};
use super::combat::{CombatResolver, DEFAULT_HIT_RANGE};
use super::events::{EndReason, MatchEvent, MatchOutcome};
use super::fighter::{CombatState, Fighter, FighterEvent, Position, StateChange};
use super::snapshot::{FighterView, MatchSnapshot};
use super::Side;

const BASE_COLORS: [u32; 2] = [0x00ff00, 0xff0000];
const TIME_EPSILON: f64 = 1e-9;

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    InProgress,
    Ended,
}

/// Match setup errors, all surfaced before the first step
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error("Invalid decision policy: {0}")]
    Policy(#[from] PolicyError),

    #[error("Invalid match rules: {0}")]
    Rules(&'static str),
}

/// Arena rules for one match
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchRules {
    pub hit_range: f64,
    /// Starting horizontal positions for sides one and two
    pub spawn_x: [f64; 2],
    /// Simulation seconds before the match goes to decision
    pub time_limit_secs: Option<f64>,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            hit_range: DEFAULT_HIT_RANGE,
            spawn_x: [-2.0, 2.0],
            time_limit_secs: None,
        }
    }
}

impl MatchRules {
    fn validate(&self) -> Result<(), SetupError> {
        if !(self.hit_range.is_finite() && self.hit_range > 0.0) {
            return Err(SetupError::Rules("hit range must be positive"));
        }
        if self.spawn_x.iter().any(|x| !x.is_finite()) {
            return Err(SetupError::Rules("spawn positions must be finite"));
        }
        if let Some(limit) = self.time_limit_secs {
            if !(limit.is_finite() && limit > 0.0) {
                return Err(SetupError::Rules("time limit must be positive"));
            }
        }
        Ok(())
    }
}

/// Decision source for one side
pub enum Controller {
    Human(InputResolver),
    Ai(DecisionPolicy),
}

impl Controller {
    /// Input resolver over `provider` with `combos` registered in order
    pub fn human(
        provider: impl HeldActionProvider + 'static,
        combos: &[ComboDefinition],
    ) -> Result<Self, SetupError> {
        validate_combos(combos)?;
        let mut resolver = InputResolver::new(provider);
        for combo in combos {
            resolver.register_combo(combo.clone());
        }
        Ok(Controller::Human(resolver))
    }

    pub fn ai(config: PolicyConfig, seed: u64) -> Result<Self, SetupError> {
        Ok(Controller::Ai(DecisionPolicy::new(config, seed)?))
    }

    fn kind(&self) -> &'static str {
        match self {
            Controller::Human(_) => "human",
            Controller::Ai(_) => "ai",
        }
    }
}

/// Per-fighter tallies
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FighterMatchStats {
    pub key: String,
    pub hits_landed: u32,
    pub damage_dealt: u32,
    pub damage_taken: u32,
    pub reversals: u32,
    pub combos: u32,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MatchStats {
    pub ticks: u64,
    pub duration_secs: f64,
    pub fighters: [FighterMatchStats; 2],
}

/// Two fighters, their controllers and the resolver between them
pub struct DuelMatch {
    id: Uuid,
    phase: MatchPhase,
    tick: u64,
    elapsed_secs: f64,
    fighters: [Fighter; 2],
    controllers: [Controller; 2],
    resolver: CombatResolver,
    rules: MatchRules,
    outcome: Option<MatchOutcome>,
    events: Vec<MatchEvent>,
    stats: [FighterMatchStats; 2],
}

impl DuelMatch {
    /// Build a match from roster keys. Any missing or malformed setup data
    /// fails here, before anything is simulated.
    pub fn new(
        roster: &Roster,
        fighter_keys: [&str; 2],
        controllers: [Controller; 2],
        rules: MatchRules,
    ) -> Result<Self, SetupError> {
        rules.validate()?;

        let spawn = |side: Side| -> Result<Fighter, SetupError> {
            let key = fighter_keys[side.index()];
            let data = roster.fighter(key)?.clone();
            Ok(Fighter::new(
                key,
                data,
                Position::new(rules.spawn_x[side.index()], 0.0),
                BASE_COLORS[side.index()],
            ))
        };
        let fighters = [spawn(Side::One)?, spawn(Side::Two)?];

        let id = Uuid::new_v4();
        info!(
            match_id = %id,
            one = fighter_keys[0],
            one_control = controllers[0].kind(),
            two = fighter_keys[1],
            two_control = controllers[1].kind(),
            "Match created"
        );

        let stats = fighter_keys.map(|key| FighterMatchStats {
            key: key.to_string(),
            ..FighterMatchStats::default()
        });

        Ok(Self {
            id,
            phase: MatchPhase::InProgress,
            tick: 0,
            elapsed_secs: 0.0,
            fighters,
            controllers,
            resolver: CombatResolver::new(rules.hit_range),
            rules,
            outcome: None,
            events: Vec::new(),
            stats,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        self.phase == MatchPhase::Ended
    }

    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome
    }

    pub fn fighter(&self, side: Side) -> &Fighter {
        &self.fighters[side.index()]
    }

    /// Index of the last step simulated
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Simulation seconds played
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    /// Events from the most recent step
    pub fn last_events(&self) -> &[MatchEvent] {
        &self.events
    }

    /// Advance one fixed step: timers, side one, side two, combat, end check.
    /// Returns the events it produced. A finished match ignores further steps.
    pub fn step(&mut self, tick: Tick) -> &[MatchEvent] {
        self.events.clear();
        if self.phase == MatchPhase::Ended {
            return &self.events;
        }
        self.tick = tick.index;
        self.elapsed_secs += tick.dt;

        for side in Side::BOTH {
            if let Some(change) = self.fighters[side.index()].advance(tick.dt) {
                self.record_change(side, change);
            }
        }

        for side in Side::BOTH {
            self.drive(side, tick);
        }

        self.resolve_combat();
        self.check_end();

        &self.events
    }

    /// Read-only view for renderers
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            tick: self.tick,
            fighters: [
                FighterView::of(&self.fighters[0]),
                FighterView::of(&self.fighters[1]),
            ],
            events: self.events.clone(),
        }
    }

    pub fn stats(&self) -> MatchStats {
        MatchStats {
            ticks: self.tick + 1,
            duration_secs: self.elapsed_secs,
            fighters: self.stats.clone(),
        }
    }

    /// Feed one side's controller output into its fighter
    fn drive(&mut self, side: Side, tick: Tick) {
        let (me, foe) = split_pair(&mut self.fighters, side);

        let mut combo = None;
        let change = match &mut self.controllers[side.index()] {
            Controller::Human(resolver) => {
                let intent = resolver.update(tick.index);
                if let Some(Intent::Combo { name }) = &intent {
                    combo = Some(name.clone());
                }
                apply_intent(me, intent, tick.dt)
            }
            Controller::Ai(policy) => match policy.update(tick.dt, me, foe) {
                Some(Decision::Approach { vector, dt }) => me.move_by(vector, dt),
                Some(Decision::Send(event)) => me.send(event),
                None => None,
            },
        };

        if let Some(name) = combo {
            debug!(match_id = %self.id, ?side, combo = %name, "Combo triggered");
            self.stats[side.index()].combos += 1;
            self.events.push(MatchEvent::ComboTriggered { side, name });
        }
        if let Some(change) = change {
            self.record_change(side, change);
        }
    }

    /// Judge both directions from the same states, then deliver
    fn resolve_combat(&mut self) {
        let hits = self.resolver.resolve(&self.fighters[0], &self.fighters[1]);

        for hit in hits {
            let defender = &mut self.fighters[hit.defender.index()];
            let Some(change) = defender.send(hit.event()) else {
                continue;
            };
            let defender_hp = defender.hp();

            if change.to == CombatState::Hurt {
                let attacker_stats = &mut self.stats[hit.attacker.index()];
                attacker_stats.hits_landed += 1;
                attacker_stats.damage_dealt += hit.damage;
                self.stats[hit.defender.index()].damage_taken += hit.damage;

                debug!(
                    match_id = %self.id,
                    attacker = ?hit.attacker,
                    damage = hit.damage,
                    defender_hp,
                    "Hit landed"
                );
                self.events.push(MatchEvent::Hit {
                    attacker: hit.attacker,
                    defender: hit.defender,
                    damage: hit.damage,
                    defender_hp,
                });
            }
            self.record_change(hit.defender, change);
        }
    }

    fn record_change(&mut self, side: Side, change: StateChange) {
        debug!(
            match_id = %self.id,
            tick = self.tick,
            ?side,
            from = ?change.from,
            to = ?change.to,
            "State changed"
        );
        self.events.push(MatchEvent::StateChanged {
            side,
            from: change.from,
            to: change.to,
        });

        match change.to {
            CombatState::Reversal => {
                info!(match_id = %self.id, ?side, "Momentum redirected");
                self.stats[side.index()].reversals += 1;
                self.events.push(MatchEvent::Reversal { side });
            }
            CombatState::KnockedOut => {
                info!(match_id = %self.id, ?side, tick = self.tick, "Knockout");
                self.events.push(MatchEvent::Knockout { side });
            }
            _ => {}
        }
    }

    fn check_end(&mut self) {
        let knocked_out = [
            self.fighters[0].is_knocked_out(),
            self.fighters[1].is_knocked_out(),
        ];

        let outcome = match knocked_out {
            [true, true] => Some(MatchOutcome::Draw {
                reason: EndReason::Knockout,
            }),
            [true, false] => Some(MatchOutcome::Winner {
                side: Side::Two,
                reason: EndReason::Knockout,
            }),
            [false, true] => Some(MatchOutcome::Winner {
                side: Side::One,
                reason: EndReason::Knockout,
            }),
            [false, false] => self.time_limit_outcome(),
        };

        if let Some(outcome) = outcome {
            self.phase = MatchPhase::Ended;
            self.outcome = Some(outcome);
            self.events.push(MatchEvent::MatchEnded { outcome });
            info!(
                match_id = %self.id,
                tick = self.tick,
                winner = ?outcome.winner(),
                reason = ?outcome.reason(),
                "Match ended"
            );
        }
    }

    /// Higher remaining hp fraction wins at the limit; equal is a draw
    fn time_limit_outcome(&self) -> Option<MatchOutcome> {
        let limit = self.rules.time_limit_secs?;
        if self.elapsed_secs + TIME_EPSILON < limit {
            return None;
        }

        let fraction = |f: &Fighter| f64::from(f.hp()) / f64::from(f.max_hp());
        let one = fraction(&self.fighters[0]);
        let two = fraction(&self.fighters[1]);
        let reason = EndReason::TimeLimit;

        Some(if one > two {
            MatchOutcome::Winner {
                side: Side::One,
                reason,
            }
        } else if two > one {
            MatchOutcome::Winner {
                side: Side::Two,
                reason,
            }
        } else {
            MatchOutcome::Draw { reason }
        })
    }
}

/// `side`'s fighter mutably, its opponent shared
fn split_pair(fighters: &mut [Fighter; 2], side: Side) -> (&mut Fighter, &Fighter) {
    let [one, two] = fighters;
    match side {
        Side::One => (one, &*two),
        Side::Two => (two, &*one),
    }
}

/// Human intent to fighter events: combos become specials, movement walks,
/// and no intent at all stops a walking fighter.
fn apply_intent(fighter: &mut Fighter, intent: Option<Intent>, dt: f64) -> Option<StateChange> {
    match intent {
        Some(Intent::Combo { name }) => fighter.send(FighterEvent::Special { name }),
        Some(Intent::Ultimate) => fighter.send(FighterEvent::Ultimate),
        Some(Intent::Block) => fighter.send(FighterEvent::Block),
        Some(Intent::Attack { variant }) => fighter.send(FighterEvent::Attack { variant }),
        Some(Intent::Move { vector }) => fighter.move_by(vector, dt),
        None if fighter.state() == CombatState::Walking => fighter.send(FighterEvent::Stop),
        None => None,
    }
}
