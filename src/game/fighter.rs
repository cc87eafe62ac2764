//! Fighter combat state machine: event and timer transitions, damage, meter

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::input::{AttackVariant, MoveVector};
use crate::roster::FighterData;

/// Horizontal arena walls
pub const ARENA_MIN_X: f64 = -9.0;
pub const ARENA_MAX_X: f64 = 9.0;
/// Walking speed in units per second
pub const MOVE_SPEED: f64 = 5.0;
pub const ULTIMATE_METER_MAX: f64 = 100.0;
/// Damage for a hit that carries no amount
pub const DEFAULT_HIT_DAMAGE: u32 = 10;

const REVERSAL_SECS: f64 = 0.5;
const ATTACK_SECS: f64 = 0.4;
const SPECIAL_SECS: f64 = 1.0;
const ULTIMATE_SECS: f64 = 2.0;
const HURT_SECS: f64 = 0.5;

/// Slack on timer expiry and meter fill so values that are exact multiples
/// of the step land on that step.
const TIMER_EPSILON: f64 = 1e-9;

/// Exactly one is active per fighter. `KnockedOut` has no way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatState {
    Idle,
    Walking,
    Attacking,
    /// Counter window: a hit here turns into a reversal
    Blocking,
    /// Invulnerable follow-up to a blocked hit
    Reversal,
    SpecialMove,
    Ultimate,
    /// Hitstun
    Hurt,
    KnockedOut,
}

impl CombatState {
    /// States that accept movement
    pub fn is_mobile(self) -> bool {
        matches!(self, CombatState::Idle | CombatState::Walking)
    }

    /// States whose strikes can land
    pub fn is_striking(self) -> bool {
        matches!(self, CombatState::Attacking | CombatState::SpecialMove)
    }

    /// States in which incoming strikes are not delivered
    pub fn is_guarded(self) -> bool {
        matches!(
            self,
            CombatState::Hurt
                | CombatState::Blocking
                | CombatState::Reversal
                | CombatState::KnockedOut
        )
    }
}

/// Everything a controller or the combat resolver can tell a fighter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FighterEvent {
    Attack { variant: AttackVariant },
    Block,
    Special { name: String },
    Walk,
    Stop,
    HitReceived { damage: Option<u32> },
    Ultimate,
}

/// The move a striking state is performing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActiveMove {
    Strike { variant: AttackVariant },
    Special { name: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Position) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// A transition that happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub from: CombatState,
    pub to: CombatState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Guard {
    Always,
    MeterFull,
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    target: CombatState,
    guard: Guard,
}

impl Edge {
    fn to(target: CombatState) -> Option<Self> {
        Some(Self {
            target,
            guard: Guard::Always,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum TimeoutExit {
    Return(CombatState),
    /// Leave hitstun: knocked out at zero hp, idle otherwise
    KnockoutCheck,
}

#[derive(Debug, Clone, Copy)]
struct Timeout {
    after_secs: f64,
    exit: TimeoutExit,
}

/// Event transition table. `None` means the event is ignored in this state.
fn edge(state: CombatState, event: &FighterEvent) -> Option<Edge> {
    use CombatState::*;

    match (state, event) {
        (Idle | Walking, FighterEvent::Attack { .. }) => Edge::to(Attacking),
        (Idle | Walking, FighterEvent::Block) => Edge::to(Blocking),
        (Idle | Walking, FighterEvent::Special { .. }) => Edge::to(SpecialMove),
        (Idle | Walking, FighterEvent::HitReceived { .. }) => Edge::to(Hurt),
        (Idle | Walking, FighterEvent::Ultimate) => Some(Edge {
            target: Ultimate,
            guard: Guard::MeterFull,
        }),
        (Idle, FighterEvent::Walk) => Edge::to(Walking),
        (Walking, FighterEvent::Stop) => Edge::to(Idle),

        (Blocking, FighterEvent::HitReceived { .. }) => Edge::to(Reversal),
        (Attacking | SpecialMove | Ultimate, FighterEvent::HitReceived { .. }) => Edge::to(Hurt),

        _ => None,
    }
}

/// Timer transition table, in simulation seconds
fn timeout(state: CombatState, counter_window_secs: f64) -> Option<Timeout> {
    use CombatState::*;

    let (after_secs, exit) = match state {
        Blocking => (counter_window_secs, TimeoutExit::Return(Idle)),
        Reversal => (REVERSAL_SECS, TimeoutExit::Return(Idle)),
        Attacking => (ATTACK_SECS, TimeoutExit::Return(Idle)),
        SpecialMove => (SPECIAL_SECS, TimeoutExit::Return(Idle)),
        Ultimate => (ULTIMATE_SECS, TimeoutExit::Return(Idle)),
        Hurt => (HURT_SECS, TimeoutExit::KnockoutCheck),
        Idle | Walking | KnockedOut => return None,
    };
    Some(Timeout { after_secs, exit })
}

/// One combatant: identity, position, state machine, health and meter
#[derive(Debug, Clone)]
pub struct Fighter {
    id: Uuid,
    key: String,
    data: FighterData,
    position: Position,
    base_color: u32,
    state: CombatState,
    state_elapsed: f64,
    hp: u32,
    meter: f64,
    current_move: Option<ActiveMove>,
}

impl Fighter {
    pub fn new(key: impl Into<String>, data: FighterData, position: Position, base_color: u32) -> Self {
        let hp = data.stats.max_hp;
        Self {
            id: Uuid::new_v4(),
            key: key.into(),
            data,
            position,
            base_color,
            state: CombatState::Idle,
            state_elapsed: 0.0,
            hp,
            meter: 0.0,
            current_move: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Roster key
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn base_color(&self) -> u32 {
        self.base_color
    }

    pub fn state(&self) -> CombatState {
        self.state
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.data.stats.max_hp
    }

    /// Whole meter points, 0..=100
    pub fn ultimate_meter(&self) -> u32 {
        self.meter.floor() as u32
    }

    pub fn is_knocked_out(&self) -> bool {
        self.state == CombatState::KnockedOut
    }

    /// Damage this fighter's strike deals right now, if it is striking
    pub fn outgoing_damage(&self) -> Option<u32> {
        if !self.state.is_striking() {
            return None;
        }
        let stats = &self.data.stats;
        match self.current_move.as_ref()? {
            ActiveMove::Strike {
                variant: AttackVariant::Light,
            } => Some(stats.light_damage),
            ActiveMove::Strike {
                variant: AttackVariant::Heavy,
            } => Some(stats.heavy_damage),
            ActiveMove::Special { .. } => Some(self.data.moves.special.damage),
        }
    }

    /// Deliver an event. Undeclared events and failed guards are no-ops.
    pub fn send(&mut self, event: FighterEvent) -> Option<StateChange> {
        let edge = edge(self.state, &event)?;
        let allowed = match edge.guard {
            Guard::Always => true,
            Guard::MeterFull => self.meter >= ULTIMATE_METER_MAX,
        };
        if !allowed {
            return None;
        }
        Some(self.enter(edge.target, Some(&event)))
    }

    /// Advance timers and meter by one step of simulation time
    pub fn advance(&mut self, dt: f64) -> Option<StateChange> {
        if self.is_knocked_out() {
            return None;
        }

        let meter = self.meter + self.data.stats.stamina_regen * dt;
        self.meter = if meter + TIMER_EPSILON >= ULTIMATE_METER_MAX {
            ULTIMATE_METER_MAX
        } else {
            meter
        };
        self.state_elapsed += dt;

        let counter_window_secs = f64::from(self.data.stats.counter_window) / 1000.0;
        let timeout = timeout(self.state, counter_window_secs)?;
        if self.state_elapsed + TIMER_EPSILON < timeout.after_secs {
            return None;
        }

        let target = match timeout.exit {
            TimeoutExit::Return(target) => target,
            TimeoutExit::KnockoutCheck if self.hp == 0 => CombatState::KnockedOut,
            TimeoutExit::KnockoutCheck => CombatState::Idle,
        };
        Some(self.enter(target, None))
    }

    /// Walk by `vector * MOVE_SPEED * dt`, only while idle or walking.
    ///
    /// Emits `Walk` for horizontal movement and `Stop` otherwise so the state
    /// follows the movement intent.
    pub fn move_by(&mut self, vector: MoveVector, dt: f64) -> Option<StateChange> {
        if !self.state.is_mobile() {
            return None;
        }

        let x = self.position.x + f64::from(vector.x) * MOVE_SPEED * dt;
        self.position.x = x.clamp(ARENA_MIN_X, ARENA_MAX_X);

        if vector.x != 0 {
            self.send(FighterEvent::Walk)
        } else {
            self.send(FighterEvent::Stop)
        }
    }

    fn enter(&mut self, target: CombatState, event: Option<&FighterEvent>) -> StateChange {
        let change = StateChange {
            from: self.state,
            to: target,
        };
        self.state = target;
        self.state_elapsed = 0.0;
        self.on_enter(event);
        change
    }

    /// Entry actions, run exactly once per transition into a state
    fn on_enter(&mut self, event: Option<&FighterEvent>) {
        self.current_move = match (self.state, event) {
            (CombatState::Attacking, Some(FighterEvent::Attack { variant })) => {
                Some(ActiveMove::Strike { variant: *variant })
            }
            (CombatState::SpecialMove, Some(FighterEvent::Special { name })) => {
                Some(ActiveMove::Special { name: name.clone() })
            }
            _ => None,
        };

        match self.state {
            CombatState::Hurt => {
                let damage = match event {
                    Some(FighterEvent::HitReceived {
                        damage: Some(amount),
                    }) => *amount,
                    _ => DEFAULT_HIT_DAMAGE,
                };
                self.hp = self.hp.saturating_sub(damage);
            }
            CombatState::Ultimate => self.meter = 0.0,
            _ => {}
        }
    }
}
