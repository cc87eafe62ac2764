//! Configuration module - environment variable parsing

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::engine::{ClockConfig, ClockError};
use crate::util::time::{step_for_rate, DISPLAY_FPS, SIMULATION_TPS};

/// How the binary drives frames
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// Manual frame driver with a synthetic clock (deterministic batch run)
    Headless,
    /// Tokio interval on the wall clock
    Realtime,
}

impl FromStr for RunMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "headless" => Ok(Self::Headless),
            "realtime" => Ok(Self::Realtime),
            _ => Err(()),
        }
    }
}

/// Who controls side one
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerControl {
    /// Decision policy on both sides
    Ai,
    /// Input resolver with nothing held
    Idle,
}

impl FromStr for PlayerControl {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ai" => Ok(Self::Ai),
            "idle" => Ok(Self::Idle),
            _ => Err(()),
        }
    }
}

/// Log line format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
    pub run_mode: RunMode,

    /// Simulation ticks per second
    pub sim_tick_hz: u32,
    /// Max simulation steps per real frame
    pub max_sub_steps: u32,
    /// Clamp on a single real-frame delta (seconds)
    pub max_frame_delta_secs: f64,
    /// Host frame rate
    pub display_hz: u32,

    /// Seed for the decision policy RNG
    pub match_seed: u64,
    /// Directory holding fighters.json and combos.json; built-in roster when unset
    pub roster_dir: Option<PathBuf>,
    pub player_fighter: String,
    pub opponent_fighter: String,
    pub player_control: PlayerControl,
    /// Simulation-time limit before the match goes to decision
    pub match_time_limit_secs: f64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from any variable source. Every value is range
    /// checked here so a bad setting never reaches the running loop.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars { lookup: &lookup };

        let config = Self {
            log_level: vars.text("LOG_LEVEL", "info"),
            log_format: vars.parse("LOG_FORMAT", LogFormat::Text)?,
            run_mode: vars.parse("RUN_MODE", RunMode::Headless)?,

            sim_tick_hz: vars.parse_where("SIM_TICK_HZ", SIMULATION_TPS, |hz| *hz > 0)?,
            max_sub_steps: vars.parse_where("MAX_SUB_STEPS", 8, |n| *n > 0)?,
            max_frame_delta_secs: vars.parse_where("MAX_FRAME_DELTA_SECS", 0.25, positive)?,
            display_hz: vars.parse_where("DISPLAY_HZ", DISPLAY_FPS, |hz| *hz > 0)?,

            match_seed: vars.parse("MATCH_SEED", 42)?,
            roster_dir: (vars.lookup)("ROSTER_DIR").map(PathBuf::from),
            player_fighter: vars.text("PLAYER_FIGHTER", "steven_seagal"),
            opponent_fighter: vars.text("OPPONENT_FIGHTER", "chuck_norris"),
            player_control: vars.parse("PLAYER_CONTROL", PlayerControl::Ai)?,
            match_time_limit_secs: vars.parse_where("MATCH_TIME_LIMIT_SECS", 99.0, positive)?,
        };

        config.clock().validate()?;
        Ok(config)
    }

    /// Clock settings derived from the tick rate and frame limits
    pub fn clock(&self) -> ClockConfig {
        ClockConfig {
            fixed_step: step_for_rate(self.sim_tick_hz),
            max_sub_steps: self.max_sub_steps,
            max_frame_delta: self.max_frame_delta_secs,
        }
    }
}

fn positive(value: &f64) -> bool {
    value.is_finite() && *value > 0.0
}

struct Vars<'a> {
    lookup: &'a dyn Fn(&str) -> Option<String>,
}

impl Vars<'_> {
    fn text(&self, name: &str, default: &str) -> String {
        (self.lookup)(name).unwrap_or_else(|| default.to_string())
    }

    fn parse<T: FromStr>(&self, name: &'static str, default: T) -> Result<T, ConfigError> {
        self.parse_where(name, default, |_| true)
    }

    /// Parse `name` and require `valid` to hold for it
    fn parse_where<T: FromStr>(
        &self,
        name: &'static str,
        default: T,
        valid: impl Fn(&T) -> bool,
    ) -> Result<T, ConfigError> {
        let Some(value) = (self.lookup)(name) else {
            return Ok(default);
        };
        let parsed = value.trim().parse::<T>().ok().filter(|parsed| valid(parsed));
        parsed.ok_or(ConfigError::Invalid { name, value })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("Invalid clock settings: {0}")]
    Clock(#[from] ClockError),
}
