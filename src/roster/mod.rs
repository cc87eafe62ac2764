//! Static setup data: fighter definitions and registered combos

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::input::ComboDefinition;

const BUILTIN_FIGHTERS: &str = include_str!("../../data/fighters.json");
const BUILTIN_COMBOS: &str = include_str!("../../data/combos.json");

/// Per-fighter tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FighterStats {
    pub max_hp: u32,
    /// Ultimate meter points gained per simulated second
    pub stamina_regen: f64,
    /// Blocking (counter window) duration in milliseconds
    #[serde(default = "default_counter_window")]
    pub counter_window: u32,
    #[serde(default = "default_light_damage")]
    pub light_damage: u32,
    #[serde(default = "default_heavy_damage")]
    pub heavy_damage: u32,
}

fn default_counter_window() -> u32 {
    300
}

fn default_light_damage() -> u32 {
    5
}

fn default_heavy_damage() -> u32 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialMove {
    pub name: String,
    pub damage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveSet {
    pub special: SpecialMove,
}

/// One roster entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterData {
    pub name: String,
    #[serde(default)]
    pub style: String,
    pub stats: FighterStats,
    pub moves: MoveSet,
}

/// Fighters by key plus the combo list, validated on construction
#[derive(Debug, Clone)]
pub struct Roster {
    fighters: HashMap<String, FighterData>,
    combos: Vec<ComboDefinition>,
}

impl Roster {
    /// Roster compiled into the binary
    pub fn builtin() -> Result<Self, RosterError> {
        Self::from_json(BUILTIN_FIGHTERS, BUILTIN_COMBOS)
    }

    /// Load `fighters.json` and `combos.json` from a directory
    pub fn load(dir: &Path) -> Result<Self, RosterError> {
        let read = |name: &str| {
            let path = dir.join(name);
            fs::read_to_string(&path).map_err(|source| RosterError::Read {
                path: path.display().to_string(),
                source,
            })
        };
        Self::from_json(&read("fighters.json")?, &read("combos.json")?)
    }

    pub fn from_json(fighters: &str, combos: &str) -> Result<Self, RosterError> {
        let fighters: HashMap<String, FighterData> =
            serde_json::from_str(fighters).map_err(RosterError::Fighters)?;
        let combos: Vec<ComboDefinition> =
            serde_json::from_str(combos).map_err(RosterError::Combos)?;

        let roster = Self { fighters, combos };
        roster.validate()?;
        Ok(roster)
    }

    pub fn fighter(&self, key: &str) -> Result<&FighterData, RosterError> {
        self.fighters
            .get(key)
            .ok_or_else(|| RosterError::UnknownFighter(key.to_string()))
    }

    pub fn combos(&self) -> &[ComboDefinition] {
        &self.combos
    }

    /// Fighter keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.fighters.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    fn validate(&self) -> Result<(), RosterError> {
        for (key, fighter) in &self.fighters {
            validate_fighter(key, fighter)?;
        }
        validate_combos(&self.combos)
    }
}

pub fn validate_fighter(key: &str, fighter: &FighterData) -> Result<(), RosterError> {
    if fighter.stats.max_hp == 0 {
        return Err(RosterError::InvalidFighter {
            key: key.to_string(),
            reason: "maxHp must be positive",
        });
    }
    if !fighter.stats.stamina_regen.is_finite() || fighter.stats.stamina_regen < 0.0 {
        return Err(RosterError::InvalidFighter {
            key: key.to_string(),
            reason: "staminaRegen must be a non-negative number",
        });
    }
    Ok(())
}

pub fn validate_combos(combos: &[ComboDefinition]) -> Result<(), RosterError> {
    let mut seen = HashSet::new();
    for combo in combos {
        if combo.name.trim().is_empty() {
            return Err(RosterError::InvalidCombo {
                name: combo.name.clone(),
                reason: "name is empty",
            });
        }
        if combo.action_sequence.is_empty() {
            return Err(RosterError::InvalidCombo {
                name: combo.name.clone(),
                reason: "sequence is empty",
            });
        }
        if !seen.insert(combo.name.as_str()) {
            return Err(RosterError::InvalidCombo {
                name: combo.name.clone(),
                reason: "name registered twice",
            });
        }
    }
    Ok(())
}

/// Roster errors, all fatal at match setup
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed fighter data: {0}")]
    Fighters(#[source] serde_json::Error),

    #[error("Malformed combo definitions: {0}")]
    Combos(#[source] serde_json::Error),

    #[error("Unknown fighter: {0}")]
    UnknownFighter(String),

    #[error("Invalid fighter {key}: {reason}")]
    InvalidFighter { key: String, reason: &'static str },

    #[error("Invalid combo {name:?}: {reason}")]
    InvalidCombo { name: String, reason: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Action;

    #[test]
    fn builtin_roster_loads() {
        let roster = Roster::builtin().unwrap();
        assert_eq!(roster.keys(), vec!["chuck_norris", "steven_seagal"]);

        let seagal = roster.fighter("steven_seagal").unwrap();
        assert_eq!(seagal.stats.max_hp, 100);
        assert_eq!(seagal.stats.light_damage, 5);
        assert_eq!(seagal.moves.special.damage, 25);

        let combo = &roster.combos()[0];
        assert_eq!(combo.name, "JOINT_LOCK");
        assert_eq!(
            combo.action_sequence,
            vec![Action::Down, Action::Right, Action::HeavyPunch]
        );
    }

    #[test]
    fn unknown_fighter_is_an_error() {
        let roster = Roster::builtin().unwrap();
        assert!(matches!(
            roster.fighter("bruce"),
            Err(RosterError::UnknownFighter(key)) if key == "bruce"
        ));
    }

    #[test]
    fn zero_hp_rejected() {
        let fighters = r#"{"x":{"name":"X","stats":{"maxHp":0,"staminaRegen":1},
            "moves":{"special":{"name":"S","damage":1}}}}"#;
        assert!(matches!(
            Roster::from_json(fighters, "[]"),
            Err(RosterError::InvalidFighter { .. })
        ));
    }

    #[test]
    fn malformed_combos_rejected() {
        let fighters = "{}";
        assert!(matches!(
            Roster::from_json(fighters, r#"[{"name":"A","sequence":[]}]"#),
            Err(RosterError::InvalidCombo { .. })
        ));
        assert!(matches!(
            Roster::from_json(
                fighters,
                r#"[{"name":"A","sequence":["UP"]},{"name":"A","sequence":["DOWN"]}]"#
            ),
            Err(RosterError::InvalidCombo { reason: "name registered twice", .. })
        ));
        assert!(matches!(
            Roster::from_json(fighters, r#"[{"name":"A","sequence":["JUMP"]}]"#),
            Err(RosterError::Combos(_))
        ));
    }

    #[test]
    fn missing_directory_is_a_read_error() {
        let err = Roster::load(Path::new("/nonexistent/roster")).unwrap_err();
        assert!(matches!(err, RosterError::Read { .. }));
    }
}
