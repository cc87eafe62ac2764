//! Arena Duel - fixed-timestep simulation core for a two-fighter match
//!
//! - `engine`: accumulator clock, game loop and frame hosts
//! - `input`: held actions, combo matching and intent resolution
//! - `game`: fighter state machine, combat resolver, AI and the duel itself
//! - `roster`: fighter and combo setup data
//! - `store`: post-match profile counters and records

pub mod config;
pub mod engine;
pub mod game;
pub mod input;
pub mod roster;
pub mod store;
pub mod util;
