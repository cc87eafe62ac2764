//! Post-match sinks: profile counters and match records

pub mod profiles;
pub mod records;

pub use profiles::{Profile, ProfileError, ProfileStore};
pub use records::MatchRecord;
