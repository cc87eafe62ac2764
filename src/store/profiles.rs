//! Player profile win/loss counters

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Player profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub total_matches: u32,
    pub wins: u32,
}

impl Profile {
    fn new(id: Uuid, username: &str) -> Self {
        Self {
            id,
            username: username.to_string(),
            total_matches: 0,
            wins: 0,
        }
    }

    pub fn losses(&self) -> u32 {
        self.total_matches - self.wins
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("Profile not found: {0}")]
    NotFound(Uuid),
}

/// In-memory profile store, keyed by profile id
#[derive(Debug, Default)]
pub struct ProfileStore {
    profiles: HashMap<Uuid, Profile>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a profile by ID
    pub fn get_profile(&self, id: Uuid) -> Option<&Profile> {
        self.profiles.get(&id)
    }

    /// Get or create profile (ensures profile exists)
    pub fn ensure_profile(&mut self, id: Uuid, default_name: &str) -> &Profile {
        self.profiles
            .entry(id)
            .or_insert_with(|| Profile::new(id, default_name))
    }

    /// Count one finished match; draws count as played, not won
    pub fn record_result(&mut self, id: Uuid, won: bool) -> Result<&Profile, ProfileError> {
        let profile = self
            .profiles
            .get_mut(&id)
            .ok_or(ProfileError::NotFound(id))?;
        profile.total_matches += 1;
        if won {
            profile.wins += 1;
        }
        Ok(profile)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
