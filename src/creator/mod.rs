pub mod profile;
pub mod synthetic;

pub use profile::CreatorStore;
pub use synthetic::{generate_synthetic_history, generate_synthetic_pool};

use crate::CreatorProfile;

/// Lookup key for a profile: its id when present, otherwise its name.
pub fn profile_key(profile: &CreatorProfile) -> &str {
    profile
        .id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or(&profile.name)
}
