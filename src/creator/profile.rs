use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::creator::profile_key;
use crate::error::PricingError;
use crate::CreatorProfile;

/// Accepted on-disk layouts: a plain array, or an object keyed by creator id.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredProfiles {
    List(Vec<CreatorProfile>),
    Keyed(BTreeMap<String, CreatorProfile>),
}

impl StoredProfiles {
    fn into_profiles(self) -> Vec<CreatorProfile> {
        match self {
            StoredProfiles::List(profiles) => profiles,
            StoredProfiles::Keyed(map) => map
                .into_iter()
                .map(|(key, mut profile)| {
                    if profile.id.is_none() {
                        profile.id = Some(key);
                    }
                    profile
                })
                .collect(),
        }
    }
}

/// Read-only pool of creator profiles backed by a JSON file.
#[derive(Debug, Clone, Default)]
pub struct CreatorStore {
    profiles: Vec<CreatorProfile>,
}

impl CreatorStore {
    pub async fn load(path: PathBuf) -> Result<Self, PricingError> {
        let profiles = read_profiles(&path).await?;
        tracing::info!(path = %path.display(), creators = profiles.len(), "creator pool loaded");
        Ok(Self { profiles })
    }

    pub fn from_profiles(profiles: Vec<CreatorProfile>) -> Self {
        Self { profiles }
    }

    /// Profiles in file order.
    pub fn list(&self) -> &[CreatorProfile] {
        &self.profiles
    }

    pub fn get(&self, id: &str) -> Option<&CreatorProfile> {
        self.profiles
            .iter()
            .find(|profile| profile_key(profile) == id)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

async fn read_profiles(path: &Path) -> Result<Vec<CreatorProfile>, PricingError> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "creator pool file missing; starting empty");
        return Ok(Vec::new());
    }
    let data = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| PricingError::Store(format!("failed to read creators: {}", err)))?;
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    let stored: StoredProfiles = serde_json::from_str(&data)
        .map_err(|err| PricingError::Store(format!("failed to parse creators: {}", err)))?;
    Ok(stored.into_profiles())
}
