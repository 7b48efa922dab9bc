use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::model::profile::SpeciesProfile;

#[derive(Debug, Deserialize)]
struct SpeciesFile {
    #[serde(default)]
    species: Vec<toml::Value>,
}

/// The profiles that passed validation, plus the ones that did not.
///
/// A malformed profile only takes itself out: it is reported once at load
/// time and excluded from every cycle until the file is fixed.
#[derive(Debug, Default)]
pub struct ProfileStore {
    profiles: Vec<SpeciesProfile>,
    rejected: Vec<ConfigError>,
}

impl ProfileStore {
    /// Build a store from already-constructed profiles, validating each.
    pub fn new(candidates: Vec<SpeciesProfile>) -> Self {
        let mut store = ProfileStore::default();
        for profile in candidates {
            store.admit(profile);
        }
        store
    }

    /// Load `[[species]]` entries from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, ConfigError> {
        let file: SpeciesFile =
            toml::from_str(content).map_err(|e| ConfigError::parse(source_path, e))?;

        let mut store = ProfileStore::default();
        for (i, entry) in file.species.into_iter().enumerate() {
            let species_id = entry
                .get("species_id")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("species[{}]", i));

            match entry.try_into::<SpeciesProfile>() {
                Ok(profile) => store.admit(profile),
                Err(e) => store.reject(species_id, vec![e.to_string()]),
            }
        }

        info!(
            path = %source_path.display(),
            loaded = store.profiles.len(),
            rejected = store.rejected.len(),
            "Species profiles loaded"
        );
        Ok(store)
    }

    fn admit(&mut self, profile: SpeciesProfile) {
        if let Err(reasons) = profile.validate() {
            self.reject(profile.species_id, reasons);
            return;
        }
        if self.get(&profile.species_id).is_some() {
            let id = profile.species_id.clone();
            self.reject(id, vec!["duplicate species_id".to_string()]);
            return;
        }
        self.profiles.push(profile);
    }

    fn reject(&mut self, species_id: String, reasons: Vec<String>) {
        let err = ConfigError::InvalidProfile {
            species_id,
            reasons,
        };
        warn!(error = %err, "Excluding species profile");
        self.rejected.push(err);
    }

    pub fn profiles(&self) -> &[SpeciesProfile] {
        &self.profiles
    }

    pub fn rejected(&self) -> &[ConfigError] {
        &self.rejected
    }

    pub fn get(&self, species_id: &str) -> Option<&SpeciesProfile> {
        self.profiles.iter().find(|p| p.species_id == species_id)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Ids of every valid profile, in file order.
    pub fn species_ids(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.species_id.as_str()).collect()
    }
}
