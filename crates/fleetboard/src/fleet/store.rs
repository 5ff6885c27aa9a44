//! JSON fleet file persistence.
//!
//! The fleet file holds trucks and fallback rules. It is read once at
//! startup and rewritten in full whenever an admin edit is saved.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use super::{FleetConfig, Truck};
use crate::error::{Error, Result};

/// Trucks that must always exist, with the location they get when created.
pub const CUSTOM_TRUCKS: [(&str, &str); 2] = [
    ("MEDIC_CUSTOM_1", "Custom Location 1"),
    ("MEDIC_CUSTOM_2", "Custom Location 2"),
];

/// A fleet file as loaded, with the custom trucks guaranteed present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFleet {
    /// The fleet contents.
    pub fleet: FleetConfig,
    /// Custom truck ids that were missing from the file and appended.
    pub created: Vec<String>,
}

/// Reads and writes the fleet file.
#[derive(Debug, Clone)]
pub struct FleetStore {
    path: PathBuf,
}

impl FleetStore {
    /// Create a store for the fleet file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the path to the fleet file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the fleet file.
    ///
    /// Missing `trucks` or `fallback_rules` keys are treated as empty. Any
    /// custom truck not already present is appended with its placeholder
    /// location.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, cannot be read, or is
    /// not valid fleet JSON.
    pub fn load(&self) -> Result<LoadedFleet> {
        debug!("Loading fleet from {}", self.path.display());
        let raw = std::fs::read_to_string(&self.path).map_err(|source| Error::FleetRead {
            path: self.path.clone(),
            source,
        })?;
        let mut fleet: FleetConfig =
            serde_json::from_str(&raw).map_err(|source| Error::FleetParse {
                path: self.path.clone(),
                source,
            })?;

        let created = ensure_custom_trucks(&mut fleet);
        info!(
            "Loaded {} trucks and {} fallback rules from {}",
            fleet.trucks.len(),
            fleet.fallback_rules.len(),
            self.path.display()
        );
        Ok(LoadedFleet { fleet, created })
    }

    /// Overwrite the fleet file with `fleet`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// file cannot be written.
    pub fn save(&self, fleet: &FleetConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        fleet.serialize(&mut ser)?;

        std::fs::write(&self.path, buf).map_err(|source| Error::FleetWrite {
            path: self.path.clone(),
            source,
        })?;
        info!("Saved fleet to {}", self.path.display());
        Ok(())
    }
}

/// Append any missing custom trucks, returning the ids that were added.
pub fn ensure_custom_trucks(fleet: &mut FleetConfig) -> Vec<String> {
    let mut created = Vec::new();
    for (id, location) in CUSTOM_TRUCKS {
        if !fleet.contains(id) {
            fleet.trucks.push(Truck::new(id, location));
            created.push(id.to_string());
        }
    }
    created
}
