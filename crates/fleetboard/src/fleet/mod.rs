//! Core fleet types for fleetboard.
//!
//! A fleet is a list of trucks plus the fallback rules used to suggest a
//! substitute when a truck is dispatched. Truck status lives on the
//! [`Board`](board::Board), not in the fleet file.

pub mod board;
pub mod store;

use serde::{Deserialize, Serialize};

pub use board::{
    AdminEdit, AvailabilityAlert, Board, Dashboard, DashboardRow, DispatchOutcome,
    OverdueThresholds, Rename, StatusChange, TruckEdit,
};
pub use store::{FleetStore, LoadedFleet};

/// The operational status of a truck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TruckStatus {
    /// In service and free to dispatch.
    Available,
    /// Out of service.
    Unavailable,
    /// Dispatched on a call.
    Out,
    /// Stopped for logistics on the way back.
    Logistics,
    /// Stopped at a destination on the way back.
    Destination,
}

impl TruckStatus {
    /// All statuses, in display order.
    pub const ALL: [Self; 5] = [
        Self::Available,
        Self::Unavailable,
        Self::Out,
        Self::Logistics,
        Self::Destination,
    ];

    /// The lowercase name used in logs and on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Unavailable => "unavailable",
            Self::Out => "out",
            Self::Logistics => "logistics",
            Self::Destination => "destination",
        }
    }

    /// Whether the truck is on a call or a waypoint stop.
    ///
    /// Busy trucks are skipped by the bulk availability edit.
    #[must_use]
    pub fn is_busy(self) -> bool {
        matches!(self, Self::Out | Self::Logistics | Self::Destination)
    }

    /// Whether a logistics timer runs while in this status.
    #[must_use]
    pub fn is_timed(self) -> bool {
        matches!(self, Self::Logistics | Self::Destination)
    }
}

impl std::fmt::Display for TruckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TruckStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown truck status: {s}"))
    }
}

/// A truck and where it is stationed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Truck {
    /// Unique truck identifier, e.g. `MED-4`.
    pub id: String,
    /// Free-form station or location name.
    pub location: String,
}

impl Truck {
    /// Create a truck.
    #[must_use]
    pub fn new(id: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            location: location.into(),
        }
    }
}

/// Substitutes to suggest when `primary` is dispatched, in order of
/// preference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackRule {
    /// The truck this chain applies to.
    pub primary: String,
    /// Candidate substitutes, most preferred first.
    #[serde(default)]
    pub fallbacks: Vec<String>,
}

impl FallbackRule {
    /// Create a rule.
    #[must_use]
    pub fn new<I, S>(primary: impl Into<String>, fallbacks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            primary: primary.into(),
            fallbacks: fallbacks.into_iter().map(Into::into).collect(),
        }
    }
}

/// The persisted fleet file contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetConfig {
    /// All trucks, in display order.
    #[serde(default)]
    pub trucks: Vec<Truck>,
    /// Fallback chains. Only the first rule for a given primary is used.
    #[serde(default)]
    pub fallback_rules: Vec<FallbackRule>,
}

impl FleetConfig {
    /// Look up a truck by id.
    #[must_use]
    pub fn truck(&self, id: &str) -> Option<&Truck> {
        self.trucks.iter().find(|t| t.id == id)
    }

    /// Whether a truck with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.truck(id).is_some()
    }

    /// The first fallback rule for `primary`, if any.
    #[must_use]
    pub fn rule_for(&self, primary: &str) -> Option<&FallbackRule> {
        self.fallback_rules.iter().find(|r| r.primary == primary)
    }
}
