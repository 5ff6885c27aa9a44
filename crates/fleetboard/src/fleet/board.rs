//! The dispatch board.
//!
//! The board owns the fleet, the status of every truck, and the start time
//! of every running logistics/destination timer. All status transitions go
//! through [`Board::set_status`], which keeps the timer map consistent with
//! the status map.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{FallbackRule, FleetConfig, TruckStatus};
use crate::config::Config;
use crate::error::{Error, Result};

/// A status transition applied to the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    /// The truck that changed.
    pub truck_id: String,
    /// The status before the change, `None` if the id was unknown.
    pub previous: Option<TruckStatus>,
    /// The status after the change.
    pub status: TruckStatus,
    /// When the change was applied.
    pub at: DateTime<Utc>,
}

/// Result of dispatching a truck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// The status change for the dispatched truck.
    pub change: StatusChange,
    /// Suggested substitute, if the truck has a fallback chain with an
    /// available candidate.
    pub fallback: Option<String>,
}

impl DispatchOutcome {
    /// The dispatched truck id.
    #[must_use]
    pub fn dispatched(&self) -> &str {
        &self.change.truck_id
    }
}

/// How long a truck may sit at a waypoint before it is flagged overdue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverdueThresholds {
    /// Limit for the logistics status.
    pub logistics: Duration,
    /// Limit for the destination status.
    pub destination: Duration,
}

impl OverdueThresholds {
    /// Build thresholds from application config.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            logistics: config.logistics_overdue(),
            destination: config.destination_overdue(),
        }
    }

    /// The limit for `status`, or `None` if the status is not timed.
    #[must_use]
    pub fn limit_for(&self, status: TruckStatus) -> Option<Duration> {
        match status {
            TruckStatus::Logistics => Some(self.logistics),
            TruckStatus::Destination => Some(self.destination),
            _ => None,
        }
    }
}

impl Default for OverdueThresholds {
    fn default() -> Self {
        Self {
            logistics: Duration::minutes(10),
            destination: Duration::minutes(20),
        }
    }
}

/// When to raise the low-availability alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityAlert {
    /// Only trucks whose id starts with this prefix are counted.
    pub prefix: String,
    /// Alert when the count is at or below this.
    pub threshold: usize,
}

impl AvailabilityAlert {
    /// Build the alert policy from application config.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            prefix: config.dispatch.alert_prefix.clone(),
            threshold: config.dispatch.alert_threshold,
        }
    }
}

impl Default for AvailabilityAlert {
    fn default() -> Self {
        Self {
            prefix: "MED".to_string(),
            threshold: 3,
        }
    }
}

/// One truck as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardRow {
    /// Truck id.
    pub id: String,
    /// Truck location.
    pub location: String,
    /// Current status.
    pub status: TruckStatus,
    /// When the current logistics/destination stop began.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer_started: Option<DateTime<Utc>>,
    /// Whether the truck has been at its waypoint too long.
    pub overdue: bool,
}

/// A point-in-time view of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    /// Trucks in fleet order.
    pub trucks: Vec<DashboardRow>,
    /// Available trucks counted for the alert.
    pub available_count: usize,
    /// Whether the low-availability alert is raised.
    pub low_availability: bool,
}

/// Submitted admin changes for one truck.
///
/// `None` and empty strings both mean "no change" for `id` and `location`.
/// For `fallbacks`, `None` means an empty chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TruckEdit {
    /// New id for the truck.
    pub id: Option<String>,
    /// New location for the truck.
    pub location: Option<String>,
    /// Comma-separated fallback ids.
    pub fallbacks: Option<String>,
}

/// A bulk admin edit, keyed by the truck id the edit form was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminEdit {
    /// Per-truck edits.
    pub trucks: HashMap<String, TruckEdit>,
}

impl AdminEdit {
    /// Get or create the edit for `id`.
    pub fn entry(&mut self, id: impl Into<String>) -> &mut TruckEdit {
        self.trucks.entry(id.into()).or_default()
    }
}

/// A truck rename applied by an admin edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    /// Id before the edit.
    pub from: String,
    /// Id after the edit.
    pub to: String,
}

/// Fleet, statuses, and waypoint timers.
#[derive(Debug, Clone)]
pub struct Board {
    fleet: FleetConfig,
    statuses: HashMap<String, TruckStatus>,
    timers: HashMap<String, DateTime<Utc>>,
}

impl Board {
    /// Build a board with initial statuses.
    ///
    /// Trucks listed in `initially_available` and custom trucks just created
    /// by the loader start out available; every other truck is unavailable.
    #[must_use]
    pub fn new(fleet: FleetConfig, initially_available: &[String], created: &[String]) -> Self {
        let available: HashSet<&str> = initially_available
            .iter()
            .chain(created)
            .map(String::as_str)
            .collect();

        let statuses = fleet
            .trucks
            .iter()
            .map(|truck| {
                let status = if available.contains(truck.id.as_str()) {
                    TruckStatus::Available
                } else {
                    TruckStatus::Unavailable
                };
                (truck.id.clone(), status)
            })
            .collect();

        Self {
            fleet,
            statuses,
            timers: HashMap::new(),
        }
    }

    /// The fleet as currently edited.
    #[must_use]
    pub fn fleet(&self) -> &FleetConfig {
        &self.fleet
    }

    /// Current status of a truck.
    #[must_use]
    pub fn status(&self, id: &str) -> Option<TruckStatus> {
        self.statuses.get(id).copied()
    }

    /// When the truck's current waypoint stop began.
    #[must_use]
    pub fn timer_started(&self, id: &str) -> Option<DateTime<Utc>> {
        self.timers.get(id).copied()
    }

    /// Whether the status map knows this id.
    #[must_use]
    pub fn is_known(&self, id: &str) -> bool {
        self.statuses.contains_key(id)
    }

    /// Overwrite a truck's status.
    ///
    /// Unknown ids are inserted. Entering `logistics` or `destination`
    /// (re)starts the truck's timer; any other status clears it.
    pub fn set_status(&mut self, id: &str, status: TruckStatus, now: DateTime<Utc>) -> StatusChange {
        let previous = self.statuses.insert(id.to_string(), status);
        if previous.is_none() {
            warn!("Status set for unknown truck {id}");
        }

        if status.is_timed() {
            self.timers.insert(id.to_string(), now);
        } else {
            self.timers.remove(id);
        }

        info!("Setting {id} to {status}");
        StatusChange {
            truck_id: id.to_string(),
            previous,
            status,
            at: now,
        }
    }

    /// Mark a truck out on a call and suggest a substitute.
    pub fn dispatch(&mut self, id: &str, now: DateTime<Utc>) -> DispatchOutcome {
        let change = self.set_status(id, TruckStatus::Out, now);
        let fallback = self.resolve_fallback(id).map(ToString::to_string);
        if let Some(fallback) = &fallback {
            debug!("Suggesting {fallback} as fallback for {id}");
        }
        DispatchOutcome { change, fallback }
    }

    /// The first available candidate in the first fallback rule for `id`.
    #[must_use]
    pub fn resolve_fallback(&self, id: &str) -> Option<&str> {
        self.fleet
            .rule_for(id)?
            .fallbacks
            .iter()
            .find(|candidate| self.status(candidate) == Some(TruckStatus::Available))
            .map(String::as_str)
    }

    /// Return a known truck to service. Unknown ids are ignored.
    pub fn reset(&mut self, id: &str, now: DateTime<Utc>) -> Option<StatusChange> {
        if !self.is_known(id) {
            warn!("Truck {id} not found in status map, ignoring reset");
            return None;
        }
        Some(self.set_status(id, TruckStatus::Available, now))
    }

    /// Apply the bulk availability checklist.
    ///
    /// Every truck that is not busy becomes available if its id is in
    /// `selected`, unavailable otherwise. Busy trucks are left alone.
    pub fn apply_availability(
        &mut self,
        selected: &HashSet<String>,
        now: DateTime<Utc>,
    ) -> Vec<StatusChange> {
        let targets: Vec<String> = self
            .ordered_ids()
            .into_iter()
            .filter(|id| self.status(id).is_some_and(|s| !s.is_busy()))
            .collect();

        targets
            .into_iter()
            .map(|id| {
                let status = if selected.contains(&id) {
                    TruckStatus::Available
                } else {
                    TruckStatus::Unavailable
                };
                self.set_status(&id, status, now)
            })
            .collect()
    }

    /// Ids in the status map: fleet order first, then any stray ids sorted.
    fn ordered_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .fleet
            .trucks
            .iter()
            .filter(|t| self.statuses.contains_key(&t.id))
            .map(|t| t.id.clone())
            .collect();

        let mut extra: Vec<String> = self
            .statuses
            .keys()
            .filter(|id| !self.fleet.contains(id))
            .cloned()
            .collect();
        extra.sort();
        ids.extend(extra);
        ids
    }

    /// Apply a bulk admin edit.
    ///
    /// The edit is validated before anything changes, so a rejected edit
    /// leaves the board untouched. Renames cascade into the status map, the
    /// timer map, and the rebuilt fallback rules.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTruckId`] if a new id matches another
    /// truck's current id, an id already on the board outside the fleet, or
    /// if two trucks are renamed to the same id.
    pub fn apply_admin_edit(&mut self, edit: &AdminEdit) -> Result<Vec<Rename>> {
        let renames = self.plan_renames(edit)?;
        let rename_map: HashMap<&str, &str> = renames
            .iter()
            .map(|r| (r.from.as_str(), r.to.as_str()))
            .collect();

        let mut rules = Vec::with_capacity(self.fleet.trucks.len());
        for truck in &mut self.fleet.trucks {
            let original = truck.id.clone();
            let truck_edit = edit.trucks.get(&original);

            if let Some(&new_id) = rename_map.get(original.as_str()) {
                info!("Renaming truck {original} to {new_id}");
                truck.id = new_id.to_string();
                let status = self
                    .statuses
                    .remove(&original)
                    .unwrap_or(TruckStatus::Available);
                self.statuses.insert(truck.id.clone(), status);
                if let Some(started) = self.timers.remove(&original) {
                    self.timers.insert(truck.id.clone(), started);
                }
            }

            if let Some(location) = truck_edit
                .and_then(|e| e.location.as_deref())
                .map(str::trim)
                .filter(|l| !l.is_empty())
            {
                truck.location = location.to_string();
            }

            let fallbacks = truck_edit
                .and_then(|e| e.fallbacks.as_deref())
                .map(|raw| parse_fallbacks(raw, &rename_map))
                .unwrap_or_default();
            rules.push(FallbackRule {
                primary: truck.id.clone(),
                fallbacks,
            });
        }

        self.fleet.fallback_rules = rules;
        Ok(renames)
    }

    /// Work out which trucks are renamed and reject id collisions.
    fn plan_renames(&self, edit: &AdminEdit) -> Result<Vec<Rename>> {
        let current: HashSet<&str> = self.fleet.trucks.iter().map(|t| t.id.as_str()).collect();
        let mut claimed = HashSet::new();
        let mut renames = Vec::new();

        for truck in &self.fleet.trucks {
            let Some(new_id) = edit
                .trucks
                .get(&truck.id)
                .and_then(|e| e.id.as_deref())
                .map(str::trim)
                .filter(|id| !id.is_empty() && *id != truck.id)
            else {
                continue;
            };

            let taken = current.contains(new_id)
                || self.statuses.contains_key(new_id)
                || self.timers.contains_key(new_id);
            if taken || !claimed.insert(new_id) {
                return Err(Error::duplicate_truck_id(new_id));
            }
            renames.push(Rename {
                from: truck.id.clone(),
                to: new_id.to_string(),
            });
        }

        Ok(renames)
    }

    /// Fallback chains formatted for editing, keyed by primary.
    #[must_use]
    pub fn fallback_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        for rule in &self.fleet.fallback_rules {
            map.entry(rule.primary.clone())
                .or_insert_with(|| rule.fallbacks.join(", "));
        }
        map
    }

    /// Snapshot the board for display.
    #[must_use]
    pub fn dashboard(
        &self,
        now: DateTime<Utc>,
        thresholds: &OverdueThresholds,
        alert: &AvailabilityAlert,
    ) -> Dashboard {
        let trucks: Vec<DashboardRow> = self
            .fleet
            .trucks
            .iter()
            .map(|truck| {
                let status = self.status(&truck.id).unwrap_or(TruckStatus::Unavailable);
                let timer_started = if status.is_timed() {
                    self.timer_started(&truck.id)
                } else {
                    None
                };
                let overdue = match (timer_started, thresholds.limit_for(status)) {
                    (Some(started), Some(limit)) => now - started >= limit,
                    _ => false,
                };
                DashboardRow {
                    id: truck.id.clone(),
                    location: truck.location.clone(),
                    status,
                    timer_started,
                    overdue,
                }
            })
            .collect();

        let available_count = trucks
            .iter()
            .filter(|row| row.id.starts_with(&alert.prefix) && row.status == TruckStatus::Available)
            .count();

        Dashboard {
            trucks,
            available_count,
            low_availability: available_count <= alert.threshold,
        }
    }
}

/// Split a comma-separated fallback list, applying renames.
fn parse_fallbacks(raw: &str, renames: &HashMap<&str, &str>) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| renames.get(id).copied().unwrap_or(id).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_INITIALLY_AVAILABLE;
    use crate::fleet::Truck;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 14, 0, 0).unwrap()
    }

    fn default_available() -> Vec<String> {
        DEFAULT_INITIALLY_AVAILABLE
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn test_fleet() -> FleetConfig {
        FleetConfig {
            trucks: vec![
                Truck::new("MED-0", "Station 1"),
                Truck::new("MED-1", "Station 2"),
                Truck::new("MED-2", "Station 3"),
                Truck::new("MED-3", "Station 4"),
                Truck::new("ALPHA 5", "Station 5"),
                Truck::new("MEDIC_CUSTOM_1", "Custom Location 1"),
                Truck::new("MEDIC_CUSTOM_2", "Custom Location 2"),
            ],
            fallback_rules: vec![
                FallbackRule::new("MED-0", ["MED-1", "MED-2"]),
                FallbackRule::new("MED-2", ["MED-0"]),
            ],
        }
    }

    fn test_board() -> Board {
        Board::new(test_fleet(), &default_available(), &[])
    }

    #[test]
    fn test_initial_statuses_follow_allow_list() {
        let board = test_board();

        assert_eq!(board.status("MED-0"), Some(TruckStatus::Available));
        assert_eq!(board.status("MED-1"), Some(TruckStatus::Unavailable));
        assert_eq!(board.status("MED-2"), Some(TruckStatus::Available));
        assert_eq!(board.status("ALPHA 5"), Some(TruckStatus::Available));
        assert_eq!(board.status("MEDIC_CUSTOM_1"), Some(TruckStatus::Unavailable));
    }

    #[test]
    fn test_created_custom_trucks_start_available() {
        let created = vec!["MEDIC_CUSTOM_2".to_string()];
        let board = Board::new(test_fleet(), &default_available(), &created);

        assert_eq!(board.status("MEDIC_CUSTOM_1"), Some(TruckStatus::Unavailable));
        assert_eq!(board.status("MEDIC_CUSTOM_2"), Some(TruckStatus::Available));
    }

    #[test]
    fn test_set_status_unknown_id_is_inserted() {
        let mut board = test_board();
        let change = board.set_status("GHOST", TruckStatus::Logistics, t0());

        assert_eq!(change.previous, None);
        assert_eq!(board.status("GHOST"), Some(TruckStatus::Logistics));
        assert_eq!(board.timer_started("GHOST"), Some(t0()));
    }

    #[test]
    fn test_available_clears_timer_from_every_state() {
        for prior in TruckStatus::ALL {
            let mut board = test_board();
            board.set_status("MED-1", TruckStatus::Logistics, t0());
            board.set_status("MED-1", prior, t0());
            board.set_status("MED-1", TruckStatus::Available, t0());

            assert_eq!(board.timer_started("MED-1"), None, "prior state {prior}");
        }
    }

    #[test]
    fn test_waypoint_restarts_timer() {
        let mut board = test_board();
        board.set_status("MED-1", TruckStatus::Logistics, t0());
        let later = t0() + Duration::minutes(4);
        board.set_status("MED-1", TruckStatus::Destination, later);

        assert_eq!(board.timer_started("MED-1"), Some(later));
    }

    #[test]
    fn test_dispatch_sets_out() {
        let mut board = test_board();
        let outcome = board.dispatch("MED-3", t0());

        assert_eq!(outcome.dispatched(), "MED-3");
        assert_eq!(outcome.change.previous, Some(TruckStatus::Available));
        assert_eq!(board.status("MED-3"), Some(TruckStatus::Out));
        assert_eq!(outcome.fallback, None);
    }

    #[test]
    fn test_dispatch_skips_unavailable_fallback() {
        let mut board = test_board();
        // MED-1 is unavailable, MED-2 available
        let outcome = board.dispatch("MED-0", t0());
        assert_eq!(outcome.fallback.as_deref(), Some("MED-2"));
    }

    #[test]
    fn test_dispatch_no_available_fallback() {
        let mut board = test_board();
        board.set_status("MED-2", TruckStatus::Unavailable, t0());

        let outcome = board.dispatch("MED-0", t0());
        assert_eq!(outcome.fallback, None);
    }

    #[test]
    fn test_dispatch_uses_first_rule_only() {
        let mut fleet = test_fleet();
        fleet
            .fallback_rules
            .push(FallbackRule::new("MED-0", ["ALPHA 5"]));
        let mut board = Board::new(fleet, &default_available(), &[]);
        board.set_status("MED-2", TruckStatus::Out, t0());

        let outcome = board.dispatch("MED-0", t0());
        assert_eq!(outcome.fallback, None);
    }

    #[test]
    fn test_reset_known_truck() {
        let mut board = test_board();
        board.set_status("MED-1", TruckStatus::Destination, t0());

        let change = board.reset("MED-1", t0()).unwrap();
        assert_eq!(change.status, TruckStatus::Available);
        assert_eq!(board.timer_started("MED-1"), None);
    }

    #[test]
    fn test_reset_unknown_truck_is_ignored() {
        let mut board = test_board();
        assert!(board.reset("GHOST", t0()).is_none());
        assert!(!board.is_known("GHOST"));
    }

    #[test]
    fn test_apply_availability_skips_busy_trucks() {
        let mut board = test_board();
        board.set_status("MED-0", TruckStatus::Out, t0());
        board.set_status("MED-2", TruckStatus::Logistics, t0());

        let selected: HashSet<String> = ["MED-1".to_string(), "MED-0".to_string()].into();
        let changes = board.apply_availability(&selected, t0());

        let changed: Vec<_> = changes.iter().map(|c| c.truck_id.as_str()).collect();
        assert_eq!(
            changed,
            vec!["MED-1", "MED-3", "ALPHA 5", "MEDIC_CUSTOM_1", "MEDIC_CUSTOM_2"]
        );
        assert_eq!(board.status("MED-0"), Some(TruckStatus::Out));
        assert_eq!(board.status("MED-1"), Some(TruckStatus::Available));
        assert_eq!(board.status("MED-2"), Some(TruckStatus::Logistics));
        assert_eq!(board.status("MED-3"), Some(TruckStatus::Unavailable));
    }

    #[test]
    fn test_apply_availability_includes_stray_ids() {
        let mut board = test_board();
        board.set_status("GHOST", TruckStatus::Unavailable, t0());

        let selected: HashSet<String> = ["GHOST".to_string()].into();
        board.apply_availability(&selected, t0());
        assert_eq!(board.status("GHOST"), Some(TruckStatus::Available));
    }

    #[test]
    fn test_rename_cascades() {
        let mut board = test_board();
        board.set_status("MED-0", TruckStatus::Logistics, t0());

        let mut edit = AdminEdit::default();
        edit.entry("MED-0").id = Some("MED-20".to_string());
        edit.entry("MED-0").fallbacks = Some("MED-1, MED-2".to_string());
        edit.entry("MED-2").fallbacks = Some("MED-0".to_string());

        let renames = board.apply_admin_edit(&edit).unwrap();
        assert_eq!(
            renames,
            vec![Rename {
                from: "MED-0".to_string(),
                to: "MED-20".to_string()
            }]
        );

        assert!(!board.is_known("MED-0"));
        assert_eq!(board.status("MED-20"), Some(TruckStatus::Logistics));
        assert_eq!(board.timer_started("MED-20"), Some(t0()));
        assert_eq!(board.timer_started("MED-0"), None);

        let fleet = board.fleet();
        assert!(fleet.contains("MED-20"));
        assert!(!fleet.contains("MED-0"));
        assert_eq!(fleet.rule_for("MED-20").unwrap().fallbacks, vec!["MED-1", "MED-2"]);
        assert_eq!(fleet.rule_for("MED-2").unwrap().fallbacks, vec!["MED-20"]);
        assert!(fleet.rule_for("MED-0").is_none());
    }

    #[test]
    fn test_rename_collision_is_rejected_without_changes() {
        let mut board = test_board();
        let before = board.fleet().clone();

        let mut edit = AdminEdit::default();
        edit.entry("MED-3").location = Some("Station 9".to_string());
        edit.entry("MED-0").id = Some("MED-1".to_string());

        let err = board.apply_admin_edit(&edit).unwrap_err();
        assert!(matches!(err, Error::DuplicateTruckId { ref id } if id == "MED-1"));
        assert_eq!(board.fleet(), &before);
        assert_eq!(board.status("MED-0"), Some(TruckStatus::Available));
    }

    #[test]
    fn test_rename_onto_stray_id_is_rejected() {
        let mut board = test_board();
        board.set_status("MED-9", TruckStatus::Destination, t0());

        let mut edit = AdminEdit::default();
        edit.entry("MED-0").id = Some("MED-9".to_string());

        let err = board.apply_admin_edit(&edit).unwrap_err();
        assert!(matches!(err, Error::DuplicateTruckId { ref id } if id == "MED-9"));
        assert!(board.fleet().contains("MED-0"));
        assert_eq!(board.status("MED-0"), Some(TruckStatus::Available));
        assert_eq!(board.status("MED-9"), Some(TruckStatus::Destination));
        assert_eq!(board.timer_started("MED-9"), Some(t0()));
        assert_eq!(board.timer_started("MED-0"), None);
    }

    #[test]
    fn test_two_trucks_renamed_to_same_id_is_rejected() {
        let mut board = test_board();

        let mut edit = AdminEdit::default();
        edit.entry("MED-0").id = Some("MED-50".to_string());
        edit.entry("MED-1").id = Some(" MED-50 ".to_string());

        assert!(board.apply_admin_edit(&edit).is_err());
        assert!(board.is_known("MED-0"));
        assert!(board.is_known("MED-1"));
    }

    #[test]
    fn test_blank_or_same_id_is_not_a_rename() {
        let mut board = test_board();

        let mut edit = AdminEdit::default();
        edit.entry("MED-0").id = Some("   ".to_string());
        edit.entry("MED-1").id = Some("MED-1".to_string());

        assert!(board.apply_admin_edit(&edit).unwrap().is_empty());
        assert!(board.is_known("MED-0"));
    }

    #[test]
    fn test_admin_edit_location_keyed_by_original_id() {
        let mut board = test_board();

        let mut edit = AdminEdit::default();
        edit.entry("MED-1").id = Some("MED-11".to_string());
        edit.entry("MED-1").location = Some("Station 11".to_string());
        edit.entry("MED-2").location = Some(String::new());

        board.apply_admin_edit(&edit).unwrap();
        assert_eq!(board.fleet().truck("MED-11").unwrap().location, "Station 11");
        assert_eq!(board.fleet().truck("MED-2").unwrap().location, "Station 3");
    }

    #[test]
    fn test_admin_edit_rebuilds_every_rule() {
        let mut board = test_board();

        let mut edit = AdminEdit::default();
        edit.entry("MED-3").fallbacks = Some(" MED-0 ,, ALPHA 5,".to_string());

        board.apply_admin_edit(&edit).unwrap();
        let fleet = board.fleet();
        assert_eq!(fleet.fallback_rules.len(), fleet.trucks.len());
        assert_eq!(fleet.rule_for("MED-3").unwrap().fallbacks, vec!["MED-0", "ALPHA 5"]);
        assert!(fleet.rule_for("MED-0").unwrap().fallbacks.is_empty());
    }

    #[test]
    fn test_fallback_map() {
        let board = test_board();
        let map = board.fallback_map();
        assert_eq!(map.get("MED-0").map(String::as_str), Some("MED-1, MED-2"));
        assert_eq!(map.get("MED-2").map(String::as_str), Some("MED-0"));
        assert!(!map.contains_key("MED-1"));
    }

    #[test]
    fn test_dashboard_overdue_flags() {
        let mut board = test_board();
        board.set_status("MED-0", TruckStatus::Logistics, t0());
        board.set_status("MED-2", TruckStatus::Destination, t0());

        let thresholds = OverdueThresholds::default();
        let alert = AvailabilityAlert::default();

        let at_nine = board.dashboard(t0() + Duration::minutes(9), &thresholds, &alert);
        assert!(at_nine.trucks.iter().all(|row| !row.overdue));

        let at_ten = board.dashboard(t0() + Duration::minutes(10), &thresholds, &alert);
        let overdue: Vec<_> = at_ten
            .trucks
            .iter()
            .filter(|row| row.overdue)
            .map(|row| row.id.as_str())
            .collect();
        assert_eq!(overdue, vec!["MED-0"]);

        let at_twenty = board.dashboard(t0() + Duration::minutes(20), &thresholds, &alert);
        assert_eq!(at_twenty.trucks.iter().filter(|row| row.overdue).count(), 2);
    }

    #[test]
    fn test_dashboard_low_availability_alert() {
        let mut board = test_board();
        let alert = AvailabilityAlert::default();
        let thresholds = OverdueThresholds::default();

        // MED-0, MED-2, MED-3 available; ALPHA 5 does not count
        let dashboard = board.dashboard(t0(), &thresholds, &alert);
        assert_eq!(dashboard.available_count, 3);
        assert!(dashboard.low_availability);

        board.set_status("MED-1", TruckStatus::Available, t0());
        let dashboard = board.dashboard(t0(), &thresholds, &alert);
        assert_eq!(dashboard.available_count, 4);
        assert!(!dashboard.low_availability);

        board.dispatch("MED-0", t0());
        let dashboard = board.dashboard(t0(), &thresholds, &alert);
        assert_eq!(dashboard.available_count, 3);
        assert!(dashboard.low_availability);
    }

    #[test]
    fn test_dashboard_rows_in_fleet_order() {
        let board = test_board();
        let dashboard = board.dashboard(
            t0(),
            &OverdueThresholds::default(),
            &AvailabilityAlert::default(),
        );
        let ids: Vec<_> = dashboard.trucks.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids[0], "MED-0");
        assert_eq!(ids.last().copied(), Some("MEDIC_CUSTOM_2"));
    }

    #[test]
    fn test_thresholds_from_config() {
        let mut config = Config::default();
        config.dispatch.logistics_overdue_minutes = 5;
        let thresholds = OverdueThresholds::from_config(&config);
        assert_eq!(thresholds.logistics, Duration::minutes(5));
        assert_eq!(thresholds.limit_for(TruckStatus::Out), None);
    }
}
