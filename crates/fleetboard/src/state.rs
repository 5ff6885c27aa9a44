//! Shared application state.
//!
//! [`AppState`] owns the board, the activity log, the fleet store and the
//! admin sessions. Request handlers never touch those directly: every
//! mutation goes through a method here, which applies it to the board and
//! records each resulting status change in the activity log.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, info};

use crate::activity::{ActivityEntry, ActivityLog};
use crate::clock::Clock;
use crate::config::Config;
use crate::error::Result;
use crate::fleet::{
    AdminEdit, AvailabilityAlert, Board, Dashboard, DispatchOutcome, FleetConfig, FleetStore,
    OverdueThresholds, Rename, StatusChange, Truck, TruckStatus,
};
use crate::web::session::SessionStore;

/// Everything a request handler needs.
#[derive(Debug)]
pub struct AppState {
    config: Config,
    clock: Arc<dyn Clock>,
    store: FleetStore,
    board: Mutex<Board>,
    activity: Mutex<ActivityLog>,
    sessions: SessionStore,
    thresholds: OverdueThresholds,
    alert: AvailabilityAlert,
}

/// The dashboard plus the activity log entries to show under it.
#[derive(Debug, Clone)]
pub struct DashboardView {
    /// Board snapshot.
    pub dashboard: Dashboard,
    /// Activity entries, newest first.
    pub activity: Vec<ActivityEntry>,
}

impl AppState {
    /// Load the fleet file and activity log and build the board.
    ///
    /// # Errors
    ///
    /// Returns an error if the fleet file is missing or malformed, the
    /// activity log cannot be read, or the config is invalid.
    pub fn load(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let store = FleetStore::new(&config.storage.fleet_path);
        let loaded = store.load()?;
        let board = Board::new(
            loaded.fleet,
            &config.dispatch.initially_available,
            &loaded.created,
        );

        let activity = ActivityLog::open(
            &config.storage.activity_log_path,
            config.retention(),
            config.log_timezone()?,
            clock.now(),
        )?;

        Ok(Self {
            thresholds: OverdueThresholds::from_config(&config),
            alert: AvailabilityAlert::from_config(&config),
            sessions: SessionStore::default(),
            board: Mutex::new(board),
            activity: Mutex::new(activity),
            store,
            clock,
            config,
        })
    }

    /// Application config.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Admin sessions.
    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Dispatch a truck and suggest a fallback.
    pub fn dispatch(&self, truck_id: &str) -> DispatchOutcome {
        let outcome = self.board.lock().dispatch(truck_id, self.clock.now());
        self.record(std::slice::from_ref(&outcome.change));
        outcome
    }

    /// Return a known truck to service. Unknown ids are ignored.
    pub fn reset(&self, truck_id: &str) -> Option<StatusChange> {
        let change = self.board.lock().reset(truck_id, self.clock.now())?;
        self.record(std::slice::from_ref(&change));
        Some(change)
    }

    /// Put a truck at a logistics stop and start its timer.
    pub fn mark_logistics(&self, truck_id: &str) -> StatusChange {
        self.set_status(truck_id, TruckStatus::Logistics)
    }

    /// Put a truck at a destination stop and start its timer.
    pub fn mark_destination(&self, truck_id: &str) -> StatusChange {
        self.set_status(truck_id, TruckStatus::Destination)
    }

    /// Overwrite a truck's status.
    pub fn set_status(&self, truck_id: &str, status: TruckStatus) -> StatusChange {
        let change = self
            .board
            .lock()
            .set_status(truck_id, status, self.clock.now());
        self.record(std::slice::from_ref(&change));
        change
    }

    /// Apply the bulk availability checklist.
    pub fn set_availability(&self, selected: &HashSet<String>) -> Vec<StatusChange> {
        let changes = self
            .board
            .lock()
            .apply_availability(selected, self.clock.now());
        self.record(&changes);
        changes
    }

    /// Apply an admin edit and save the fleet file.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the edit is rejected (nothing changes),
    /// or an I/O error if the fleet file cannot be written (the in-memory
    /// edit stays applied).
    pub fn apply_admin_edit(&self, edit: &AdminEdit) -> Result<Vec<Rename>> {
        let (renames, fleet) = {
            let mut board = self.board.lock();
            let renames = board.apply_admin_edit(edit)?;
            (renames, board.fleet().clone())
        };
        self.store.save(&fleet)?;
        info!("Admin edit saved ({} renames)", renames.len());
        Ok(renames)
    }

    /// Current status of a truck.
    #[must_use]
    pub fn status(&self, truck_id: &str) -> Option<TruckStatus> {
        self.board.lock().status(truck_id)
    }

    /// A copy of the fleet as currently edited.
    #[must_use]
    pub fn fleet(&self) -> FleetConfig {
        self.board.lock().fleet().clone()
    }

    /// Fleet plus each truck's status, for the availability page.
    #[must_use]
    pub fn fleet_statuses(&self) -> Vec<(Truck, TruckStatus)> {
        let board = self.board.lock();
        board
            .fleet()
            .trucks
            .iter()
            .map(|t| {
                let status = board.status(&t.id).unwrap_or(TruckStatus::Unavailable);
                (t.clone(), status)
            })
            .collect()
    }

    /// Fallback chains formatted for the admin editor.
    #[must_use]
    pub fn fallback_map(&self) -> HashMap<String, String> {
        self.board.lock().fallback_map()
    }

    /// Snapshot the board.
    #[must_use]
    pub fn dashboard(&self) -> Dashboard {
        self.board
            .lock()
            .dashboard(self.clock.now(), &self.thresholds, &self.alert)
    }

    /// Snapshot the board and the activity log.
    #[must_use]
    pub fn dashboard_view(&self) -> DashboardView {
        let dashboard = self.dashboard();
        let limit = self.config.activity.display_limit;
        let activity = self.activity.lock();
        let entries = activity.entries();
        let shown = if limit == 0 {
            entries
        } else {
            &entries[..limit.min(entries.len())]
        };
        DashboardView {
            dashboard,
            activity: shown.to_vec(),
        }
    }

    /// Record status changes in the activity log.
    ///
    /// Write failures are logged; the status change itself stands.
    fn record(&self, changes: &[StatusChange]) {
        let mut activity = self.activity.lock();
        for change in changes {
            if let Err(e) = activity.record(&change.truck_id, change.status, change.at) {
                error!("Failed to record activity for {}: {e}", change.truck_id);
            }
        }
    }
}
