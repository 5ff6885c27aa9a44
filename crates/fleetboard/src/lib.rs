//! `fleetboard` - Truck status board for a small emergency dispatch office
//!
//! The library holds the fleet model (trucks, statuses, fallback chains and
//! waypoint timers), the retained activity log, and the axum web surface
//! that dispatchers use to drive the board.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod activity;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod fleet;
pub mod logging;
pub mod state;
pub mod web;

pub use activity::{ActivityEntry, ActivityLog};
pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
pub use fleet::{Board, FallbackRule, FleetConfig, FleetStore, Truck, TruckStatus};
pub use logging::init_logging;
pub use state::AppState;
