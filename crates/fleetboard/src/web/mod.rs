//! The HTTP surface.
//!
//! A single axum router serves the HTML dashboard, the action endpoints the
//! dashboard links to, the availability checklist, the admin editor and a
//! JSON snapshot at `/api/status`.

pub mod error;
pub mod forms;
pub mod handlers;
pub mod render;
pub mod session;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::state::AppState;

/// Build the router.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/dispatch", post(handlers::dispatch))
        .route("/reset/{truck_id}", get(handlers::reset))
        .route("/logistics/{truck_id}", get(handlers::logistics))
        .route("/destination/{truck_id}", get(handlers::destination))
        .route(
            "/availability",
            get(handlers::availability_page).post(handlers::availability_submit),
        )
        .route(
            "/admin",
            get(handlers::admin_page).post(handlers::admin_submit),
        )
        .route("/api/status", get(handlers::api_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the router on `addr` until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(state: Arc<AppState>, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr).await.map_err(|source| Error::Bind {
        addr: addr.to_string(),
        source,
    })?;
    info!("Listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
