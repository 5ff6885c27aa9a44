//! Request handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use tracing::{info, warn};

use crate::fleet::Dashboard;
use crate::state::AppState;

use super::error::ApiError;
use super::forms::{self, DispatchForm};
use super::render;
use super::session::session_cookie;

/// `GET /`
pub async fn dashboard(State(state): State<Arc<AppState>>) -> Html<String> {
    let view = state.dashboard_view();
    Html(render::dashboard_page(
        &view,
        &state.config().dispatch.alert_prefix,
    ))
}

/// `POST /dispatch`
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    Form(form): Form<DispatchForm>,
) -> Result<Html<String>, ApiError> {
    let truck_id = form
        .truck_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing form field: truck_id".to_string()))?;

    let outcome = state.dispatch(&truck_id);
    Ok(Html(render::dispatch_result_page(&outcome)))
}

/// `GET /reset/{truck_id}`
pub async fn reset(State(state): State<Arc<AppState>>, Path(truck_id): Path<String>) -> Redirect {
    state.reset(&truck_id);
    Redirect::to("/")
}

/// `GET /logistics/{truck_id}`
pub async fn logistics(
    State(state): State<Arc<AppState>>,
    Path(truck_id): Path<String>,
) -> Redirect {
    state.mark_logistics(&truck_id);
    Redirect::to("/")
}

/// `GET /destination/{truck_id}`
pub async fn destination(
    State(state): State<Arc<AppState>>,
    Path(truck_id): Path<String>,
) -> Redirect {
    state.mark_destination(&truck_id);
    Redirect::to("/")
}

/// `GET /availability`
pub async fn availability_page(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render::availability_page(&state.fleet_statuses()))
}

/// `POST /availability`
pub async fn availability_submit(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Redirect {
    let selected = forms::selected_trucks(&fields);
    let changes = state.set_availability(&selected);
    info!(
        "Availability updated: {} selected, {} trucks changed",
        selected.len(),
        changes.len()
    );
    Redirect::to("/")
}

/// `GET /admin`
pub async fn admin_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Html<String> {
    if !state.sessions().is_logged_in(&headers) {
        return Html(render::admin_login_page(false));
    }
    Html(editor(&state, None))
}

/// `POST /admin`
///
/// Without a session this is a login attempt; with one it is an edit.
pub async fn admin_submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    if !state.sessions().is_logged_in(&headers) {
        if forms::password(&fields) == Some(state.config().admin.password.as_str()) {
            let token = state.sessions().create();
            info!("Admin logged in");
            return Ok((
                [(SET_COOKIE, session_cookie(&token))],
                Redirect::to("/admin"),
            )
                .into_response());
        }
        warn!("Rejected admin login attempt");
        return Ok(Html(render::admin_login_page(true)).into_response());
    }

    let edit = forms::admin_edit(&fields);
    let renames = state.apply_admin_edit(&edit)?;
    for rename in &renames {
        info!("Renamed {} to {}", rename.from, rename.to);
    }
    Ok(Html(editor(&state, Some("Changes saved."))).into_response())
}

/// `GET /api/status`
pub async fn api_status(State(state): State<Arc<AppState>>) -> Json<Dashboard> {
    Json(state.dashboard())
}

fn editor(state: &AppState, notice: Option<&str>) -> String {
    let fleet = state.fleet();
    render::admin_page(&fleet.trucks, &state.fallback_map(), notice)
}
