//! Admin login sessions.
//!
//! Logging in hands the browser a random token in a cookie. Tokens live in
//! memory only and never expire; restarting the server logs everyone out.

use std::collections::HashSet;

use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use parking_lot::Mutex;
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "fleetboard_session";

/// Tokens of logged-in admin browsers.
#[derive(Debug, Default)]
pub struct SessionStore {
    tokens: Mutex<HashSet<String>>,
}

impl SessionStore {
    /// Start a new session and return its token.
    #[must_use]
    pub fn create(&self) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.tokens.lock().insert(token.clone());
        token
    }

    /// Whether `token` belongs to a live session.
    #[must_use]
    pub fn is_valid(&self, token: &str) -> bool {
        self.tokens.lock().contains(token)
    }

    /// Whether the request carries a live session cookie.
    #[must_use]
    pub fn is_logged_in(&self, headers: &HeaderMap) -> bool {
        session_token(headers).is_some_and(|token| self.is_valid(token))
    }
}

/// Extract the session token from the request's `Cookie` headers.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token)
}

/// The `Set-Cookie` value for a new session.
#[must_use]
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}
