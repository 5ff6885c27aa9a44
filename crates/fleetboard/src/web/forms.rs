//! Decoding of submitted HTML forms.
//!
//! The availability and admin forms have one field per truck, so they are
//! extracted as raw `(name, value)` pairs and decoded here.

use std::collections::HashSet;

use serde::Deserialize;

use crate::fleet::AdminEdit;

/// Field name prefix for a truck's new id on the admin form.
pub const ID_PREFIX: &str = "id_";
/// Field name prefix for a truck's new location on the admin form.
pub const LOCATION_PREFIX: &str = "location_";
/// Field name prefix for a truck's fallback list on the admin form.
pub const FALLBACK_PREFIX: &str = "fallback_";

/// The dispatch form.
#[derive(Debug, Deserialize)]
pub struct DispatchForm {
    /// Truck to dispatch.
    pub truck_id: Option<String>,
}

/// Truck ids ticked on the availability form.
#[must_use]
pub fn selected_trucks(fields: &[(String, String)]) -> HashSet<String> {
    fields
        .iter()
        .filter(|(name, _)| name == "available")
        .map(|(_, value)| value.clone())
        .collect()
}

/// The admin password field, if submitted.
#[must_use]
pub fn password(fields: &[(String, String)]) -> Option<&str> {
    fields
        .iter()
        .find(|(name, _)| name == "password")
        .map(|(_, value)| value.as_str())
}

/// Decode the admin editor form.
///
/// Unrecognised fields are ignored. Each field is keyed by the truck id the
/// form was rendered with.
#[must_use]
pub fn admin_edit(fields: &[(String, String)]) -> AdminEdit {
    let mut edit = AdminEdit::default();
    for (name, value) in fields {
        if let Some(id) = name.strip_prefix(ID_PREFIX) {
            edit.entry(id).id = Some(value.clone());
        } else if let Some(id) = name.strip_prefix(LOCATION_PREFIX) {
            edit.entry(id).location = Some(value.clone());
        } else if let Some(id) = name.strip_prefix(FALLBACK_PREFIX) {
            edit.entry(id).fallbacks = Some(value.clone());
        }
    }
    edit
}
