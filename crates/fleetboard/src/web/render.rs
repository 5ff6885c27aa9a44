//! HTML pages.
//!
//! Pages are small enough to build by hand. Everything interpolated into
//! markup goes through [`escape`]; truck ids placed in URLs go through
//! [`encode_segment`] since ids may contain spaces.

use std::collections::HashMap;

use crate::fleet::{DispatchOutcome, Truck, TruckStatus};
use crate::state::DashboardView;

use super::forms::{FALLBACK_PREFIX, ID_PREFIX, LOCATION_PREFIX};

const STYLE: &str = r"
body { font-family: sans-serif; margin: 1.5rem; }
table { border-collapse: collapse; }
th, td { border: 1px solid #ccc; padding: 0.3rem 0.6rem; text-align: left; }
.available { background: #d4f7d4; }
.unavailable { background: #eee; color: #777; }
.out { background: #f7d4d4; }
.logistics { background: #fff2c6; }
.destination { background: #d4e4f7; }
.overdue { animation: flash 1s step-start infinite; }
@keyframes flash { 50% { background: #ff8080; } }
.alert { background: #c00; color: #fff; padding: 0.6rem; font-weight: bold; }
.error { color: #c00; }
nav a { margin-right: 1rem; }
";

/// Escape text for use in HTML content and quoted attributes.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encode a truck id for use as a URL path segment.
#[must_use]
pub fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>{STYLE}</style>\n</head>\n<body>\n<nav><a href=\"/\">Dashboard</a>\
         <a href=\"/availability\">Availability</a><a href=\"/admin\">Admin</a></nav>\n\
         <h1>{title}</h1>\n{body}</body>\n</html>\n",
        title = escape(title),
    )
}

/// The main status board.
#[must_use]
pub fn dashboard_page(view: &DashboardView, alert_prefix: &str) -> String {
    let dashboard = &view.dashboard;
    let mut body = String::new();

    if dashboard.low_availability {
        body.push_str(&format!(
            "<p class=\"alert\">Only {} {} units available</p>\n",
            dashboard.available_count,
            escape(alert_prefix)
        ));
    } else {
        body.push_str(&format!(
            "<p>{} {} units available</p>\n",
            dashboard.available_count,
            escape(alert_prefix)
        ));
    }

    body.push_str(
        "<table>\n<tr><th>Truck</th><th>Location</th><th>Status</th>\
         <th>Since</th><th>Actions</th></tr>\n",
    );
    for row in &dashboard.trucks {
        let id = escape(&row.id);
        let segment = encode_segment(&row.id);
        let mut class = row.status.as_str().to_string();
        if row.overdue {
            class.push_str(" overdue");
        }
        let since = row.timer_started.map_or_else(String::new, |started| {
            let iso = started.format("%Y-%m-%dT%H:%M:%SZ");
            format!("<time datetime=\"{iso}\">{iso}</time>")
        });
        body.push_str(&format!(
            "<tr class=\"{class}\"><td>{id}</td><td>{location}</td><td>{status}</td>\
             <td>{since}</td><td>\
             <form method=\"post\" action=\"/dispatch\" style=\"display:inline\">\
             <input type=\"hidden\" name=\"truck_id\" value=\"{id}\">\
             <button type=\"submit\">Dispatch</button></form> \
             <a href=\"/logistics/{segment}\">Logistics</a> \
             <a href=\"/destination/{segment}\">Destination</a> \
             <a href=\"/reset/{segment}\">Available</a></td></tr>\n",
            location = escape(&row.location),
            status = row.status,
        ));
    }
    body.push_str("</table>\n<h2>Activity</h2>\n<ul>\n");
    for entry in &view.activity {
        body.push_str(&format!("<li>{}</li>\n", escape(&entry.to_string())));
    }
    body.push_str("</ul>\n");

    page("Truck Status", &body)
}

/// Confirmation shown after a dispatch.
#[must_use]
pub fn dispatch_result_page(outcome: &DispatchOutcome) -> String {
    let mut body = format!(
        "<p><strong>{}</strong> has been dispatched.</p>\n",
        escape(outcome.dispatched())
    );
    match &outcome.fallback {
        Some(fallback) => body.push_str(&format!(
            "<p>Suggested fallback: <strong>{}</strong></p>\n",
            escape(fallback)
        )),
        None => body.push_str("<p>No fallback available.</p>\n"),
    }
    body.push_str("<p><a href=\"/\">Back to dashboard</a></p>\n");
    page("Dispatched", &body)
}

/// The bulk availability checklist.
///
/// Busy trucks are shown but cannot be toggled.
#[must_use]
pub fn availability_page(trucks: &[(Truck, TruckStatus)]) -> String {
    let mut body = String::from("<form method=\"post\" action=\"/availability\">\n<ul>\n");
    for (truck, status) in trucks {
        let id = escape(&truck.id);
        let checked = if *status == TruckStatus::Available {
            " checked"
        } else {
            ""
        };
        let disabled = if status.is_busy() { " disabled" } else { "" };
        body.push_str(&format!(
            "<li><label><input type=\"checkbox\" name=\"available\" value=\"{id}\"\
             {checked}{disabled}> {id} ({location}) &mdash; {status}</label></li>\n",
            location = escape(&truck.location),
        ));
    }
    body.push_str("</ul>\n<button type=\"submit\">Save</button>\n</form>\n");
    page("Availability", &body)
}

/// The admin password prompt.
#[must_use]
pub fn admin_login_page(failed: bool) -> String {
    let mut body = String::new();
    if failed {
        body.push_str("<p class=\"error\">Incorrect password.</p>\n");
    }
    body.push_str(
        "<form method=\"post\" action=\"/admin\">\n\
         <input type=\"password\" name=\"password\" autofocus>\n\
         <button type=\"submit\">Log in</button>\n</form>\n",
    );
    page("Admin Login", &body)
}

/// The truck identity, location and fallback editor.
///
/// Field names embed the truck id the page was rendered with, so renames
/// and edits to the same truck arrive together.
#[must_use]
pub fn admin_page(
    trucks: &[Truck],
    fallbacks: &HashMap<String, String>,
    notice: Option<&str>,
) -> String {
    let mut body = notice.map_or_else(String::new, |notice| {
        format!("<p><strong>{}</strong></p>\n", escape(notice))
    });
    body.push_str(
        "<form method=\"post\" action=\"/admin\">\n<table>\n\
         <tr><th>Truck</th><th>Location</th><th>Fallbacks (comma separated)</th></tr>\n",
    );
    for truck in trucks {
        let id = escape(&truck.id);
        let chain = fallbacks.get(&truck.id).map_or("", String::as_str);
        body.push_str(&format!(
            "<tr><td><input name=\"{ID_PREFIX}{id}\" value=\"{id}\"></td>\
             <td><input name=\"{LOCATION_PREFIX}{id}\" value=\"{location}\"></td>\
             <td><input name=\"{FALLBACK_PREFIX}{id}\" value=\"{chain}\"></td></tr>\n",
            location = escape(&truck.location),
            chain = escape(chain),
        ));
    }
    body.push_str("</table>\n<button type=\"submit\">Save</button>\n</form>\n");
    page("Admin", &body)
}
