// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Renders a submission as the plain-text message sent to recipients.

use crate::form::CanonicalForm;
use crate::geo::Location;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write;

/// How a field's values are rendered.
#[derive(Debug, Clone, Copy)]
enum FieldKind {
    /// Only the first value
    Text,
    /// All values, comma-separated
    List,
}

/// Rendered fields, in output order.
const FIELDS: [(&str, &str, FieldKind); 13] = [
    ("Type", "type", FieldKind::List),
    ("Type other", "type_other_specify", FieldKind::Text),
    ("Urgency", "urgency", FieldKind::Text),
    ("Summary", "summary", FieldKind::Text),
    ("Platforms", "platforms", FieldKind::List),
    ("Evidence", "evidence", FieldKind::List),
    ("Actions", "actions", FieldKind::List),
    ("Country residence", "country_residence", FieldKind::Text),
    ("Country incident", "country_incident", FieldKind::Text),
    ("Contact name", "contact_name", FieldKind::Text),
    ("Contact method", "contact_method", FieldKind::Text),
    ("Urgent contact", "urgent_contact", FieldKind::Text),
    ("Privacy", "privacy", FieldKind::List),
];

/// Format a submission using the current time for the empty-form line.
pub fn format_message(form: &CanonicalForm, origin: &str, location: Option<&Location>) -> String {
    format_message_at(form, origin, location, Utc::now())
}

/// Format a submission.
///
/// The output is never empty: a form with none of the known fields renders
/// as a single "empty form submitted at ..." line.
pub fn format_message_at(
    form: &CanonicalForm,
    origin: &str,
    location: Option<&Location>,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();

    for (label, key, kind) in FIELDS {
        let value = match kind {
            FieldKind::Text => form.first(key).to_string(),
            FieldKind::List => form
                .values(key)
                .iter()
                .filter(|v| !v.is_empty())
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        };
        if !value.is_empty() {
            let _ = writeln!(out, "{label}: {value}");
        }
    }

    if out.is_empty() {
        let _ = writeln!(
            out,
            "empty form submitted at {}",
            now.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
    }

    if !origin.is_empty() {
        let _ = write!(out, "\nIP: {origin}\n");
    }

    if let Some(location) = location {
        if let Some(country) = location.country.as_deref().filter(|c| !c.is_empty()) {
            let _ = writeln!(out, "Country: {country}");
        }
        if let Some(city) = location.city.as_deref().filter(|c| !c.is_empty()) {
            let _ = writeln!(out, "City: {city}");
        }
    }

    out
}
