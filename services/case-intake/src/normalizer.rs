// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission body normalizer.
//!
//! Turns a raw request body into a [`CanonicalForm`] regardless of how the
//! client chose to encode it:
//! - `application/json` objects
//! - `application/x-www-form-urlencoded` data
//! - plain text with alternating label and value lines
//!
//! Some clients post plain label/value text under a form content type (or
//! under no structured type at all), so when the structured decode does not
//! yield the required fields the raw text is also read as label/value lines
//! and merged in.

use crate::form::CanonicalForm;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Fields whose absence triggers the plain-text fallback.
const REQUIRED_FIELDS: [&str; 2] = ["urgency", "summary"];

/// Body could not be decoded under the selected encoding.
#[derive(Debug, Error)]
pub enum MalformedBody {
    #[error("empty JSON body")]
    EmptyJson,

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON body must be an object")]
    NotAnObject,

    #[error("invalid semicolon separator in form data")]
    Semicolon,

    #[error("invalid percent escape in form data")]
    BadEscape,

    #[error("timed out reading body")]
    ReadTimeout,
}

/// Body encodings, chosen from the Content-Type header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    /// `application/json...`
    Json,
    /// `application/x-www-form-urlencoded`, or no content type at all
    UrlEncoded,
    /// Anything else; only the label/value line reading applies
    PlainText,
}

impl BodyEncoding {
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let ct = content_type.unwrap_or("").trim().to_lowercase();
        if ct.starts_with("application/json") {
            return Self::Json;
        }
        let media_type = ct.split(';').next().unwrap_or("").trim();
        match media_type {
            "" | "application/x-www-form-urlencoded" => Self::UrlEncoded,
            _ => Self::PlainText,
        }
    }
}

/// Decodes request bodies into canonical forms.
#[derive(Debug, Clone)]
pub struct BodyNormalizer {
    max_body_bytes: usize,
}

impl BodyNormalizer {
    pub fn new(max_body_bytes: usize) -> Self {
        Self { max_body_bytes }
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Normalize `raw` according to `content_type`.
    ///
    /// Bytes past the body cap are ignored. Fields in `already_parsed` (for
    /// example query parameters) are appended after the body's own fields.
    pub fn normalize(
        &self,
        content_type: Option<&str>,
        raw: &[u8],
        already_parsed: Option<CanonicalForm>,
    ) -> Result<CanonicalForm, MalformedBody> {
        let raw = &raw[..raw.len().min(self.max_body_bytes)];
        let encoding = BodyEncoding::from_content_type(content_type);
        debug!(?encoding, body_len = raw.len(), "normalizing body");

        let mut form = match encoding {
            BodyEncoding::Json => decode_json(raw)?,
            BodyEncoding::UrlEncoded => decode_urlencoded(raw)?,
            BodyEncoding::PlainText => CanonicalForm::new(),
        };
        if let Some(parsed) = already_parsed {
            form.merge(parsed);
        }

        if encoding != BodyEncoding::Json && missing_required(&form) {
            let pairs = decode_plain_pairs(raw);
            if !pairs.is_empty() {
                debug!(fields = pairs.len(), "merging plain label/value lines");
                form.merge(pairs);
            }
        }

        Ok(form)
    }
}

fn missing_required(form: &CanonicalForm) -> bool {
    REQUIRED_FIELDS.iter().any(|field| form.first(field).is_empty())
}

fn decode_json(raw: &[u8]) -> Result<CanonicalForm, MalformedBody> {
    if raw.is_empty() {
        return Err(MalformedBody::EmptyJson);
    }
    let object = match serde_json::from_slice::<Value>(raw)? {
        Value::Object(object) => object,
        _ => return Err(MalformedBody::NotAnObject),
    };

    let mut form = CanonicalForm::new();
    for (key, value) in object {
        match value {
            Value::Array(items) => {
                for item in &items {
                    let text = stringify(item);
                    if !text.is_empty() {
                        form.add(key.clone(), text);
                    }
                }
            }
            other => {
                let text = stringify(&other);
                if !text.is_empty() {
                    form.add(key, text);
                }
            }
        }
    }
    Ok(form)
}

/// Textual form of a JSON value.
///
/// `null` renders as nothing and the field is dropped, so an explicit
/// `"summary": null` reads as a missing summary rather than a placeholder.
/// Objects and arrays nested below the top level render as compact JSON.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "yes".to_string(),
        Value::Bool(false) => "no".to_string(),
        Value::Null => String::new(),
        nested => serde_json::to_string(nested).unwrap_or_default(),
    }
}

/// Strict `application/x-www-form-urlencoded` decoding, shared by bodies and
/// query strings.
pub fn decode_urlencoded(raw: &[u8]) -> Result<CanonicalForm, MalformedBody> {
    let mut form = CanonicalForm::new();
    for pair in raw.split(|b| *b == b'&') {
        if pair.is_empty() {
            continue;
        }
        if pair.contains(&b';') {
            return Err(MalformedBody::Semicolon);
        }
        if !has_valid_escapes(pair) {
            return Err(MalformedBody::BadEscape);
        }
        for (key, value) in url::form_urlencoded::parse(pair) {
            form.add(key.into_owned(), value.into_owned());
        }
    }
    Ok(form)
}

/// Every `%` must be followed by two hex digits.
fn has_valid_escapes(bytes: &[u8]) -> bool {
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            match bytes.get(i + 1..i + 3) {
                Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => i += 3,
                _ => return false,
            }
        } else {
            i += 1;
        }
    }
    true
}

/// Read alternating non-blank label and value lines.
///
/// Blank lines are skipped only where a label is expected; a label on the
/// last line maps to an empty value.
fn decode_plain_pairs(raw: &[u8]) -> CanonicalForm {
    let text = String::from_utf8_lossy(raw).replace("\r\n", "\n");
    let mut form = CanonicalForm::new();
    if text.trim().is_empty() {
        return form;
    }

    let mut lines = text.split('\n');
    while let Some(line) = lines.next() {
        let key = line.trim();
        if key.is_empty() {
            continue;
        }
        let value = lines.next().map(str::trim).unwrap_or("");
        form.add(key, value);
    }
    form
}
