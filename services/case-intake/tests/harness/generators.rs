// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators for attack simulation.

use case_intake::normalizer::BodyEncoding;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Generate a pool of peer addresses, each with its own ephemeral port.
pub fn generate_peers(count: usize) -> Vec<SocketAddr> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, a, b, c)), 30000 + (i % 1000) as u16)
        })
        .collect()
}

/// Forged X-Forwarded-For values, one per request.
pub fn generate_forwarded(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("198.51.100.{}, 10.0.0.1", i % 250))
        .collect()
}

/// A `(content type, body)` pair for each payload class.
pub fn valid_case(i: usize) -> (&'static str, String) {
    if i % 2 == 0 {
        (
            "application/x-www-form-urlencoded",
            format!("urgency=high&summary=case+{i}&platforms=Signal"),
        )
    } else {
        (
            "application/json",
            format!(r#"{{"urgency":"low","summary":"case {i}"}}"#),
        )
    }
}

pub fn malformed_bodies() -> Vec<(&'static str, &'static str)> {
    vec![
        ("application/json", "{"),
        ("application/json", ""),
        ("application/json", "[\"urgency\", \"high\"]"),
        ("application/json", "null"),
        ("application/x-www-form-urlencoded", "urgency=high;summary=x"),
        ("application/x-www-form-urlencoded", "summary=%E"),
        ("application/x-www-form-urlencoded", "summary=%GG"),
    ]
}

pub fn incomplete_bodies() -> Vec<(&'static str, &'static str)> {
    vec![
        ("application/json", "{}"),
        ("application/json", r#"{"urgency":"high"}"#),
        ("application/json", r#"{"summary":"x","urgency":""}"#),
        ("application/x-www-form-urlencoded", "summary=x"),
        ("text/plain", "hello"),
    ]
}

/// Content-Type values and the decoder each must select.
pub fn generate_content_types() -> Vec<(Option<&'static str>, BodyEncoding)> {
    vec![
        (Some("application/x-www-form-urlencoded"), BodyEncoding::UrlEncoded),
        (
            Some("application/x-www-form-urlencoded; charset=utf-8"),
            BodyEncoding::UrlEncoded,
        ),
        (Some("APPLICATION/X-WWW-FORM-URLENCODED"), BodyEncoding::UrlEncoded),
        (Some("application/json"), BodyEncoding::Json),
        (Some("Application/JSON; charset=utf-8"), BodyEncoding::Json),
        (Some("  application/json"), BodyEncoding::Json),
        (Some("text/plain"), BodyEncoding::PlainText),
        (Some("multipart/form-data; boundary=---"), BodyEncoding::PlainText),
        (Some("application/xml"), BodyEncoding::PlainText),
        (None, BodyEncoding::UrlEncoded),
        (Some(""), BodyEncoding::UrlEncoded),
        (Some("   "), BodyEncoding::UrlEncoded),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_peers() {
        let peers = generate_peers(256);
        assert_eq!(peers.len(), 256);
        // All hosts should be unique
        let unique: std::collections::HashSet<_> = peers.iter().map(|p| p.ip()).collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn test_valid_case_alternates_encoding() {
        assert_eq!(valid_case(0).0, "application/x-www-form-urlencoded");
        assert_eq!(valid_case(1).0, "application/json");
    }
}
