// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Best-guess originating address of a request.
//!
//! Proxy headers are untrusted; the result is only used for enrichment and
//! display, never for access decisions.

use axum::http::HeaderMap;
use std::net::SocketAddr;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Resolve the originating address, first match wins:
/// 1. first non-empty entry of `X-Forwarded-For`
/// 2. `X-Real-IP`
/// 3. host part of the transport peer address
/// 4. the peer address as given
///
/// Returns an empty string when nothing is known.
pub fn resolve(headers: &HeaderMap, peer: &str) -> String {
    if let Some(ip) = header_str(headers, X_FORWARDED_FOR)
        .and_then(|v| v.split(',').map(str::trim).find(|part| !part.is_empty()))
    {
        return ip.to_string();
    }

    if let Some(ip) = header_str(headers, X_REAL_IP)
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return ip.to_string();
    }

    peer_host(peer)
}

/// Host part of a `host:port` peer address, or the trimmed input when it has
/// no port.
pub fn peer_host(peer: &str) -> String {
    if let Ok(addr) = peer.parse::<SocketAddr>() {
        return addr.ip().to_string();
    }
    match split_host_port(peer) {
        Some(host) => host.to_string(),
        None => peer.trim().to_string(),
    }
}

/// Split `host:port` or `[host]:port`. Bare IPv6 literals do not split.
fn split_host_port(addr: &str) -> Option<&str> {
    if let Some(rest) = addr.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        return tail.strip_prefix(':').map(|_| host);
    }
    let (host, port) = addr.rsplit_once(':')?;
    if host.contains(':') || port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(host)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
