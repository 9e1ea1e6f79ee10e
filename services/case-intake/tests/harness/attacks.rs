// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Attack simulation patterns for security testing.

use std::time::Duration;

/// What each simulated request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// A well-formed case
    Valid,
    /// Bodies the normalizer must reject
    Malformed,
    /// Well-formed bodies that fail validation
    Incomplete,
}

/// Attack pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of requests to send
    pub total_requests: usize,
    /// Requests per second rate
    pub requests_per_second: f64,
    /// Number of unique peer addresses to simulate
    pub unique_peers: usize,
    /// Rotate a forged X-Forwarded-For on every request
    pub spoof_forwarded: bool,
    pub payload: Payload,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            requests_per_second: 10.0,
            unique_peers: 1,
            spoof_forwarded: false,
            payload: Payload::Valid,
        }
    }
}

/// Predefined attack patterns.
impl AttackConfig {
    /// Single address flood.
    pub fn single_ip_flood() -> Self {
        Self {
            total_requests: 200,
            requests_per_second: 100.0,
            ..Default::default()
        }
    }

    /// Many addresses, a handful of requests each.
    pub fn distributed_attack() -> Self {
        Self {
            total_requests: 500,
            requests_per_second: 50.0,
            unique_peers: 100,
            ..Default::default()
        }
    }

    /// One peer forging a fresh forwarded address per request.
    pub fn forwarded_header_rotation() -> Self {
        Self {
            total_requests: 100,
            requests_per_second: 100.0,
            spoof_forwarded: true,
            ..Default::default()
        }
    }

    /// Garbage bodies from one address.
    pub fn malformed_flood() -> Self {
        Self {
            total_requests: 50,
            requests_per_second: 50.0,
            payload: Payload::Malformed,
            ..Default::default()
        }
    }

    /// Valid encodings with required fields missing, spread over addresses.
    pub fn incomplete_cases() -> Self {
        Self {
            total_requests: 50,
            requests_per_second: 10.0,
            unique_peers: 10,
            payload: Payload::Incomplete,
            ..Default::default()
        }
    }

    /// Under the refill rate.
    pub fn slow_drip() -> Self {
        Self {
            total_requests: 20,
            requests_per_second: 0.5,
            ..Default::default()
        }
    }

    /// Pause between consecutive requests.
    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.requests_per_second)
    }
}
