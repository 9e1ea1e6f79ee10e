// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for the intake path.

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// How a submission request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Preflight,
    MethodNotAllowed,
    RateLimited,
    Malformed,
    Invalid,
    DispatchFailed,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Preflight => "preflight",
            Self::MethodNotAllowed => "method_not_allowed",
            Self::RateLimited => "rate_limited",
            Self::Malformed => "malformed",
            Self::Invalid => "invalid",
            Self::DispatchFailed => "dispatch_failed",
        }
    }
}

/// Metrics registry owned by the service.
pub struct IntakeMetrics {
    registry: Registry,
    requests: IntCounterVec,
    tracked_clients: IntGauge,
}

impl IntakeMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("intake_requests_total", "Submission requests by outcome"),
            &["outcome"],
        )?;
        let tracked_clients = IntGauge::new(
            "intake_tracked_clients",
            "Source addresses currently tracked by admission control",
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(tracked_clients.clone()))?;

        Ok(Self {
            registry,
            requests,
            tracked_clients,
        })
    }

    pub fn record(&self, outcome: Outcome) {
        self.requests.with_label_values(&[outcome.as_str()]).inc();
    }

    pub fn count(&self, outcome: Outcome) -> u64 {
        self.requests.with_label_values(&[outcome.as_str()]).get()
    }

    pub fn set_tracked_clients(&self, count: usize) {
        self.tracked_clients.set(count as i64);
    }

    /// Render in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
