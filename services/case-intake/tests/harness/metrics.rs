// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Metrics collection for attack simulation results.

use axum::http::StatusCode;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Collects metrics during attack simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    start_time: Option<Instant>,
    end_time: Option<Instant>,
    outcomes: HashMap<Outcome, usize>,
    requests_per_peer: HashMap<String, usize>,
    /// Latency samples (microseconds)
    latencies: Vec<u64>,
}

/// How the gateway answered a simulated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Accepted,
    RateLimited,
    Rejected,
    Failed,
}

impl Outcome {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::OK => Self::Accepted,
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            StatusCode::BAD_REQUEST => Self::Rejected,
            _ => Self::Failed,
        }
    }
}

impl AttackMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn finish(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Record a request outcome.
    pub fn record(&mut self, outcome: Outcome, peer: &str, latency: Duration) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        *self.requests_per_peer.entry(peer.to_string()).or_insert(0) += 1;
        self.latencies.push(latency.as_micros() as u64);
    }

    pub fn total_requests(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn duration(&self) -> Duration {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }

    /// Ratio of non-accepted to total.
    pub fn block_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        (total - self.count(Outcome::Accepted)) as f64 / total as f64
    }

    pub fn median_latency_us(&self) -> u64 {
        if self.latencies.is_empty() {
            return 0;
        }
        let mut sorted = self.latencies.clone();
        sorted.sort_unstable();
        sorted[sorted.len() / 2]
    }

    pub fn unique_peers(&self) -> usize {
        self.requests_per_peer.len()
    }

    /// Generate a summary report.
    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            total_requests: self.total_requests(),
            accepted: self.count(Outcome::Accepted),
            rate_limited: self.count(Outcome::RateLimited),
            rejected: self.count(Outcome::Rejected),
            failed: self.count(Outcome::Failed),
            duration_ms: self.duration().as_millis() as u64,
            block_rate: self.block_rate(),
            median_latency_us: self.median_latency_us(),
            unique_peers: self.unique_peers(),
        }
    }
}

/// Summary report of attack metrics.
#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub total_requests: usize,
    pub accepted: usize,
    pub rate_limited: usize,
    pub rejected: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub block_rate: f64,
    pub median_latency_us: u64,
    pub unique_peers: usize,
}

impl std::fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Attack Metrics Report ===")?;
        writeln!(f, "Duration:          {} ms", self.duration_ms)?;
        writeln!(f, "Total Requests:    {}", self.total_requests)?;
        writeln!(f)?;
        writeln!(f, "--- Outcomes ---")?;
        writeln!(f, "Accepted:          {}", self.accepted)?;
        writeln!(f, "Rate Limited:      {}", self.rate_limited)?;
        writeln!(f, "Rejected (400):    {}", self.rejected)?;
        writeln!(f, "Failed:            {}", self.failed)?;
        writeln!(f, "Block Rate:        {:.1}%", self.block_rate * 100.0)?;
        writeln!(f)?;
        writeln!(f, "Median latency:    {} us", self.median_latency_us)?;
        writeln!(f, "Unique peers:      {}", self.unique_peers)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_rate() {
        let mut metrics = AttackMetrics::new();
        for _ in 0..3 {
            metrics.record(Outcome::Accepted, "10.0.0.1", Duration::ZERO);
        }
        for _ in 0..7 {
            metrics.record(Outcome::RateLimited, "10.0.0.1", Duration::ZERO);
        }

        assert_eq!(metrics.total_requests(), 10);
        assert_eq!(metrics.unique_peers(), 1);
        assert!((metrics.block_rate() - 0.7).abs() < 0.01);
    }

    #[test]
    fn test_outcome_from_status() {
        assert_eq!(Outcome::from_status(StatusCode::OK), Outcome::Accepted);
        assert_eq!(Outcome::from_status(StatusCode::TOO_MANY_REQUESTS), Outcome::RateLimited);
        assert_eq!(Outcome::from_status(StatusCode::BAD_REQUEST), Outcome::Rejected);
        assert_eq!(Outcome::from_status(StatusCode::INTERNAL_SERVER_ERROR), Outcome::Failed);
    }
}
