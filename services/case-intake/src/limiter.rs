// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Per-address admission control.
//!
//! Every source address gets a token bucket that refills at a shared rate up
//! to a shared burst capacity. Entries that stay idle longer than the client
//! TTL are dropped by a periodic sweep.

use crate::config::{ConfigError, RateLimitConfig};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Token bucket for a single address.
#[derive(Debug)]
struct TokenBucket {
    /// Available tokens, always within `[0, capacity]`
    tokens: f64,
    /// Last time tokens were refilled
    last_refill: Instant,
}

impl TokenBucket {
    fn full(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_refill: now,
        }
    }

    /// Refill by elapsed time, then try to take one token.
    fn try_consume(&mut self, rate: f64, capacity: f64, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * rate).min(capacity);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[derive(Debug)]
struct ClientEntry {
    bucket: TokenBucket,
    last_seen: Instant,
}

/// Thread-safe per-address throttle.
///
/// A single lock guards both the registry and the bucket arithmetic, so the
/// refill-and-decrement sequence for one address is never interleaved with
/// another caller or with the sweep.
pub struct AdmissionController {
    rate: f64,
    burst: f64,
    ttl: Duration,
    sweep_interval: Duration,
    clients: Mutex<HashMap<String, ClientEntry>>,
}

impl AdmissionController {
    /// Create a controller. Fails if the rate or burst is not positive.
    pub fn new(config: &RateLimitConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            rate: config.tokens_per_sec,
            burst: f64::from(config.burst),
            ttl: config.client_ttl(),
            sweep_interval: config.sweep_interval(),
            clients: Mutex::new(HashMap::new()),
        })
    }

    /// Take one token for `address`, creating its entry on first contact.
    pub async fn allow(&self, address: &str) -> bool {
        let now = Instant::now();
        let mut clients = self.clients.lock().await;

        let entry = clients
            .entry(address.to_string())
            .or_insert_with(|| ClientEntry {
                bucket: TokenBucket::full(self.burst, now),
                last_seen: now,
            });
        entry.last_seen = now;

        let allowed = entry.bucket.try_consume(self.rate, self.burst, now);
        if !allowed {
            debug!(ip = %address, "admission denied");
        }
        allowed
    }

    /// Remove entries idle for longer than the TTL. Returns the number of
    /// entries still tracked.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut clients = self.clients.lock().await;
        let before = clients.len();
        clients.retain(|_, entry| now.saturating_duration_since(entry.last_seen) <= self.ttl);
        let evicted = before - clients.len();
        if evicted > 0 {
            debug!(evicted, remaining = clients.len(), "evicted idle clients");
        }
        clients.len()
    }

    /// Number of tracked addresses.
    pub async fn tracked(&self) -> usize {
        self.clients.lock().await.len()
    }

    /// Run the eviction sweep on a fixed interval until `shutdown` fires.
    ///
    /// `on_sweep` receives the number of entries remaining after each pass.
    pub fn spawn_sweeper<F>(self: Arc<Self>, shutdown: CancellationToken, on_sweep: F) -> JoinHandle<()>
    where
        F: Fn(usize) + Send + 'static,
    {
        tokio::spawn(async move {
            let period = self.sweep_interval;
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        info!("client sweep stopped");
                        return;
                    }
                    _ = interval.tick() => {
                        let remaining = self.sweep().await;
                        on_sweep(remaining);
                    }
                }
            }
        })
    }
}
