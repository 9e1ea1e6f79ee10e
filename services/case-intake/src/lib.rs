// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Case Intake Gateway
//!
//! Accepts untrusted case submissions over HTTP and forwards them to a list
//! of Telegram chats:
//!
//! - Per-address token-bucket admission control with idle eviction
//! - JSON, form-encoded and plain label/value bodies
//! - Required-field and summary-length validation
//! - Optional MaxMind geo enrichment of the requester address
//! - Ordered fan-out to every recipient, at most once

pub mod config;
pub mod error;
pub mod form;
pub mod formatter;
pub mod geo;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod normalizer;
pub mod notifier;
pub mod origin;
pub mod telegram;
pub mod validator;

pub use config::Config;
pub use error::IntakeError;
pub use form::CanonicalForm;
pub use geo::{GeoEnricher, Location, LocationSource};
pub use limiter::AdmissionController;
pub use notifier::{Notifier, NotifyError, TelegramNotifier};
