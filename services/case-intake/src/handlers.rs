// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the case intake service.
//!
//! A submission moves through admission control, body normalization,
//! validation and enrichment before being handed to the notifier exactly
//! once. Failures at any stage end the request with a plain-text reason.

use crate::config::Config;
use crate::error::IntakeError;
use crate::form::CanonicalForm;
use crate::formatter::format_message;
use crate::geo::GeoEnricher;
use crate::limiter::AdmissionController;
use crate::metrics::{IntakeMetrics, Outcome};
use crate::normalizer::{self, BodyEncoding, BodyNormalizer, MalformedBody};
use crate::notifier::Notifier;
use crate::origin;
use crate::telegram;
use crate::validator::SubmissionValidator;
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Json, Router,
};
use futures_util::StreamExt;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// Subject line of every dispatched case.
pub const SUBJECT: &str = "new case";

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub limiter: Arc<AdmissionController>,
    pub normalizer: BodyNormalizer,
    pub validator: SubmissionValidator,
    pub geo: GeoEnricher,
    pub notifier: Arc<dyn Notifier>,
    pub metrics: IntakeMetrics,
}

impl AppState {
    pub fn new(
        config: Config,
        limiter: Arc<AdmissionController>,
        geo: GeoEnricher,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, prometheus::Error> {
        Ok(Self {
            normalizer: BodyNormalizer::new(config.intake.max_body_bytes),
            validator: SubmissionValidator::new(&config.intake),
            metrics: IntakeMetrics::new()?,
            config,
            limiter,
            geo,
            notifier,
        })
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/submit", any(submit))
        .route("/submib", any(submit))
        .route("/telegram/webhook", post(telegram::webhook))
        .route("/health", get(health))
        .route("/healthz", get(health));

    if state.config.metrics.enabled {
        router = router.route(&state.config.metrics.path, get(scrape));
    }

    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "case-intake",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus scrape endpoint.
pub async fn scrape(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Case submission endpoint.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let outcome = process_submission(&state, peer, &method, &uri, &headers, body).await;
    match outcome {
        Ok(response) => response,
        Err(err) => {
            state.metrics.record(err.outcome());
            err.into_response()
        }
    }
}

async fn process_submission(
    state: &AppState,
    peer: SocketAddr,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: Body,
) -> Result<Response, IntakeError> {
    if *method == Method::OPTIONS {
        state.metrics.record(Outcome::Preflight);
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    if *method != Method::POST {
        info!(method = %method, path = %uri.path(), "Rejected method");
        return Err(IntakeError::MethodNotAllowed);
    }

    let peer = peer.to_string();
    let client = origin::peer_host(&peer);
    if !state.limiter.allow(&client).await {
        info!(ip = %client, "Request rate limited");
        return Err(IntakeError::RateLimited);
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let raw = read_body(state, body)
        .await
        .inspect_err(|err| info!(ip = %client, error = %err, "Body read failed"))?;

    // Query parameters count as form fields, except for JSON bodies.
    let query: Option<CanonicalForm> = match BodyEncoding::from_content_type(content_type) {
        BodyEncoding::Json => None,
        _ => uri
            .query()
            .map(|q| normalizer::decode_urlencoded(q.as_bytes()))
            .transpose()
            .inspect_err(|err| info!(ip = %client, error = %err, "Malformed query"))?,
    };

    let form = state
        .normalizer
        .normalize(content_type, &raw, query)
        .inspect_err(|err| info!(ip = %client, error = %err, "Malformed body"))?;

    state
        .validator
        .validate(&form)
        .inspect_err(|err| info!(ip = %client, error = %err, "Validation failed"))?;

    let requester = origin::resolve(headers, &peer);
    let location = if requester.is_empty() {
        None
    } else {
        state.geo.lookup(&requester)
    };
    let message = format_message(&form, &requester, location.as_ref());

    if let Err(err) = state.notifier.send(SUBJECT, &message).await {
        error!(ip = %client, error = %err, "Failed to send message");
        return Err(err.into());
    }

    debug!(ip = %client, requester = %requester, "Case dispatched");
    state.metrics.record(Outcome::Accepted);
    Ok((StatusCode::OK, "ok").into_response())
}

/// Read the capped body, giving up after the intake request timeout.
///
/// Only the read is bounded. Dispatch runs to completion so every request
/// ends in a definite outcome.
pub async fn read_body(state: &AppState, body: Body) -> Result<Vec<u8>, MalformedBody> {
    let limit = state.normalizer.max_body_bytes();
    tokio::time::timeout(state.config.intake.request_timeout(), read_capped(body, limit))
        .await
        .map_err(|_| MalformedBody::ReadTimeout)
}

/// Read at most `limit` bytes of `body`, dropping the rest.
///
/// A body that fails mid-stream yields whatever arrived before the failure.
pub async fn read_capped(body: Body, limit: usize) -> Vec<u8> {
    let mut stream = body.into_data_stream();
    let mut buf = Vec::new();

    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(chunk) => {
                let room = limit - buf.len();
                buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
                if buf.len() >= limit {
                    break;
                }
            }
            Err(err) => {
                debug!(error = %err, "Body read interrupted");
                break;
            }
        }
    }

    buf
}
