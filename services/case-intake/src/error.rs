// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Request-boundary errors for the submission endpoint.

use crate::metrics::Outcome;
use crate::normalizer::MalformedBody;
use crate::notifier::NotifyError;
use crate::validator::ValidationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Every way a submission can fail. All of them end the request; none of
/// them affect the process.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("malformed body: {0}")]
    MalformedBody(#[from] MalformedBody),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("dispatch failed: {0}")]
    DispatchFailure(#[from] NotifyError),
}

impl IntakeError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::MalformedBody(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::DispatchFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self {
            Self::MethodNotAllowed => Outcome::MethodNotAllowed,
            Self::RateLimited => Outcome::RateLimited,
            Self::MalformedBody(_) => Outcome::Malformed,
            Self::Validation(_) => Outcome::Invalid,
            Self::DispatchFailure(_) => Outcome::DispatchFailed,
        }
    }

    /// Text returned to the client. Parser and transport details stay in
    /// the logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::MalformedBody(_) => "bad request".to_string(),
            Self::DispatchFailure(_) => "failed to send".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}
