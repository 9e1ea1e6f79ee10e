// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Submission validator.
//!
//! Only `urgency` and `summary` are checked; every other field is optional
//! and passed through untouched.

use crate::config::IntakeConfig;
use crate::form::CanonicalForm;
use thiserror::Error;
use tracing::debug;

/// Validation error types. Messages are safe to return to the client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("summary too long")]
    SummaryTooLong,
}

/// Submission validator.
#[derive(Debug, Clone)]
pub struct SubmissionValidator {
    max_summary_len: usize,
}

impl SubmissionValidator {
    pub fn new(config: &IntakeConfig) -> Self {
        Self {
            max_summary_len: config.max_summary_len,
        }
    }

    /// Check required fields and the summary length.
    ///
    /// Length is counted in UTF-8 bytes, not characters.
    pub fn validate(&self, form: &CanonicalForm) -> Result<(), ValidationError> {
        if form.first("urgency").is_empty() {
            debug!("Missing urgency");
            return Err(ValidationError::MissingField("urgency"));
        }

        let summary = form.first("summary");
        if summary.is_empty() {
            debug!("Missing summary");
            return Err(ValidationError::MissingField("summary"));
        }
        if summary.len() > self.max_summary_len {
            debug!(len = summary.len(), max = self.max_summary_len, "Summary too long");
            return Err(ValidationError::SummaryTooLong);
        }

        Ok(())
    }
}
