// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outbound notification delivery.

use crate::config::TelegramConfig;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Delivery failures. Details are for logs, not for clients.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("telegram error: status={status} body={body}")]
    Rejected { status: u16, body: String },
}

/// Something that can deliver a message to every configured recipient.
///
/// A call either succeeds for all recipients or returns the first failure.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError>;
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Telegram Bot API delivery to a fixed list of chats.
pub struct TelegramNotifier {
    client: reqwest::Client,
    send_url: String,
    chat_ids: Vec<String>,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            send_url: format!(
                "{}/bot{}/sendMessage",
                config.api_base.trim_end_matches('/'),
                config.bot_token
            ),
            chat_ids: config.chat_ids.clone(),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    /// Send to each chat in order, stopping at the first failure.
    async fn send(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let text = format!("{subject}\n\n{body}");

        for chat_id in &self.chat_ids {
            let response = self
                .client
                .post(&self.send_url)
                .json(&SendMessage {
                    chat_id,
                    text: &text,
                })
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if status.is_client_error() || status.is_server_error() {
                return Err(NotifyError::Rejected {
                    status: status.as_u16(),
                    body,
                });
            }
            debug!(chat_id = %chat_id, "message delivered");
        }

        Ok(())
    }
}
