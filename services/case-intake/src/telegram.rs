// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Telegram recipient discovery.
//!
//! Operators message the bot with `/myid`; the webhook logs the chat id so it
//! can be added to `TELEGRAM_CHAT_IDS`. Nothing here feeds the intake path.

use crate::config::TelegramConfig;
use crate::handlers::{read_body, AppState};
use anyhow::{anyhow, Context};
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

#[derive(Debug, Deserialize)]
struct Update {
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    text: String,
    #[serde(default)]
    chat: Option<Chat>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Serialize)]
struct SetWebhook<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_token: Option<&'a str>,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
}

/// Bot webhook. Logs the chat id of any `/myid` message.
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Body,
) -> Response {
    if let Some(secret) = state.config.telegram.webhook_secret.as_deref() {
        let presented = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if presented != Some(secret) {
            debug!("webhook secret mismatch");
            return (StatusCode::UNAUTHORIZED, "unauthorized").into_response();
        }
    }

    let raw = match read_body(&state, body).await {
        Ok(raw) => raw,
        Err(err) => {
            debug!(error = %err, "telegram update unreadable");
            return (StatusCode::BAD_REQUEST, "bad request").into_response();
        }
    };
    // `null` and partial updates are acknowledged and ignored.
    let update: Option<Update> = match serde_json::from_slice(&raw) {
        Ok(update) => update,
        Err(err) => {
            debug!(error = %err, "invalid telegram update");
            return (StatusCode::BAD_REQUEST, "bad request").into_response();
        }
    };

    if let Some(message) = update.and_then(|u| u.message) {
        if message.text.trim().starts_with("/myid") {
            match message.chat {
                Some(chat) => info!(chat_id = chat.id, "telegram chat id"),
                None => debug!("/myid without chat"),
            }
        }
    }

    StatusCode::OK.into_response()
}

/// Point the bot's webhook at `config.webhook_url`.
pub async fn register_webhook(config: &TelegramConfig) -> anyhow::Result<()> {
    let Some(url) = config.webhook_url.as_deref() else {
        return Ok(());
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    let endpoint = format!(
        "{}/bot{}/setWebhook",
        config.api_base.trim_end_matches('/'),
        config.bot_token
    );

    let response = client
        .post(&endpoint)
        .json(&SetWebhook {
            url,
            secret_token: config.webhook_secret.as_deref(),
        })
        .send()
        .await
        .context("setWebhook request failed")?;

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        let body = response.text().await.unwrap_or_default();
        return Err(anyhow!("setWebhook error: status={} body={}", status.as_u16(), body));
    }

    let result: ApiResponse = response.json().await.context("setWebhook response")?;
    if !result.ok {
        return Err(anyhow!("setWebhook response not ok"));
    }

    info!(url = %url, "telegram webhook registered");
    Ok(())
}
