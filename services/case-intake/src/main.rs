// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Case Intake Gateway Service
//!
//! Receives case submissions on `/submit` (and the legacy `/submib` alias),
//! throttles callers per address, validates and formats each case, and sends
//! it to every configured Telegram chat.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables (a `.env` file is read
//! first if present):
//!
//! - `BIND_ADDR` / `SERVER_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `RATE_LIMIT_RPS`: Token refill rate per address (default: 1)
//! - `RATE_LIMIT_BURST`: Bucket capacity per address (default: 5)
//! - `MAX_BODY_BYTES`: Body truncation limit (default: 262144)
//! - `GEOIP_DB_PATH`: MaxMind City database (optional)
//! - `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_IDS`: Delivery (required)
//! - `TELEGRAM_WEBHOOK_URL`, `TELEGRAM_WEBHOOK_SECRET`: Recipient discovery
//! - `METRICS_ENABLED`: Expose `/metrics` (default: true)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use case_intake::{
    config::Config,
    geo::GeoEnricher,
    handlers::{router, AppState},
    limiter::AdmissionController,
    notifier::TelegramNotifier,
    telegram,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::from_env()?;
    info!(
        bind_addr = %config.bind_addr,
        tokens_per_sec = config.rate_limit.tokens_per_sec,
        burst = config.rate_limit.burst,
        recipients = config.telegram.chat_ids.len(),
        "Starting case intake gateway"
    );

    let limiter = Arc::new(AdmissionController::new(&config.rate_limit)?);
    let geo = GeoEnricher::from_path(config.geoip.db_path.as_deref())?;
    let notifier = Arc::new(TelegramNotifier::new(&config.telegram)?);

    telegram::register_webhook(&config.telegram).await?;

    let state = Arc::new(AppState::new(config.clone(), limiter.clone(), geo, notifier)?);

    let shutdown = CancellationToken::new();
    let gauge_state = state.clone();
    let sweeper = limiter.spawn_sweeper(shutdown.clone(), move |remaining| {
        gauge_state.metrics.set_tracked_clients(remaining);
    });

    let app = router(state);

    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    tokio::spawn(shutdown_signal(shutdown.clone()));

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await?;

    shutdown.cancel();
    sweeper.await?;
    info!("Server stopped");

    Ok(())
}

/// Cancel `token` on Ctrl+C or SIGTERM.
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    token.cancel();
}
