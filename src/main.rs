// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Tools API Service
//!
//! Serves fake invoice generation and HTML-to-PDF conversion behind a
//! per-client rate limiter.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:4000)
//! - `APP_ENV`: Environment name (default: development)
//! - `LIMITER_RPS`: Tokens added per second per client (default: 2)
//! - `LIMITER_BURST`: Maximum burst per client (default: 4)
//! - `LIMITER_ENABLED`: Enable rate limiting (default: true)
//! - `CORS_TRUSTED_ORIGINS`: Space separated trusted origins

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tools_api::{
    backend::Unconfigured,
    config::Config,
    handlers::AppState,
    limiter::RateLimiter,
    routes::routes,
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

    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        env = %config.env,
        limiter_rps = config.limiter.rps,
        limiter_burst = config.limiter.burst,
        limiter_enabled = config.limiter.enabled,
        cors = ?config.cors.trusted_origins,
        "Starting tools API"
    );

    let limiter = Arc::new(RateLimiter::new(config.limiter.clone()));
    let sweeper = limiter.spawn_sweeper();

    warn!("No invoice renderer or PDF converter configured; document routes will fail");
    let state = Arc::new(AppState {
        config: config.clone(),
        limiter,
        renderer: Arc::new(Unconfigured),
        converter: Arc::new(Unconfigured),
    });

    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        routes(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    sweeper.stop().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
