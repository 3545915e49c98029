// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Per-client token bucket rate limiting.
//!
//! Every client IP gets its own bucket that refills continuously at
//! `rps` tokens per second up to `burst`. The registry lives behind a single
//! lock; lookup, creation, consumption and eviction all happen inside one
//! critical section, so two requests from the same client can never spend
//! the same token and the sweep never removes an entry that is being used.

use crate::config::LimiterConfig;
use crate::errors::ApiError;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Result of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Whole tokens left in the bucket
        remaining: u32,
    },
    /// Request is rate limited
    Limited {
        /// Time until the next token is available
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Token bucket for rate limiting.
#[derive(Debug)]
struct TokenBucket {
    /// Available tokens
    tokens: f64,
    /// Maximum tokens (bucket capacity)
    burst: f64,
    /// Token refill rate per second
    rate: f64,
    /// Last time tokens were refilled
    last_refill: Instant,
}

impl TokenBucket {
    fn new(rate: f64, burst: u32, now: Instant) -> Self {
        let burst = f64::from(burst);
        Self {
            tokens: burst,
            burst,
            rate,
            last_refill: now,
        }
    }

    /// Refill tokens based on elapsed time.
    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.burst);
        self.last_refill = now;
    }

    /// Try to consume a token. Returns true if successful.
    fn try_consume(&mut self, now: Instant) -> bool {
        self.refill(now);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn remaining(&self) -> u32 {
        self.tokens.floor() as u32
    }

    /// Get time until a token is available.
    fn time_until_available(&self) -> Duration {
        if self.tokens >= 1.0 {
            Duration::ZERO
        } else if self.rate > 0.0 && self.burst >= 1.0 {
            Duration::try_from_secs_f64((1.0 - self.tokens) / self.rate).unwrap_or(Duration::MAX)
        } else {
            Duration::MAX
        }
    }
}

#[derive(Debug)]
struct ClientEntry {
    bucket: TokenBucket,
    last_seen: Instant,
}

/// Thread-safe per-client rate limiter.
///
/// Build one at startup, share it through an `Arc`, and pass it to the
/// [`rate_limit`] middleware.
#[derive(Debug)]
pub struct RateLimiter {
    config: LimiterConfig,
    clients: RwLock<HashMap<IpAddr, ClientEntry>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: LimiterConfig) -> Self {
        Self {
            config,
            clients: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &LimiterConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Spend one token for `ip`, creating its bucket on first sight.
    ///
    /// A disabled limiter admits everything and tracks nothing.
    pub async fn check(&self, ip: IpAddr) -> RateLimitResult {
        if !self.config.enabled {
            return RateLimitResult::Allowed {
                remaining: self.config.burst,
            };
        }

        let now = Instant::now();
        let mut clients = self.clients.write().await;
        let entry = clients.entry(ip).or_insert_with(|| ClientEntry {
            bucket: TokenBucket::new(self.config.rps, self.config.burst, now),
            last_seen: now,
        });

        if entry.bucket.try_consume(now) {
            entry.last_seen = now;
            RateLimitResult::Allowed {
                remaining: entry.bucket.remaining(),
            }
        } else {
            let retry_after = entry.bucket.time_until_available();
            debug!(%ip, ?retry_after, "Client rate limit exceeded");
            RateLimitResult::Limited { retry_after }
        }
    }

    /// Drop clients idle for longer than the configured timeout. Returns the
    /// number of evicted entries.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let idle_timeout = self.config.idle_timeout();

        let mut clients = self.clients.write().await;
        let before = clients.len();
        clients.retain(|_, entry| now.saturating_duration_since(entry.last_seen) <= idle_timeout);
        let evicted = before - clients.len();

        if evicted > 0 {
            info!(evicted, tracked = clients.len(), "Evicted idle rate limit entries");
        }
        evicted
    }

    /// Number of clients currently tracked.
    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Run [`sweep`](Self::sweep) every `sweep_interval` until the returned
    /// handle is stopped.
    pub fn spawn_sweeper(self: &Arc<Self>) -> SweeperHandle {
        let limiter = Arc::clone(self);
        let period = self.config.sweep_interval().max(Duration::from_secs(1));
        let (shutdown, mut stopped) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = &mut stopped => break,
                    _ = interval.tick() => {
                        limiter.sweep().await;
                    }
                }
            }
            debug!("Rate limit sweeper stopped");
        });

        SweeperHandle { shutdown, task }
    }
}

/// Owns the background sweep task.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signal the sweeper and wait for it to exit.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(err) = self.task.await {
            warn!(error = %err, "Rate limit sweeper ended abnormally");
        }
    }
}

/// Milliseconds in `d`, saturating for the unbounded wait of a zero rate.
fn whole_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Middleware admitting or rejecting requests by client IP.
pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    if !limiter.is_enabled() {
        return next.run(request).await;
    }

    let Some(ConnectInfo(addr)) = connect_info else {
        return ApiError::server("remote address unavailable for rate limiting").into_response();
    };

    match limiter.check(addr.ip()).await {
        RateLimitResult::Allowed { .. } => next.run(request).await,
        RateLimitResult::Limited { retry_after } => {
            warn!(
                ip = %addr.ip(),
                path = %request.uri().path(),
                retry_after_ms = whole_millis(retry_after),
                "Request rate limited"
            );
            ApiError::RateLimited { retry_after }.into_response()
        }
    }
}
