// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the tools API.
//!
//! Values are read once at startup and never change afterwards. Anything
//! that fails to parse falls back to its default.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the tools API service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:4000)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Deployment environment reported by the healthcheck (default: development)
    #[serde(default = "default_env")]
    pub env: String,

    /// Per-client rate limiting
    #[serde(default)]
    pub limiter: LimiterConfig,

    /// Cross-origin settings
    #[serde(default)]
    pub cors: CorsConfig,
}

/// Token bucket settings shared by every client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Tokens added per second (default: 2)
    #[serde(default = "default_rps")]
    pub rps: f64,

    /// Bucket capacity (default: 4)
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Turns the middleware into a pass-through when false (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Entries not seen for this long are evicted (default: 600)
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// How often the sweeper runs (default: 60)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

/// Cross-origin configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Exact origins, or `scheme://*.domain` patterns matching any subdomain
    #[serde(default)]
    pub trusted_origins: Vec<String>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:4000".to_string()
}

fn default_env() -> String {
    "development".to_string()
}

fn default_rps() -> f64 {
    2.0
}

fn default_burst() -> u32 {
    4
}

fn default_true() -> bool {
    true
}

fn default_idle_timeout_secs() -> u64 {
    600
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            env: default_env(),
            limiter: LimiterConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            rps: default_rps(),
            burst: default_burst(),
            enabled: default_true(),
            idle_timeout_secs: default_idle_timeout_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl LimiterConfig {
    /// Get the idle eviction threshold
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get the sweep interval
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `BIND_ADDR`: server bind address
    /// - `APP_ENV`: environment name
    /// - `LIMITER_RPS`, `LIMITER_BURST`, `LIMITER_ENABLED`: token bucket
    /// - `CORS_TRUSTED_ORIGINS`: space separated list of origins
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            env: lookup("APP_ENV").unwrap_or(defaults.env),
            limiter: LimiterConfig {
                rps: lookup("LIMITER_RPS")
                    .and_then(|v| v.parse().ok())
                    .filter(|rps: &f64| rps.is_finite() && *rps >= 0.0)
                    .unwrap_or(defaults.limiter.rps),
                burst: lookup("LIMITER_BURST")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.limiter.burst),
                enabled: lookup("LIMITER_ENABLED")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.limiter.enabled),
                ..defaults.limiter
            },
            cors: CorsConfig {
                trusted_origins: lookup("CORS_TRUSTED_ORIGINS")
                    .map(|v| v.split_whitespace().map(str::to_string).collect())
                    .unwrap_or(defaults.cors.trusted_origins),
            },
        }
    }
}
