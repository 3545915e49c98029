// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Flood patterns for rate limiter testing.

use std::time::Duration;
use tools_api::config::LimiterConfig;

/// Flood pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of requests to send
    pub total_requests: usize,
    /// Aggregate request rate across all clients
    pub requests_per_second: f64,
    /// Number of client IPs the requests rotate through
    pub unique_ips: usize,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            requests_per_second: 10.0,
            unique_ips: 1,
        }
    }
}

/// Predefined flood patterns.
impl AttackConfig {
    /// Single IP flood - basic DoS from one client.
    pub fn single_ip_flood() -> Self {
        Self {
            total_requests: 200,
            requests_per_second: 100.0,
            unique_ips: 1,
        }
    }

    /// Distributed attack - many IPs, each one slow.
    pub fn distributed_attack() -> Self {
        Self {
            total_requests: 500,
            requests_per_second: 50.0,
            unique_ips: 100,
        }
    }

    /// Burst attack - everything at once from a handful of clients.
    pub fn burst_attack() -> Self {
        Self {
            total_requests: 50,
            requests_per_second: 5000.0,
            unique_ips: 2,
        }
    }

    /// Slow drip - one client staying just under the refill rate.
    pub fn slow_drip() -> Self {
        Self {
            total_requests: 40,
            requests_per_second: 1.9,
            unique_ips: 1,
        }
    }

    /// Gap between consecutive requests.
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.requests_per_second)
    }

    /// Time from the first request to the last.
    pub fn expected_duration(&self) -> Duration {
        self.interval()
            .mul_f64(self.total_requests.saturating_sub(1) as f64)
    }

    /// Upper bound on requests a correct limiter lets through.
    ///
    /// Each client starts with a full bucket and refills at `rps` for the
    /// length of the run.
    pub fn max_allowed(&self, limiter: &LimiterConfig) -> usize {
        let per_ip_requests = self.total_requests.div_ceil(self.unique_ips);
        let refilled = (limiter.rps * self.expected_duration().as_secs_f64()).ceil() as usize;
        let per_ip_allowed = per_ip_requests.min(limiter.burst as usize + refilled);
        per_ip_allowed * self.unique_ips
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_allowed_single_ip() {
        let limiter = LimiterConfig {
            rps: 2.0,
            burst: 4,
            ..Default::default()
        };
        let flood = AttackConfig::single_ip_flood();
        // 199 gaps of 10ms is 1.99s of refill.
        assert_eq!(flood.max_allowed(&limiter), 8);
    }

    #[test]
    fn test_max_allowed_capped_by_requests() {
        let limiter = LimiterConfig {
            rps: 2.0,
            burst: 4,
            ..Default::default()
        };
        let drip = AttackConfig::slow_drip();
        assert_eq!(drip.max_allowed(&limiter), drip.total_requests);
    }
}
