// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Tools API
//!
//! A small HTTP API for generating and converting invoice documents. This
//! crate holds its request-handling toolkit:
//!
//! - Field-level validation that collects every failure per request
//! - Typed query-string readers with defaults
//! - Strict JSON body decoding with a stable error taxonomy
//! - Pretty JSON responses and centralized error responders
//! - Per-client token bucket rate limiting with idle eviction

pub mod backend;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod json;
pub mod limiter;
pub mod query;
pub mod response;
pub mod routes;
pub mod validator;

pub use config::Config;
pub use errors::ApiError;
pub use json::{read_json, DecodeOptions, JsonBody, JsonError};
pub use limiter::{RateLimitResult, RateLimiter};
pub use response::{write_json, Envelope};
pub use validator::Validator;
