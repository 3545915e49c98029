// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for abuse simulation against the tools API.
//!
//! Drives the rate limiter with flood patterns and feeds hostile input to
//! the request decoders.

pub mod attacks;
pub mod generators;
pub mod metrics;
