// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Field-level request validation.
//!
//! A [`Validator`] collects one message per field so a handler can report
//! every bad input in a single 422 response instead of failing on the first.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

/// Collected validation failures, keyed by field name.
pub type ValidationErrors = BTreeMap<String, String>;

/// Accumulates validation failures for one request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    /// Create an empty validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `key` unless the field already has a failure.
    pub fn add_error(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(key.into())
            .or_insert_with(|| message.into());
    }

    /// Record `message` for `key` when `ok` is false.
    pub fn check(&mut self, ok: bool, key: impl Into<String>, message: impl Into<String>) {
        if !ok {
            self.add_error(key, message);
        }
    }

    /// True when no failure has been recorded.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn into_errors(self) -> ValidationErrors {
        self.errors
    }
}

/// True if `value` is one of `permitted`.
pub fn permitted_value<T, U>(value: &T, permitted: &[U]) -> bool
where
    T: PartialEq<U> + ?Sized,
{
    permitted.iter().any(|p| value == p)
}

/// True if every element of `values` is one of `permitted`.
pub fn permitted_values<T, U>(values: &[T], permitted: &[U]) -> bool
where
    T: PartialEq<U>,
{
    values.iter().all(|v| permitted_value(v, permitted))
}

/// True if `values` holds no duplicates.
pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|v| seen.insert(v))
}
