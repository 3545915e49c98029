// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Typed accessors over URL query parameters.
//!
//! Every reader takes a default. Readers that can fail record the failure on
//! a [`Validator`] and hand back the default, so one pass over the query
//! string collects all parameter errors.

use crate::validator::Validator;
use axum::http::Uri;
use chrono::NaiveDate;
use std::str::FromStr;

const DATE_LAYOUT: &str = "%Y-%m-%d";

/// Decoded query parameters of a single request.
#[derive(Debug, Default, Clone)]
pub struct QueryReader {
    pairs: Vec<(String, String)>,
}

impl QueryReader {
    /// Decode a raw query string (without the leading `?`).
    pub fn parse(query: &str) -> Self {
        Self {
            pairs: url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    pub fn from_uri(uri: &Uri) -> Self {
        uri.query().map(Self::parse).unwrap_or_default()
    }

    /// First value for `key`, treating an empty value as absent.
    fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn read_string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// Split a comma-separated value. `default` is returned untouched when
    /// the key is absent or empty.
    pub fn read_csv(&self, key: &str, default: Vec<String>) -> Vec<String> {
        match self.get(key) {
            Some(s) => s.split(',').map(str::to_string).collect(),
            None => default,
        }
    }

    pub fn read_int(&self, key: &str, default: i32, v: &mut Validator) -> i32 {
        self.read_integer(key, default, v)
    }

    pub fn read_int64(&self, key: &str, default: i64, v: &mut Validator) -> i64 {
        self.read_integer(key, default, v)
    }

    fn read_integer<T: FromStr>(&self, key: &str, default: T, v: &mut Validator) -> T {
        let Some(s) = self.get(key) else {
            return default;
        };

        match s.parse() {
            Ok(n) => n,
            Err(_) => {
                v.add_error(key, "must be an integer");
                default
            }
        }
    }

    /// Parse a `YYYY-MM-DD` calendar date.
    pub fn read_date(&self, key: &str, default: NaiveDate, v: &mut Validator) -> NaiveDate {
        let Some(s) = self.get(key) else {
            return default;
        };

        match parse_date(s) {
            Some(date) => date,
            None => {
                v.add_error(key, "must be in format YYYY-MM-DD");
                default
            }
        }
    }
}

/// Strict layout: four-digit year, zero-padded month and day.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let b = s.as_bytes();
    let shaped = b.len() == 10
        && b[4] == b'-'
        && b[7] == b'-'
        && b
            .iter()
            .enumerate()
            .all(|(i, c)| i == 4 || i == 7 || c.is_ascii_digit());
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_LAYOUT).ok()
}
