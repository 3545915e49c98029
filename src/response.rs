// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! JSON response writing.

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::Response,
};
use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Value};
use std::collections::BTreeMap;

/// Top-level object wrapping every JSON response body.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Envelope(BTreeMap<String, Value>);

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member, replacing any previous value under `key`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }
}

/// Serialize `data` as tab-indented JSON with a trailing newline.
///
/// `headers` are applied before `Content-Type`, which is always
/// `application/json`. Nothing is built if serialization fails.
pub fn write_json<T>(
    status: StatusCode,
    data: &T,
    headers: HeaderMap,
) -> Result<Response, serde_json::Error>
where
    T: Serialize + ?Sized,
{
    let mut body = Vec::with_capacity(128);
    let mut ser = serde_json::Serializer::with_formatter(&mut body, PrettyFormatter::with_indent(b"\t"));
    data.serialize(&mut ser)?;
    body.push(b'\n');

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;

    let response_headers = response.headers_mut();
    response_headers.extend(headers);
    response_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    Ok(response)
}
