// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Strict JSON request body decoding.
//!
//! Bodies are capped at [`MAX_BODY_BYTES`], must hold exactly one JSON value,
//! and every decode failure is mapped onto [`JsonError`] so handlers can
//! return a targeted 400 message. Structs only decode from JSON objects, and
//! unknown keys are rejected unless [`DecodeOptions::deny_unknown_fields`]
//! is switched off.

mod strict;

use crate::errors::ApiError;
use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Request},
};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use strict::{Rules, Strict};
use thiserror::Error;
use tracing::debug;

/// Largest accepted request body (1 MiB).
pub const MAX_BODY_BYTES: usize = 1_048_576;

/// Client-facing JSON decode failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JsonError {
    #[error("body contains badly-formed JSON (at character {offset})")]
    Syntax { offset: usize },

    #[error("body contains badly-formed JSON")]
    Truncated,

    #[error("body must not be empty")]
    Empty,

    #[error("body contains incorrect JSON type for field {field:?}")]
    FieldType { field: String },

    #[error("body contains incorrect JSON type (at character {offset})")]
    Type { offset: usize },

    #[error("body contains unknown key {field:?}")]
    UnknownField { field: String },

    #[error("body must not be larger than {limit} bytes")]
    TooLarge { limit: usize },

    #[error("body must only contain a single JSON value")]
    MultipleValues,

    #[error("{0}")]
    Other(String),
}

/// Decoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Body size cap in bytes (default: 1 MiB)
    pub max_bytes: usize,
    /// Reject keys a struct does not declare (default: true)
    pub deny_unknown_fields: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_bytes: MAX_BODY_BYTES,
            deny_unknown_fields: true,
        }
    }
}

/// Read and decode a request body with the default options.
pub async fn read_json<T: DeserializeOwned>(body: Body) -> Result<T, JsonError> {
    read_json_with(body, DecodeOptions::default()).await
}

pub async fn read_json_limited<T: DeserializeOwned>(
    body: Body,
    limit: usize,
) -> Result<T, JsonError> {
    let options = DecodeOptions {
        max_bytes: limit,
        ..Default::default()
    };
    read_json_with(body, options).await
}

pub async fn read_json_with<T: DeserializeOwned>(
    body: Body,
    options: DecodeOptions,
) -> Result<T, JsonError> {
    let bytes = read_body(body, options.max_bytes).await?;
    decode_json_with(&bytes, options)
}

async fn read_body(body: Body, limit: usize) -> Result<Bytes, JsonError> {
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
            debug!(limit, "Request body over size cap");
            Err(JsonError::TooLarge { limit })
        }
        Err(err) => Err(JsonError::Other(err.to_string())),
    }
}

/// Decode exactly one JSON value from `body` with the default options.
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, JsonError> {
    decode_json_with(body, DecodeOptions::default())
}

pub fn decode_json_with<T: DeserializeOwned>(
    body: &[u8],
    options: DecodeOptions,
) -> Result<T, JsonError> {
    if body.iter().all(|b| is_json_whitespace(*b)) {
        return Err(JsonError::Empty);
    }

    let rules = Rules {
        deny_unknown_fields: options.deny_unknown_fields,
    };
    let mut de = serde_json::Deserializer::from_slice(body);
    let value = T::deserialize(Strict::new(&mut de, rules)).map_err(|err| classify(&err, body))?;

    // Anything but trailing whitespace is a second value or garbage.
    de.end().map_err(|_| JsonError::MultipleValues)?;

    Ok(value)
}

/// `deserialize_with` helper treating an explicit `null` like an absent
/// field. Pair it with `#[serde(default)]`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de> + Default,
{
    let value = <Option<T> as serde::Deserialize>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}

fn classify(err: &serde_json::Error, body: &[u8]) -> JsonError {
    match err.classify() {
        Category::Eof => JsonError::Truncated,
        Category::Syntax => JsonError::Syntax {
            offset: byte_offset(body, err.line(), err.column()),
        },
        Category::Data => {
            let message = err.to_string();
            if let Some(field) = unknown_field(&message) {
                return JsonError::UnknownField { field };
            }
            if message.starts_with("invalid type") || message.starts_with("invalid value") {
                let offset = byte_offset(body, err.line(), err.column());
                return match field_path_at(body, offset) {
                    Some(field) => JsonError::FieldType { field },
                    None => JsonError::Type { offset },
                };
            }
            JsonError::Other(message)
        }
        Category::Io => JsonError::Other(err.to_string()),
    }
}

fn is_json_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// serde_json reports `unknown field `name`, expected ...`.
fn unknown_field(message: &str) -> Option<String> {
    let rest = message.strip_prefix("unknown field `")?;
    let end = rest.find('`')?;
    Some(rest[..end].to_string())
}

/// Convert serde_json's one-based line and byte column into a byte offset.
fn byte_offset(body: &[u8], line: usize, column: usize) -> usize {
    let line_start = if line <= 1 {
        0
    } else {
        body.iter()
            .enumerate()
            .filter(|(_, b)| **b == b'\n')
            .nth(line - 2)
            .map(|(i, _)| i + 1)
            .unwrap_or(body.len())
    };
    (line_start + column).min(body.len())
}

enum Frame {
    Object { key: Option<String>, expecting_key: bool },
    Array,
}

/// Dotted path of object keys enclosing byte `offset`, e.g. `address.zip`.
/// Array levels contribute nothing to the path.
fn field_path_at(body: &[u8], offset: usize) -> Option<String> {
    let input = &body[..offset.min(body.len())];
    let mut stack: Vec<Frame> = Vec::new();
    let mut i = 0;

    while i < input.len() {
        match input[i] {
            b'"' => {
                let (text, next) = scan_string(input, i + 1);
                if let Some(Frame::Object { key, expecting_key }) = stack.last_mut() {
                    if *expecting_key {
                        *key = Some(text);
                        *expecting_key = false;
                    }
                }
                i = next;
                continue;
            }
            b'{' => stack.push(Frame::Object {
                key: None,
                expecting_key: true,
            }),
            b'[' => stack.push(Frame::Array),
            b'}' | b']' => {
                stack.pop();
            }
            b',' => {
                if let Some(Frame::Object { key, expecting_key }) = stack.last_mut() {
                    *key = None;
                    *expecting_key = true;
                }
            }
            _ => {}
        }
        i += 1;
    }

    let path: Vec<&str> = stack
        .iter()
        .filter_map(|frame| match frame {
            Frame::Object { key, .. } => key.as_deref(),
            Frame::Array => None,
        })
        .collect();

    if path.is_empty() {
        None
    } else {
        Some(path.join("."))
    }
}

/// Scan a string body starting just after its opening quote. Returns the
/// unescaped text and the index after the closing quote.
fn scan_string(input: &[u8], start: usize) -> (String, usize) {
    let mut out = Vec::new();
    let mut i = start;
    while i < input.len() {
        match input[i] {
            b'"' => return (String::from_utf8_lossy(&out).into_owned(), i + 1),
            b'\\' if i + 1 < input.len() => {
                let escaped = input[i + 1];
                out.push(match escaped {
                    b'n' => b'\n',
                    b't' => b'\t',
                    b'r' => b'\r',
                    b'b' => 0x08,
                    b'f' => 0x0c,
                    other => other,
                });
                i += 2;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    (String::from_utf8_lossy(&out).into_owned(), input.len())
}

/// Request extractor that decodes the body with [`read_json`].
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        let value = read_json(req.into_body()).await?;
        Ok(Self(value))
    }
}
