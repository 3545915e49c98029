// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Centralized error responses.
//!
//! Every failure a handler can produce ends up as an [`ApiError`], rendered
//! as `{"error": ...}` with the matching status code.

use crate::json::JsonError;
use crate::response::{write_json, Envelope};
use crate::validator::ValidationErrors;
use axum::{
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";

/// Application error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("request failed validation")]
    FailedValidation(ValidationErrors),

    #[error("rate limit exceeded")]
    RateLimited { retry_after: Duration },

    #[error("the requested resource could not be found")]
    NotFound,

    #[error("the {0} method is not supported for this resource")]
    MethodNotAllowed(Method),

    /// Detail is logged, never sent to the client.
    #[error("internal error: {0}")]
    Server(String),
}

impl From<JsonError> for ApiError {
    fn from(err: JsonError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl ApiError {
    pub fn server(err: impl std::fmt::Display) -> Self {
        Self::Server(err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::FailedValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::FailedValidation(errors) => Value::from_iter(
                errors
                    .iter()
                    .map(|(field, message)| (field.clone(), Value::from(message.as_str()))),
            ),
            Self::Server(_) => Value::from(SERVER_ERROR_MESSAGE),
            other => Value::from(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut headers = HeaderMap::new();

        match &self {
            Self::Server(detail) => error!(%status, error = %detail, "Server error"),
            Self::RateLimited { retry_after } => {
                // Round up so clients never retry early.
                let secs = retry_after
                    .as_secs()
                    .saturating_add(u64::from(retry_after.subsec_nanos() > 0));
                headers.insert(header::RETRY_AFTER, HeaderValue::from(secs));
            }
            _ => {}
        }

        let envelope = Envelope::new().with("error", self.body());
        match write_json(status, &envelope, headers) {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, "Failed to serialize error response");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Fallback for unmatched routes.
pub async fn not_found(uri: Uri) -> ApiError {
    warn!(path = %uri.path(), "No route matched");
    ApiError::NotFound
}
