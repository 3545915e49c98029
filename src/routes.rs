// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Router assembly.

use crate::config::CorsConfig;
use crate::errors::not_found;
use crate::handlers::{convert_html, create_fake_invoice, healthcheck, method_not_allowed, AppState};
use crate::limiter::rate_limit;
use axum::{
    http::{header, request::Parts, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the application router.
///
/// Layers run outermost first: tracing, CORS, then rate limiting, so
/// preflight requests are traced but never spend tokens.
pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/v1/healthcheck",
            get(healthcheck).fallback(method_not_allowed),
        )
        .route(
            "/v1/invoices/fake",
            get(create_fake_invoice).fallback(method_not_allowed),
        )
        .route(
            "/v1/convert/html",
            post(convert_html).fallback(method_not_allowed),
        )
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors))
                .layer(middleware::from_fn_with_state(
                    Arc::clone(&state.limiter),
                    rate_limit,
                )),
        )
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let trusted = config.trusted_origins.clone();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .map(|origin| trusted.iter().any(|pattern| origin_matches(pattern, origin)))
                    .unwrap_or(false)
            },
        ))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Exact match, or `scheme://*.domain` matching any subdomain of `domain`.
fn origin_matches(pattern: &str, origin: &str) -> bool {
    if pattern == origin {
        return true;
    }

    let Some((scheme, host_pattern)) = pattern.split_once("://") else {
        return false;
    };
    let Some(domain) = host_pattern.strip_prefix("*.") else {
        return false;
    };
    let Some(host) = origin
        .strip_prefix(scheme)
        .and_then(|rest| rest.strip_prefix("://"))
    else {
        return false;
    };

    host.strip_suffix(domain)
        .and_then(|sub| sub.strip_suffix('.'))
        .is_some_and(|sub| !sub.is_empty())
}
