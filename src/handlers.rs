// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the tools API.

use crate::backend::{ConvertOptions, InvoiceOptions, InvoiceRenderer, PdfConverter};
use crate::config::Config;
use crate::errors::ApiError;
use crate::json::{null_as_default, JsonBody};
use crate::limiter::RateLimiter;
use crate::query::QueryReader;
use crate::response::{write_json, Envelope};
use crate::validator::{permitted_value, permitted_values, unique, ValidationErrors, Validator};
use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use chrono::{Duration, NaiveDate, Utc};
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

const PAYMENT_METHODS: &[&str] = &["ach", "check", "wire"];

const CURRENCIES: &[&str] = &[
    "usd", "eur", "jpy", "gbp", "aud", "cad", "chf", "cny", "sek", "nzd", "mxn", "sgd", "hkd",
    "nok", "krw", "try", "rub", "inr", "brl", "zar",
];

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub limiter: Arc<RateLimiter>,
    pub renderer: Arc<dyn InvoiceRenderer>,
    pub converter: Arc<dyn PdfConverter>,
}

/// Body of `POST /v1/convert/html`. A missing or `null` member leaves the
/// default in place.
#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub html: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: ConvertOptions,
}

/// Health check endpoint.
pub async fn healthcheck(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let envelope = Envelope::new().with("status", "available").with(
        "system_info",
        json!({
            "environment": state.config.env,
            "version": env!("CARGO_PKG_VERSION"),
        }),
    );

    write_json(StatusCode::OK, &envelope, HeaderMap::new()).map_err(ApiError::server)
}

/// Render a fake invoice from query parameters and return it as a PDF.
pub async fn create_fake_invoice(
    State(state): State<Arc<AppState>>,
    uri: Uri,
) -> Result<Response, ApiError> {
    let today = Utc::now().date_naive();
    let options = parse_invoice_query(&QueryReader::from_uri(&uri), today, &mut rand::thread_rng())
        .map_err(ApiError::FailedValidation)?;

    info!(
        payment_methods = ?options.payment_methods,
        vendor_name = %options.vendor_name,
        account_number = options.account_number,
        number_of_items = options.number_of_items,
        invoice_date = %options.invoice_date,
        due_date = %options.due_date,
        currency = %options.currency,
        "Creating invoice"
    );

    let html = state
        .renderer
        .render(&options)
        .map_err(|err| ApiError::server(format!("rendering invoice: {err}")))?;

    let pdf = state
        .converter
        .convert(html, &ConvertOptions::default())
        .await
        .map_err(|err| ApiError::server(format!("converting invoice to PDF: {err}")))?;

    debug!(bytes = pdf.len(), "Sending invoice PDF");
    Ok(pdf_response(pdf))
}

/// Convert a caller-supplied HTML document to PDF.
pub async fn convert_html(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<ConvertRequest>,
) -> Result<Response, ApiError> {
    let mut v = Validator::new();
    validate_convert_request(&mut v, &req);
    if !v.valid() {
        return Err(ApiError::FailedValidation(v.into_errors()));
    }

    let pdf = state
        .converter
        .convert(req.html, &req.options)
        .await
        .map_err(|err| ApiError::server(format!("converting HTML to PDF: {err}")))?;

    debug!(bytes = pdf.len(), "Sending converted PDF");
    Ok(pdf_response(pdf))
}

pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method)
}

fn pdf_response(pdf: Vec<u8>) -> Response {
    ([(header::CONTENT_TYPE, "application/pdf")], pdf).into_response()
}

/// Read and validate the fake invoice parameters. Every bad parameter is
/// reported, not just the first.
pub fn parse_invoice_query<R: Rng>(
    qs: &QueryReader,
    today: NaiveDate,
    rng: &mut R,
) -> Result<InvoiceOptions, ValidationErrors> {
    let mut v = Validator::new();

    let payment_methods: Vec<String> = qs
        .read_csv("paymentMethods", vec!["ach".to_string()])
        .into_iter()
        .map(|m| m.to_lowercase())
        .collect();
    let vendor_name = qs.read_string("vendorName", "");
    let account_number = qs.read_int64("accountNumber", random_account_number(rng), &mut v);
    let number_of_items = qs.read_int("numberOfItems", rng.gen_range(1..=8), &mut v);
    let invoice_date = qs.read_date("createdAt", today, &mut v);
    let due_date = qs.read_date("dueAt", today + Duration::days(30), &mut v);
    let currency = qs.read_string("currency", "usd").to_lowercase();

    v.check(
        permitted_values(&payment_methods, PAYMENT_METHODS),
        "paymentMethods",
        "must be list of ['ach', 'check', 'wire']",
    );
    v.check(
        unique(&payment_methods),
        "paymentMethods",
        "must not contain duplicate values",
    );
    v.check(
        (1..=20).contains(&number_of_items),
        "numberOfItems",
        "must be between 1 and 20",
    );
    v.check(invoice_date < due_date, "invoiceDate", "must be before dueDate");
    v.check(
        permitted_value(&currency, CURRENCIES),
        "currency",
        format!("must be one of [{}]", CURRENCIES.join(" ")),
    );

    if !v.valid() {
        return Err(v.into_errors());
    }

    Ok(InvoiceOptions {
        payment_methods,
        vendor_name,
        account_number,
        number_of_items,
        invoice_date,
        due_date,
        currency,
    })
}

fn validate_convert_request(v: &mut Validator, req: &ConvertRequest) {
    v.check(!req.html.trim().is_empty(), "html", "must be provided");

    let opts = &req.options;
    if let Some(scale) = opts.scale {
        v.check(
            (0.1..=2.0).contains(&scale),
            "options.scale",
            "must be between 0.1 and 2.0",
        );
    }
    for (key, size) in [
        ("options.paperWidth", opts.paper_width),
        ("options.paperHeight", opts.paper_height),
    ] {
        if let Some(size) = size {
            v.check(size > 0.0, key, "must be greater than zero");
        }
    }
}

/// A 9 to 12 digit account number.
fn random_account_number<R: Rng>(rng: &mut R) -> i64 {
    rng.gen_range(100_000_000..1_000_000_000_000)
}
