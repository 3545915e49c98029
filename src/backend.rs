// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Interfaces to the invoice renderer and the HTML-to-PDF converter.
//!
//! Both live outside this crate. Handlers only see these traits, so a
//! deployment plugs in real implementations and tests plug in fakes.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

/// Parameters for one generated invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceOptions {
    pub payment_methods: Vec<String>,
    pub vendor_name: String,
    pub account_number: i64,
    pub number_of_items: i32,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub currency: String,
}

/// Page options forwarded to the converter.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOptions {
    /// Paper width in inches
    #[serde(default)]
    pub paper_width: Option<f64>,
    /// Paper height in inches
    #[serde(default)]
    pub paper_height: Option<f64>,
    #[serde(default)]
    pub landscape: Option<bool>,
    #[serde(default)]
    pub print_background: Option<bool>,
    /// Page scale factor, 0.1 to 2.0
    #[serde(default)]
    pub scale: Option<f64>,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no invoice renderer configured")]
    Unavailable,
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("no PDF converter configured")]
    Unavailable,

    #[error("converter responded with status {status}: {body}")]
    Upstream { status: u16, body: String },
}

/// Turns invoice parameters into an HTML document.
pub trait InvoiceRenderer: Send + Sync {
    fn render(&self, options: &InvoiceOptions) -> Result<String, RenderError>;
}

/// Turns an HTML document into PDF bytes.
#[async_trait]
pub trait PdfConverter: Send + Sync {
    async fn convert(&self, html: String, options: &ConvertOptions) -> Result<Vec<u8>, ConvertError>;
}

/// Stand-in used when no backend has been wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

impl InvoiceRenderer for Unconfigured {
    fn render(&self, _options: &InvoiceOptions) -> Result<String, RenderError> {
        Err(RenderError::Unavailable)
    }
}

#[async_trait]
impl PdfConverter for Unconfigured {
    async fn convert(&self, _html: String, _options: &ConvertOptions) -> Result<Vec<u8>, ConvertError> {
        Err(ConvertError::Unavailable)
    }
}
