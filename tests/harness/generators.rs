// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators for abuse simulation.

use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of IP addresses for testing.
pub fn generate_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c))
        })
        .collect()
}

/// Malformed `POST /v1/convert/html` bodies paired with the start of the
/// error message each one must produce.
pub fn generate_malformed_bodies() -> Vec<(&'static str, &'static str)> {
    vec![
        ("", "body must not be empty"),
        (" \n\t ", "body must not be empty"),
        ("{", "body contains badly-formed JSON"),
        (r#"{"html": "<p>"#, "body contains badly-formed JSON"),
        (r#"{"html": "<p>",}"#, "body contains badly-formed JSON"),
        ("<html></html>", "body contains badly-formed JSON (at character"),
        ("[1, 2, 3]", "body contains incorrect JSON type (at character"),
        (r#""just a string""#, "body contains incorrect JSON type (at character"),
        (r#"{"html": true}"#, "body contains incorrect JSON type for field \"html\""),
        (r#"["<p>"]"#, "body contains incorrect JSON type (at character"),
        (
            r#"{"html": "<p>", "options": [8.5, 11.0, true]}"#,
            "body contains incorrect JSON type for field \"options\"",
        ),
        (r#"{"html": ["<p>"]}"#, "body contains incorrect JSON type for field \"html\""),
        (
            r#"{"html": "<p>", "options": {"landscape": "yes"}}"#,
            "body contains incorrect JSON type for field \"options.landscape\"",
        ),
        (r#"{"html": "<p>", "__proto__": {}}"#, "body contains unknown key \"__proto__\""),
        (
            r#"{"html": "<p>", "options": {"javascript": true}}"#,
            "body contains unknown key \"javascript\"",
        ),
        (r#"{"html": "<p>"} {}"#, "body must only contain a single JSON value"),
        (r#"{"html": "<p>"} garbage"#, "body must only contain a single JSON value"),
    ]
}

/// Hostile query strings for `GET /v1/invoices/fake`. None of them may
/// produce a valid invoice.
pub fn generate_hostile_queries() -> Vec<String> {
    vec![
        "numberOfItems=99999999999999999999".to_string(),
        "numberOfItems=-1".to_string(),
        "numberOfItems=1e3".to_string(),
        "accountNumber=0x1F".to_string(),
        "createdAt=2024-1-1".to_string(),
        "createdAt=%00%00%00".to_string(),
        "createdAt=2024-13-01".to_string(),
        "dueAt=1970-01-01".to_string(),
        "paymentMethods=ach,ach,ach".to_string(),
        "paymentMethods=%27%3B%20DROP%20TABLE".to_string(),
        "currency=US%00D".to_string(),
        format!("vendorName=x&currency={}", "z".repeat(10_000)),
        format!("paymentMethods={}", vec!["wire"; 1000].join(",")),
    ]
}

/// A JSON body exactly `len` bytes long.
pub fn generate_padded_body(len: usize) -> String {
    let prefix = r#"{"html": ""#;
    let suffix = r#""}"#;
    let padding = len - prefix.len() - suffix.len();
    format!("{prefix}{}{suffix}", "a".repeat(padding))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ips() {
        let ips = generate_ips(256);
        assert_eq!(ips.len(), 256);
        // All should be unique
        let unique: std::collections::HashSet<_> = ips.iter().collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn test_generate_padded_body() {
        assert_eq!(generate_padded_body(64).len(), 64);
        assert_eq!(generate_padded_body(1_048_577).len(), 1_048_577);
    }
}
