//! Request header assembly.
//!
//! Custom headers come from `advancedOptions.customHeaders`, a JSON object
//! encoded as a string. Anything that does not parse to an object is
//! ignored: the request still goes out with the base headers and no error
//! is raised.

use serde_json::Value;
use tracing::warn;
use wasend_core::{credentials::WhatsAppCredentials, traits::Headers};

/// `Authorization` + `Content-Type`, then custom headers merged on top.
pub fn build_headers(credentials: &WhatsAppCredentials, custom_headers: Option<&str>) -> Headers {
    let mut headers = vec![
        credentials.authorization_header(),
        ("Content-Type".to_string(), "application/json".to_string()),
    ];

    if let Some(raw) = custom_headers.filter(|s| !s.is_empty()) {
        for (name, value) in parse_custom_headers(raw) {
            set_header(&mut headers, name, value);
        }
    }

    headers
}

/// Insert or replace a header. Names compare case-insensitively; the last
/// write wins and keeps the original position.
pub fn set_header(headers: &mut Headers, name: String, value: String) {
    match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
        Some(slot) => *slot = (name, value),
        None => headers.push((name, value)),
    }
}

fn parse_custom_headers(raw: &str) -> Vec<(String, String)> {
    let obj = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(obj)) => obj,
        Ok(other) => {
            warn!("customHeaders is not a JSON object ({other}), ignoring");
            return Vec::new();
        }
        Err(e) => {
            warn!("customHeaders is not valid JSON, ignoring: {e}");
            return Vec::new();
        }
    };

    obj.into_iter()
        .filter_map(|(name, value)| match value {
            Value::String(s) => Some((name, s)),
            Value::Number(n) => Some((name, n.to_string())),
            Value::Bool(b) => Some((name, b.to_string())),
            _ => {
                warn!("customHeaders: skipping non-scalar value for '{name}'");
                None
            }
        })
        .collect()
}
