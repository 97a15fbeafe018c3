//! Request context shaping.
//!
//! # Responsibilities
//! - Project an inbound request into the shape reports attach
//! - Decode buffered bodies (JSON when declared, UTF-8 text otherwise)
//!
//! # Design Decisions
//! - Pure construction, no failure modes: undecodable pieces become None
//! - Protocol comes from registration-time server info, not the request
//! - Methods are lowercased to match collector conventions
//! - No truncation or redaction; scrubbing is the collector's concern

use std::collections::BTreeMap;

use axum::http::{header, HeaderMap, Method};
use serde::Serialize;
use serde_json::Value;

/// Normalized projection of an inbound request, attached to reports.
#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    pub headers: BTreeMap<String, String>,
    pub protocol: String,
    pub url: String,
    pub method: String,
    pub body: Option<Value>,
}

impl RequestContext {
    /// Shape a context from request pieces.
    ///
    /// `body` is the buffered request body, if the middleware captured
    /// one. Header values that are not valid UTF-8 are dropped.
    pub fn shape(
        headers: &HeaderMap,
        method: &Method,
        path: &str,
        protocol: &str,
        body: Option<&[u8]>,
    ) -> Self {
        let mut shaped = BTreeMap::new();
        for (name, value) in headers {
            if let Ok(value) = value.to_str() {
                shaped.insert(name.as_str().to_string(), value.to_string());
            }
        }

        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        Self {
            headers: shaped,
            protocol: protocol.to_string(),
            url: path.to_string(),
            method: method.as_str().to_lowercase(),
            body: body.and_then(|bytes| decode_body(bytes, content_type)),
        }
    }
}

fn decode_body(bytes: &[u8], content_type: &str) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    if content_type.starts_with("application/json") {
        if let Ok(value) = serde_json::from_slice(bytes) {
            return Some(value);
        }
    }
    std::str::from_utf8(bytes)
        .ok()
        .map(|s| Value::String(s.to_string()))
}
