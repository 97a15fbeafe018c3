//! Pre-response hook middleware.
//!
//! # Responsibilities
//! - Shape the request context on the way in
//! - Hand request handlers a `RequestLog` for request-scoped events
//! - Report error responses after the inner service completes
//!
//! # Design Decisions
//! - The response is returned unmodified in every case; reporting is a
//!   side effect of observing it
//! - Bodies are buffered only when the declared length fits the cap;
//!   anything else flows through un-captured
//! - Converting panics into 500 responses is the host's job (a
//!   catch-panic layer beneath this one); the hook only observes the
//!   converted result

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};

use crate::context::RequestContext;
use crate::events::RequestLog;
use crate::observability::metrics;
use crate::report::{Fault, Report};
use crate::severity::Severity;

use super::RelayState;

/// Middleware fn for the relay. Apply with
/// `axum::middleware::from_fn_with_state(relay.state(), report_middleware)`.
pub async fn report_middleware(
    State(state): State<Arc<RelayState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();

    let declared_length = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    // Buffer small declared bodies so the shaped context can carry them.
    let (body, captured) = match declared_length {
        Some(length) if length > 0 && length <= state.max_body_capture as u64 => {
            match axum::body::to_bytes(body, state.max_body_capture).await {
                Ok(bytes) => {
                    let captured = (!bytes.is_empty()).then(|| bytes.clone());
                    (Body::from(bytes), captured)
                }
                Err(_) => (Body::empty(), None),
            }
        }
        _ => (body, None),
    };

    let context = RequestContext::shape(
        &parts.headers,
        &parts.method,
        parts.uri.path(),
        &state.protocol,
        captured.as_deref(),
    );

    let mut request = Request::from_parts(parts, body);
    request
        .extensions_mut()
        .insert(RequestLog::new(state.events.clone(), context.clone()));

    let response = next.run(request).await;

    if state.report_error_responses {
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let fault = response
                .extensions()
                .get::<Fault>()
                .cloned()
                .unwrap_or_else(|| Fault::from_status(status));

            tracing::debug!(
                status = %status,
                url = %context.url,
                "reporting error response"
            );
            metrics::record_report(Severity::Error);
            state
                .reporter
                .report(Severity::Error, Report::new(fault).with_request(context));
        }
    }

    response
}
