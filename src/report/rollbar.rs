//! Rollbar-compatible telemetry client.
//!
//! # Responsibilities
//! - Build collector item payloads from shaped reports
//! - Transmit fire-and-forget on the runtime
//! - Gate reports below the configured report level
//!
//! # Design Decisions
//! - One shared reqwest client for connection reuse
//! - Transmit failures are logged (unless silenced), never propagated
//! - Internal diagnostics are opt-in at construction time rather than a
//!   patch of shared logger state

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use url::Url;

use crate::events::EventPayload;
use crate::observability::metrics;
use crate::report::{Report, Reporter};
use crate::severity::Severity;

/// Client configuration, passed through verbatim from the relay config.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RollbarConfig {
    /// Project access token. Required, must be non-empty.
    pub access_token: String,

    /// Collector item endpoint.
    pub endpoint: String,

    /// Environment name attached to every item.
    pub environment: String,

    /// Minimum severity transmitted; lower-ranked reports are dropped.
    pub report_level: Severity,
}

impl Default for RollbarConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            endpoint: "https://api.rollbar.com/api/1/item/".to_string(),
            environment: "production".to_string(),
            report_level: Severity::Debug,
        }
    }
}

/// Errors constructing a client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("rollbar access token is required")]
    MissingAccessToken,

    #[error("invalid collector endpoint `{endpoint}`: {source}")]
    InvalidEndpoint {
        endpoint: String,
        source: url::ParseError,
    },
}

/// Ships reports to a Rollbar-compatible collector.
///
/// `report` never blocks: the HTTP POST runs on a spawned task and its
/// outcome only surfaces through the client's own diagnostics.
pub struct RollbarClient {
    config: RollbarConfig,
    endpoint: Url,
    http: reqwest::Client,
    silent: bool,
}

impl RollbarClient {
    /// Build a client. Fails when the access token is empty or the
    /// endpoint is not a valid URL.
    pub fn new(config: RollbarConfig, silent: bool) -> Result<Self, ClientError> {
        if config.access_token.trim().is_empty() {
            return Err(ClientError::MissingAccessToken);
        }
        let endpoint = Url::parse(&config.endpoint).map_err(|source| ClientError::InvalidEndpoint {
            endpoint: config.endpoint.clone(),
            source,
        })?;

        Ok(Self {
            endpoint,
            http: reqwest::Client::new(),
            silent,
            config,
        })
    }

    pub fn environment(&self) -> &str {
        &self.config.environment
    }

    fn item(&self, level: Severity, report: &Report) -> Value {
        let body = match &report.body {
            EventPayload::Error(fault) => json!({
                "trace": {
                    "frames": [],
                    "exception": {
                        "class": "Fault",
                        "message": fault.message(),
                        "description": fault.status().to_string(),
                    },
                },
            }),
            payload => json!({ "message": { "body": payload.message() } }),
        };

        let mut data = json!({
            "environment": self.config.environment,
            "level": level.wire_level(),
            "timestamp": report.timestamp_ms / 1000,
            "uuid": report.uuid,
            "language": "rust",
            "notifier": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
            "body": body,
        });
        if let Some(request) = &report.request {
            data["request"] = serde_json::to_value(request).unwrap_or(Value::Null);
        }
        if let Some(custom) = &report.custom {
            data["custom"] = custom.clone();
        }

        json!({
            "access_token": self.config.access_token,
            "data": data,
        })
    }
}

impl Reporter for RollbarClient {
    fn report(&self, level: Severity, report: Report) {
        if level.rank() < self.config.report_level.rank() {
            metrics::record_suppressed("below_report_level");
            if !self.silent {
                tracing::debug!(
                    level = %level,
                    report_level = %self.config.report_level,
                    uuid = %report.uuid,
                    "report below report_level, dropping"
                );
            }
            return;
        }

        let item = self.item(level, &report);
        let endpoint = self.endpoint.clone();
        let http = self.http.clone();
        let silent = self.silent;
        let uuid = report.uuid;

        tokio::spawn(async move {
            match http.post(endpoint).json(&item).send().await {
                Ok(response) if response.status().is_success() => {
                    if !silent {
                        tracing::debug!(uuid = %uuid, "report delivered");
                    }
                }
                Ok(response) => {
                    if !silent {
                        tracing::error!(
                            uuid = %uuid,
                            status = %response.status(),
                            "collector rejected report"
                        );
                    }
                }
                Err(error) => {
                    if !silent {
                        tracing::error!(uuid = %uuid, error = %error, "report transmission failed");
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RequestContext;
    use crate::report::Fault;
    use axum::http::StatusCode;

    fn client() -> RollbarClient {
        let config = RollbarConfig {
            access_token: "token".to_string(),
            ..RollbarConfig::default()
        };
        RollbarClient::new(config, true).unwrap()
    }

    #[test]
    fn rejects_empty_access_token() {
        let result = RollbarClient::new(RollbarConfig::default(), true);
        assert!(matches!(result, Err(ClientError::MissingAccessToken)));
    }

    #[test]
    fn rejects_invalid_endpoint() {
        let config = RollbarConfig {
            access_token: "token".to_string(),
            endpoint: "not a url".to_string(),
            ..RollbarConfig::default()
        };
        let result = RollbarClient::new(config, true);
        assert!(matches!(result, Err(ClientError::InvalidEndpoint { .. })));
    }

    #[test]
    fn message_items_carry_level_and_body() {
        let client = client();
        let report = Report::new("something happened");
        let item = client.item(Severity::Log, &report);

        assert_eq!(item["access_token"], "token");
        assert_eq!(item["data"]["level"], "debug");
        assert_eq!(item["data"]["environment"], "production");
        assert_eq!(item["data"]["body"]["message"]["body"], "something happened");
        assert!(item["data"]["uuid"].is_string());
    }

    #[test]
    fn fault_items_use_the_trace_body() {
        let client = client();
        let fault = Fault::new(StatusCode::IM_A_TEAPOT, "I'm a teapot");
        let item = client.item(Severity::Error, &Report::new(fault));

        assert_eq!(item["data"]["level"], "error");
        assert_eq!(item["data"]["body"]["trace"]["exception"]["message"], "I'm a teapot");
    }

    #[test]
    fn request_context_lands_in_the_request_block() {
        let client = client();
        let context = RequestContext {
            headers: Default::default(),
            protocol: "http".to_string(),
            url: "/widgets".to_string(),
            method: "get".to_string(),
            body: None,
        };
        let item = client.item(Severity::Error, &Report::new("x").with_request(context));

        assert_eq!(item["data"]["request"]["url"], "/widgets");
        assert_eq!(item["data"]["request"]["method"], "get");
        assert_eq!(item["data"]["request"]["protocol"], "http");
        assert_eq!(item["data"]["request"]["body"], Value::Null);
    }
}
