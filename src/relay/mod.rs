//! Event routing and plugin registration.
//!
//! # Responsibilities
//! - Construct the telemetry client and expose it by name
//! - Subscribe to the server and request log channels per config
//! - Provide the shared state the pre-response hook runs against
//!
//! # Design Decisions
//! - Flags gate subscription, not emission: a disabled source never
//!   registers an observer
//! - Log events are reported only when they carry the marker tag;
//!   severity is then resolved by ranked precedence
//! - Client failures are never caught here; delivery is the client's
//!   problem and stays visible to operators

pub mod layer;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::config::validation::describe;
use crate::config::{validate_config, RelayConfig, ValidationError};
use crate::events::{EventPayload, LogEvent, RequestLogEvent, ServerEvents, TagSet};
use crate::observability::metrics;
use crate::report::rollbar::{ClientError, RollbarClient};
use crate::report::{Report, Reporter};
use crate::severity::Severity;

/// Errors raised during plugin registration.
#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("invalid configuration: {}", describe(.0))]
    InvalidConfig(Vec<ValidationError>),

    #[error("failed to construct telemetry client: {0}")]
    Client(#[from] ClientError),
}

/// Shared state for the pre-response hook middleware.
pub struct RelayState {
    pub(crate) events: Arc<ServerEvents>,
    pub(crate) reporter: Arc<dyn Reporter>,
    pub(crate) report_error_responses: bool,
    pub(crate) protocol: String,
    pub(crate) max_body_capture: usize,
}

/// The registered plugin: one client, the wired subscriptions, and the
/// middleware state.
pub struct Relay {
    settings: RelayConfig,
    reporter: Arc<dyn Reporter>,
    events: Arc<ServerEvents>,
    exposed: HashMap<String, Arc<dyn Reporter>>,
    state: Arc<RelayState>,
}

impl Relay {
    /// Register the plugin: validate the config, construct the client,
    /// wire the enabled subscriptions.
    ///
    /// Fails fast before the server starts serving when the client
    /// config is absent or invalid.
    pub fn register(config: RelayConfig) -> Result<Relay, RegisterError> {
        validate_config(&config).map_err(RegisterError::InvalidConfig)?;

        let client = RollbarClient::new(config.rollbar.clone(), config.silence_rollbar_logger)?;
        Ok(Self::wire(config, Arc::new(client)))
    }

    /// Register against an already-instantiated reporter.
    ///
    /// The client table is not validated here since the reporter it
    /// would configure is being supplied directly.
    pub fn register_with_reporter(
        config: RelayConfig,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Relay, RegisterError> {
        if let Err(errors) = validate_config(&config) {
            let errors: Vec<_> = errors
                .into_iter()
                .filter(|e| {
                    !matches!(
                        e,
                        ValidationError::MissingAccessToken | ValidationError::InvalidEndpoint(_)
                    )
                })
                .collect();
            if !errors.is_empty() {
                return Err(RegisterError::InvalidConfig(errors));
            }
        }
        Ok(Self::wire(config, reporter))
    }

    fn wire(config: RelayConfig, reporter: Arc<dyn Reporter>) -> Relay {
        let events = Arc::new(ServerEvents::new());

        if config.report_server_logs {
            let observer = reporter.clone();
            let report_tag = config.report_tag.clone();
            events.on_log(move |event| route_log(&*observer, &report_tag, event));
        }

        if config.report_request_logs {
            let observer = reporter.clone();
            let report_tag = config.report_tag.clone();
            events.on_request(move |event| route_request_log(&*observer, &report_tag, event));
        }

        let state = Arc::new(RelayState {
            events: events.clone(),
            reporter: reporter.clone(),
            report_error_responses: config.report_error_responses,
            protocol: config.protocol.clone(),
            max_body_capture: config.max_body_capture,
        });

        let mut exposed = HashMap::new();
        exposed.insert(config.exposed_name.clone(), reporter.clone());

        tracing::info!(
            exposed = %config.exposed_name,
            server_logs = config.report_server_logs,
            request_logs = config.report_request_logs,
            error_responses = config.report_error_responses,
            "telemetry relay registered"
        );

        Relay {
            settings: config,
            reporter,
            events,
            exposed,
            state,
        }
    }

    /// The live telemetry client, for reporting outside the automatic
    /// hooks.
    pub fn client(&self) -> &Arc<dyn Reporter> {
        &self.reporter
    }

    /// Look up an exposed client by name.
    pub fn exposed(&self, name: &str) -> Option<&Arc<dyn Reporter>> {
        self.exposed.get(name)
    }

    /// The event bus; hand clones to whatever emits server-scoped logs.
    pub fn events(&self) -> &Arc<ServerEvents> {
        &self.events
    }

    /// State handle for the pre-response hook middleware.
    pub fn state(&self) -> Arc<RelayState> {
        self.state.clone()
    }

    pub fn settings(&self) -> &RelayConfig {
        &self.settings
    }

    /// Server-scoped log call.
    pub fn log(&self, tags: TagSet, payload: impl Into<EventPayload>) {
        self.events.log(tags, payload);
    }
}

fn route_log(reporter: &dyn Reporter, report_tag: &str, event: &LogEvent) {
    if !event.tags.contains(report_tag) {
        metrics::record_suppressed("unmarked");
        return;
    }

    let level = Severity::resolve(&event.tags);
    let custom = serde_json::to_value(event).unwrap_or(Value::Null);
    let report = Report::new(event.payload.clone()).with_custom(custom);

    metrics::record_report(level);
    reporter.report(level, report);
}

fn route_request_log(reporter: &dyn Reporter, report_tag: &str, event: &RequestLogEvent) {
    if !event.event.tags.contains(report_tag) {
        metrics::record_suppressed("unmarked");
        return;
    }

    let level = Severity::resolve(&event.event.tags);
    let custom = serde_json::to_value(&event.event).unwrap_or(Value::Null);
    let report = Report::new(event.event.payload.clone())
        .with_request(event.context.clone())
        .with_custom(custom);

    metrics::record_report(level);
    reporter.report(level, report);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        reports: Mutex<Vec<(Severity, Report)>>,
    }

    impl Reporter for Recorder {
        fn report(&self, level: Severity, report: Report) {
            self.reports.lock().unwrap().push((level, report));
        }
    }

    impl Recorder {
        fn levels(&self) -> Vec<Severity> {
            self.reports.lock().unwrap().iter().map(|(l, _)| *l).collect()
        }
    }

    fn registered(config: RelayConfig) -> (Relay, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let relay = Relay::register_with_reporter(config, recorder.clone()).unwrap();
        (relay, recorder)
    }

    #[test]
    fn register_fails_fast_without_client_config() {
        let result = Relay::register(RelayConfig::default());
        assert!(matches!(result, Err(RegisterError::InvalidConfig(_))));
    }

    #[test]
    fn marked_server_logs_report_at_resolved_severity() {
        let (relay, recorder) = registered(RelayConfig::default());

        relay.log(TagSet::from(["rollbar"]), "plain");
        relay.log(TagSet::from(["rollbar", "error"]), "bad");

        assert_eq!(recorder.levels(), vec![Severity::Log, Severity::Error]);
    }

    #[test]
    fn unmarked_server_logs_are_not_reported() {
        let (relay, recorder) = registered(RelayConfig::default());

        relay.log(TagSet::from(["error"]), "unmarked");
        relay.log(TagSet::new(), "untagged");

        assert!(recorder.levels().is_empty());
    }

    #[test]
    fn disabling_server_logs_never_invokes_the_client() {
        let mut config = RelayConfig::default();
        config.report_server_logs = false;
        let (relay, recorder) = registered(config);

        relay.log(TagSet::from(["rollbar", "error"]), "dropped");

        assert!(recorder.levels().is_empty());
    }

    #[test]
    fn server_log_reports_attach_the_raw_event() {
        let (relay, recorder) = registered(RelayConfig::default());

        relay.log(TagSet::from(["rollbar"]), "payload text");

        let reports = recorder.reports.lock().unwrap();
        let (_, report) = &reports[0];
        let custom = report.custom.as_ref().unwrap();
        assert_eq!(custom["payload"], "payload text");
        assert!(custom["timestamp_ms"].as_u64().unwrap() > 0);
        assert!(report.request.is_none());
    }

    #[test]
    fn exposes_the_client_under_the_configured_name() {
        let mut config = RelayConfig::default();
        config.exposed_name = "collector".to_string();
        let (relay, recorder) = registered(config);

        assert!(relay.exposed("collector").is_some());
        assert!(relay.exposed("rollbar").is_none());

        // Manual reporting through the exposed client hits the same sink.
        relay.exposed("collector").unwrap().log(Report::new("custom log data"));
        assert_eq!(recorder.levels(), vec![Severity::Log]);
    }

    #[test]
    fn custom_report_tag_is_honored() {
        let mut config = RelayConfig::default();
        config.report_tag = "telemetry".to_string();
        let (relay, recorder) = registered(config);

        relay.log(TagSet::from(["rollbar"]), "old marker");
        relay.log(TagSet::from(["telemetry"]), "new marker");

        assert_eq!(recorder.levels(), vec![Severity::Log]);
    }
}
