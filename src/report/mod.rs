//! Report shaping and the telemetry client seam.
//!
//! # Design Decisions
//! - `Reporter` is the trait boundary: the relay treats the client as an
//!   opaque collaborator that owns transmission, queuing and retries
//! - Implementations must be safe to call from concurrent request tasks
//!   and must not block the caller
//! - Reports are plain values; a uuid and timestamp are stamped at
//!   construction

pub mod fault;
pub mod rollbar;

pub use fault::Fault;
pub use rollbar::{ClientError, RollbarClient, RollbarConfig};

use serde_json::Value;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::events::EventPayload;
use crate::severity::Severity;

/// One shaped unit handed to the telemetry client.
#[derive(Debug, Clone)]
pub struct Report {
    pub uuid: Uuid,
    pub timestamp_ms: u64,
    pub body: EventPayload,
    pub request: Option<RequestContext>,
    pub custom: Option<Value>,
}

impl Report {
    pub fn new(body: impl Into<EventPayload>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            timestamp_ms: crate::events::unix_millis(),
            body: body.into(),
            request: None,
            custom: None,
        }
    }

    /// Attach the shaped context of the request this report belongs to.
    pub fn with_request(mut self, context: RequestContext) -> Self {
        self.request = Some(context);
        self
    }

    /// Attach the raw event that produced this report.
    pub fn with_custom(mut self, custom: Value) -> Self {
        self.custom = Some(custom);
        self
    }
}

/// Severity-leveled reporting seam.
pub trait Reporter: Send + Sync {
    /// Report at an explicit severity.
    fn report(&self, level: Severity, report: Report);

    fn critical(&self, report: Report) {
        self.report(Severity::Critical, report);
    }

    fn error(&self, report: Report) {
        self.report(Severity::Error, report);
    }

    fn warning(&self, report: Report) {
        self.report(Severity::Warning, report);
    }

    fn info(&self, report: Report) {
        self.report(Severity::Info, report);
    }

    fn debug(&self, report: Report) {
        self.report(Severity::Debug, report);
    }

    /// Report at the default severity.
    fn log(&self, report: Report) {
        self.report(Severity::Log, report);
    }
}
