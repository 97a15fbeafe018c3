//! Typed lifecycle events.
//!
//! # Data Flow
//! ```text
//! server code ──▶ ServerEvents::log ──────────▶ log observers
//! handler ──────▶ RequestLog::log ────────────▶ request observers
//!                      (both dispatch synchronously, see bus.rs)
//! ```
//!
//! # Design Decisions
//! - Events are plain values; observers receive them by reference
//! - A payload is either structured data or a fault, never both
//! - Timestamps are unix milliseconds taken at construction

pub mod bus;

pub use bus::{RequestLog, ServerEvents};

use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::Value;

use crate::context::RequestContext;
use crate::report::Fault;

/// Set of string tags attached to a log event.
///
/// Used for two things: the marker tag that opts an event into reporting,
/// and the severity tags the resolver recognizes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn insert(&mut self, tag: impl Into<String>) {
        self.0.insert(tag.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for TagSet {
    fn from(tags: [S; N]) -> Self {
        tags.into_iter().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Payload carried by a log event: structured data or a fault.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum EventPayload {
    Data(Value),
    Error(Fault),
}

impl EventPayload {
    /// Human-readable body used as the report message.
    pub fn message(&self) -> String {
        match self {
            EventPayload::Data(Value::String(s)) => s.clone(),
            EventPayload::Data(value) => value.to_string(),
            EventPayload::Error(fault) => fault.message().to_string(),
        }
    }
}

impl From<&str> for EventPayload {
    fn from(data: &str) -> Self {
        EventPayload::Data(Value::String(data.to_string()))
    }
}

impl From<String> for EventPayload {
    fn from(data: String) -> Self {
        EventPayload::Data(Value::String(data))
    }
}

impl From<Value> for EventPayload {
    fn from(data: Value) -> Self {
        EventPayload::Data(data)
    }
}

impl From<Fault> for EventPayload {
    fn from(fault: Fault) -> Self {
        EventPayload::Error(fault)
    }
}

/// A server- or request-scoped log event.
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub timestamp_ms: u64,
    pub tags: TagSet,
    pub payload: EventPayload,
}

impl LogEvent {
    pub fn new(tags: TagSet, payload: EventPayload) -> Self {
        Self {
            timestamp_ms: unix_millis(),
            tags,
            payload,
        }
    }
}

/// A log event emitted under an in-flight request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestLogEvent {
    pub event: LogEvent,
    pub context: RequestContext,
}

pub(crate) fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
