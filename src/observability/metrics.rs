//! Report counters.
//!
//! Emitted through the `metrics` facade; installing an exporter is the
//! embedding application's concern.

use metrics::counter;

use crate::severity::Severity;

/// Count a report handed to the client.
pub fn record_report(level: Severity) {
    counter!("relay_reports_total", "level" => level.wire_level()).increment(1);
}

/// Count an event dropped before reaching the client.
pub fn record_suppressed(reason: &'static str) {
    counter!("relay_reports_suppressed_total", "reason" => reason).increment(1);
}
