//! Shared utilities for integration testing.

use std::sync::{Arc, Mutex};

use telemetry_relay::{RelayConfig, Report, Reporter, Severity};

/// Reporter that records every report it receives instead of
/// transmitting.
#[derive(Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<(Severity, Report)>>,
}

impl RecordingReporter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reports(&self) -> Vec<(Severity, Report)> {
        self.reports.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn count(&self) -> usize {
        self.reports.lock().unwrap().len()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, level: Severity, report: Report) {
        self.reports.lock().unwrap().push((level, report));
    }
}

/// A config that passes validation against a recording reporter.
#[allow(dead_code)]
pub fn test_config() -> RelayConfig {
    let mut config = RelayConfig::default();
    config.rollbar.access_token = "test".to_string();
    config
}
