//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every option defaults, so a minimal config only names the client
//! table.

use serde::{Deserialize, Serialize};

use crate::report::rollbar::RollbarConfig;

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Key under which the client is exposed to other components.
    pub exposed_name: String,

    /// Enables the pre-response error-reporting hook.
    pub report_error_responses: bool,

    /// Enables the per-request log subscription.
    pub report_request_logs: bool,

    /// Enables the server log subscription.
    pub report_server_logs: bool,

    /// Suppresses the client's own diagnostic output.
    pub silence_rollbar_logger: bool,

    /// Marker tag a log event must carry to be reported.
    pub report_tag: String,

    /// Server protocol recorded in shaped request contexts.
    pub protocol: String,

    /// Largest request body captured into a context, in bytes. Bodies
    /// over the cap (or of unknown length) flow through un-captured.
    pub max_body_capture: usize,

    /// Client configuration, passed through verbatim.
    pub rollbar: RollbarConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            exposed_name: "rollbar".to_string(),
            report_error_responses: true,
            report_request_logs: true,
            report_server_logs: true,
            silence_rollbar_logger: true,
            report_tag: "rollbar".to_string(),
            protocol: "http".to_string(),
            max_body_capture: 64 * 1024,
            rollbar: RollbarConfig::default(),
        }
    }
}
