//! Error-telemetry relay plugin for axum servers.
//!
//! Forwards server lifecycle events (uncaught handler errors, structured
//! error responses, server log calls, request log calls) to a
//! Rollbar-compatible telemetry client. The relay decides *whether* to
//! report and at *what* severity; transmitting, queuing and retrying
//! belong to the client.
//!
//! # Architecture Overview
//!
//! ```text
//!   server.log / request.log            error responses
//!         │                                   │
//!         ▼                                   ▼
//!   ┌────────────┐  marker gate +      ┌─────────────┐
//!   │   events   │──severity resolve──▶│    relay    │
//!   │   (bus)    │                     │  (router)   │
//!   └────────────┘                     └──────┬──────┘
//!                                             │ fire-and-forget
//!                                             ▼
//!                                      ┌─────────────┐
//!                                      │   report    │──▶ collector
//!                                      │  (client)   │
//!                                      └─────────────┘
//! ```
//!
//! Registration builds one client from config, wires the enabled
//! subscriptions, and hands back the middleware state:
//!
//! ```no_run
//! use axum::{middleware, routing::get, Router};
//! use telemetry_relay::{report_middleware, Relay, RelayConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut config = RelayConfig::default();
//! config.rollbar.access_token = "POST_SERVER_ITEM_TOKEN".to_string();
//!
//! let relay = Relay::register(config)?;
//! let app: Router = Router::new()
//!     .route("/", get(|| async { "hello" }))
//!     .layer(middleware::from_fn_with_state(relay.state(), report_middleware));
//! # Ok(())
//! # }
//! ```

// Core subsystems
pub mod config;
pub mod context;
pub mod events;
pub mod relay;
pub mod report;
pub mod severity;

// Cross-cutting concerns
pub mod observability;

pub use config::RelayConfig;
pub use context::RequestContext;
pub use events::{EventPayload, RequestLog, ServerEvents, TagSet};
pub use relay::layer::report_middleware;
pub use relay::{RegisterError, Relay, RelayState};
pub use report::{Fault, Report, Reporter, RollbarClient, RollbarConfig};
pub use severity::Severity;
