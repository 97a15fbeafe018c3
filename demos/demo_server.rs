//! Minimal server wiring the relay.
//!
//! Set `ROLLBAR_ACCESS_TOKEN` to a real post-server-item token and hit
//! `http://127.0.0.1:3000/boom`, `/panic`, or `/log` to see reports go
//! out. Without a token the collector rejects the items, which the
//! client logs since diagnostics are left on here.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{middleware, routing::get, Extension, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use telemetry_relay::{report_middleware, Fault, Relay, RelayConfig, RequestLog, TagSet};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "telemetry_relay=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = RelayConfig::default();
    config.rollbar.access_token =
        std::env::var("ROLLBAR_ACCESS_TOKEN").unwrap_or_else(|_| "placeholder".to_string());
    config.rollbar.environment = "demo".to_string();
    config.silence_rollbar_logger = false;

    let relay = Relay::register(config)?;

    let app = Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/boom", get(boom))
        .route("/panic", get(demo_panic))
        .route("/log", get(request_log))
        .layer(CatchPanicLayer::custom(panic_to_fault))
        .layer(middleware::from_fn_with_state(relay.state(), report_middleware));

    relay.log(TagSet::from(["rollbar"]), "demo server starting");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!(address = %listener.local_addr()?, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}

async fn boom() -> Result<&'static str, Fault> {
    Err(Fault::new(StatusCode::IM_A_TEAPOT, "I'm a teapot"))
}

async fn demo_panic() {
    panic!("demo panic");
}

async fn request_log(Extension(log): Extension<RequestLog>) -> &'static str {
    log.log(TagSet::from(["rollbar"]), "manual request log");
    "logged"
}

fn panic_to_fault(err: Box<dyn std::any::Any + Send + 'static>) -> axum::response::Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "handler panicked".to_string()
    };
    Fault::internal(message).into_response()
}
