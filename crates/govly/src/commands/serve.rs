//! Resident mode: poll devices on the configured cadence and receive
//! vendor event webhooks.
//!
//! Hosts a single `POST /webhook` route; bodies are handed to the hub's
//! event ingestion, which validates them, patches the cache, and fans the
//! event out to subscribers. Hub notifications are streamed to stdout as
//! JSON lines.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};

use govly_core::{Hub, HubEvent};

use crate::cli::ServeArgs;
use crate::error::CliError;

const MAX_WEBHOOK_BODY_BYTES: usize = 64 * 1024;

pub async fn handle(hub: Hub, args: ServeArgs, quiet: bool) -> Result<(), CliError> {
    let app = Router::new()
        .route("/webhook", post(webhook))
        .layer(RequestBodyLimitLayer::new(MAX_WEBHOOK_BODY_BYTES))
        .with_state(hub.clone());

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    info!(bind = %args.bind, "webhook listener started");
    if !quiet {
        eprintln!(
            "serving {} devices; webhook on http://{}/webhook (ctrl-c to stop)",
            hub.devices().len(),
            args.bind
        );
    }

    let printer = tokio::spawn(print_events(hub.clone(), quiet));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    hub.shutdown().await;
    printer.abort();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install ctrl-c handler");
    }
}

async fn webhook(State(hub): State<Hub>, body: Option<Json<Value>>) -> StatusCode {
    // Unparseable or empty bodies are ignored without error.
    let Some(Json(body)) = body else {
        return StatusCode::OK;
    };
    hub.ingest_event(&body).await;
    StatusCode::OK
}

/// Stream hub notifications to stdout as JSON lines.
async fn print_events(hub: Hub, quiet: bool) {
    let mut events = hub.events();
    loop {
        match events.recv().await {
            Ok(event) if !quiet => {
                let line = match &event {
                    HubEvent::StateUpdated { device } => {
                        json!({"event": "state_updated", "device": device})
                    }
                    HubEvent::PollFailed { device, error } => {
                        json!({"event": "poll_failed", "device": device, "error": error})
                    }
                    HubEvent::Device { device, fields } => {
                        json!({"event": "device_event", "device": device, "fields": fields})
                    }
                };
                println!("{line}");
            }
            Ok(_) => {}
            Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                warn!(skipped = n, "event printer lagged");
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }
}
