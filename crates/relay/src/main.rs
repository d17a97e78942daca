use std::sync::Arc;

use anyhow::{Context, Result};
use chatbot_relay::config::RelayConfig;
use chatbot_relay::observability::init_tracing;
use chatbot_relay::state::RelayState;
use chatbot_relay_core::{CluClient, IntentResolver, ResponseTable};
use clap::Parser;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present so clap sees its variables
    let _ = dotenvy::dotenv();

    let config = RelayConfig::parse();
    init_tracing(config.log_format);
    config.validate()?;

    let responses = ResponseTable::load(&config.responses_path)
        .await
        .context("cannot start without a response table")?;

    let classifier = CluClient::new(config.clu_config()).context("build CLU client")?;
    let resolver = IntentResolver::new(Arc::new(classifier), config.confidence_threshold);
    info!(
        provider = "clu",
        threshold = resolver.threshold(),
        intents = responses.len(),
        "intent resolver ready"
    );
    let state = RelayState::new(resolver, responses, config.fallback_policy());

    let static_dir = config.static_dir();
    if static_dir.is_none() {
        warn!(path = %config.static_dir.display(), "static directory not found, serving API only");
    }
    let app = chatbot_relay::app(state, static_dir);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!("Chatbot relay listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("relay server")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
