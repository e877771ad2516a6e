//! StreamBridge Producer - HTTP front door for the data queue.
//!
//! This binary:
//! - Accepts JSON payload submissions on `POST /send`
//! - Forwards each payload onto the durable `data_stream` queue
//! - Brings up its broker link in a background task with exponential backoff,
//!   so the HTTP surface accepts connections even while RabbitMQ is down
//! - Answers 503 while no channel is ready

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use streambridge::util::shutdown_signal;
use streambridge::web::producer_router;
use streambridge::{Config, ProducerState, Publisher};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("producer_starting");

    // Load configuration
    let config = Config::from_env();
    info!(
        port = config.port,
        rabbitmq_host = %config.rabbitmq_host,
        connect_max_attempts = config.connect_max_attempts,
        "config_loaded"
    );

    // Create the publisher; the link comes up in the background
    let publisher = Publisher::new(config.amqp_url.clone());

    let supervisor = tokio::spawn({
        let publisher = publisher.clone();
        let policy = config.retry_policy();
        async move {
            if let Err(e) = publisher.supervise(policy).await {
                // Degraded mode: keep serving, reject submissions with 503
                error!(error = %e, "producer_degraded_submissions_rejected");
            }
        }
    });

    // Build the router
    let state = ProducerState::new(publisher.clone());
    let app = producer_router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "producer_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Stop supervising and release the broker link; a no-op if it never came up
    supervisor.abort();
    publisher.close().await;

    info!("producer_shutdown_complete");

    Ok(())
}
