//! StreamBridge Consumer - drains the data queue into memory.
//!
//! This binary:
//! - Consumes the durable `data_stream` queue in a background task, with the
//!   same backoff policy as the producer
//! - Buffers every decoded payload in arrival order for the life of the
//!   process
//! - Serves the buffer on `GET /messages`, responding even while the broker
//!   link is down (the list is simply empty or stalled)

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use streambridge::util::shutdown_signal;
use streambridge::web::consumer_router;
use streambridge::{consume, Config, ConsumerState, DeliveryBuffer};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("consumer_starting");

    // Load configuration
    let config = Config::from_env();
    info!(
        port = config.port,
        rabbitmq_host = %config.rabbitmq_host,
        connect_max_attempts = config.connect_max_attempts,
        "config_loaded"
    );

    let buffer = DeliveryBuffer::new();

    // Start the receive loop in the background so the HTTP surface accepts
    // connections immediately
    let mut consume_task = tokio::spawn({
        let config = config.clone();
        let buffer = buffer.clone();
        async move {
            if let Err(e) = consume::run(config, buffer).await {
                // Degraded mode: keep serving, the list just stays empty
                error!(error = %e, "consumer_degraded_no_messages_will_arrive");
            }
        }
    });

    // Build the router
    let state = ConsumerState::new(buffer);
    let app = consumer_router(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "consumer_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // The receive loop reacts to the same signal and closes its connection;
    // don't wait forever if it is mid-backoff
    if timeout(Duration::from_secs(2), &mut consume_task).await.is_err() {
        consume_task.abort();
    }

    info!("consumer_shutdown_complete");

    Ok(())
}
