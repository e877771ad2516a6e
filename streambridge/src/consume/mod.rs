//! RabbitMQ consumer role using lapin.
//!
//! This module handles connecting to RabbitMQ with backoff, consuming
//! messages from the data queue, and appending each decoded payload to the
//! shared [`DeliveryBuffer`]. A message is acknowledged only after its payload
//! has been appended; malformed bodies are nacked with requeue so the broker
//! can redeliver them, and the loop moves on to the next delivery.

pub mod buffer;

pub use buffer::DeliveryBuffer;

use futures::StreamExt;
use lapin::{
    message::Delivery,
    options::{
        BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicQosOptions,
        QueueDeclareOptions,
    },
    types::FieldTable,
    Channel,
};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::queue::{connect_with_retries, decode_payload, ConnectError, DATA_QUEUE};
use crate::util::shutdown_signal;

/// Run the consumer role.
///
/// This function:
/// 1. Connects to RabbitMQ with exponential backoff
/// 2. Declares the durable data queue (idempotent operation)
/// 3. Consumes messages one at a time, appending each to the buffer
/// 4. Reconnects from scratch if the delivery stream closes
/// 5. Closes the connection gracefully on SIGINT/SIGTERM
///
/// Returns an error only when a connect round exhausts its attempt budget;
/// the caller logs that and leaves the service serving an empty list.
pub async fn run(config: Config, buffer: DeliveryBuffer) -> Result<(), ConnectError> {
    let policy = config.retry_policy();

    // Pin the shutdown future so it survives reconnect rounds
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        let conn = connect_with_retries(&config.amqp_url, &policy).await?;

        let channel = conn.create_channel().await.map_err(ConnectError::Channel)?;

        // One in-flight delivery at a time keeps redeliveries in order
        channel
            .basic_qos(1, BasicQosOptions::default())
            .await
            .map_err(ConnectError::Channel)?;

        channel
            .queue_declare(
                DATA_QUEUE,
                QueueDeclareOptions {
                    durable: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| ConnectError::QueueDeclare {
                queue: DATA_QUEUE,
                source: e,
            })?;

        let mut consumer = channel
            .basic_consume(
                DATA_QUEUE,
                "streambridge-consumer",
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await
            .map_err(|e| ConnectError::Consume {
                queue: DATA_QUEUE,
                source: e,
            })?;

        info!(queue = DATA_QUEUE, "consumer_waiting_for_messages");

        // Process deliveries until shutdown or the stream closes
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("consumer_stopping");

                    if let Err(e) = channel.close(200, "Normal shutdown").await {
                        warn!(error = %e, "rabbitmq_channel_close_error");
                    }
                    if let Err(e) = conn.close(200, "Normal shutdown").await {
                        warn!(error = %e, "rabbitmq_connection_close_error");
                    }

                    info!("consumer_shutdown_complete");
                    return Ok(());
                }
                delivery = consumer.next() => {
                    match delivery {
                        Some(Ok(delivery)) => {
                            handle_delivery(&channel, &buffer, delivery).await;
                        }
                        Some(Err(e)) => {
                            error!(error = %e, "rabbitmq_delivery_error");
                        }
                        None => {
                            warn!("rabbitmq_consumer_closed");
                            break;
                        }
                    }
                }
            }
        }

        // The stream only closes when the link died; run a fresh backoff round
        warn!("rabbitmq_connection_lost");
    }
}

/// Decode one delivery and append it to the buffer.
///
/// The ack is sent only after the append; a body that fails to decode is
/// nacked with requeue and stays eligible for redelivery.
async fn handle_delivery(channel: &Channel, buffer: &DeliveryBuffer, delivery: Delivery) {
    let delivery_tag = delivery.delivery_tag;

    match decode_payload(&delivery.data) {
        Ok(payload) => {
            info!(
                queue = DATA_QUEUE,
                delivery_tag = delivery_tag,
                body_length = delivery.data.len(),
                "message_received"
            );

            buffer.append(payload).await;

            if let Err(e) = channel
                .basic_ack(delivery_tag, BasicAckOptions::default())
                .await
            {
                error!(
                    delivery_tag = delivery_tag,
                    error = %e,
                    "rabbitmq_ack_failed"
                );
            }
        }
        Err(e) => {
            error!(
                delivery_tag = delivery_tag,
                error = %e,
                body_preview = %String::from_utf8_lossy(
                    &delivery.data[..delivery.data.len().min(500)]
                ),
                "message_decode_failed"
            );

            if let Err(nack_err) = channel
                .basic_nack(
                    delivery_tag,
                    BasicNackOptions {
                        requeue: true,
                        ..Default::default()
                    },
                )
                .await
            {
                error!(
                    delivery_tag = delivery_tag,
                    error = %nack_err,
                    "rabbitmq_nack_failed"
                );
            }
        }
    }
}
