//! StreamBridge - resilient producer/consumer bridge over RabbitMQ.
//!
//! This library provides shared modules for the two StreamBridge binaries:
//! - `streambridge-producer`: HTTP front door that forwards submitted payloads
//!   onto a durable queue
//! - `streambridge-consumer`: drains the queue into an in-memory buffer served
//!   back over HTTP
//!
//! ## Architecture
//!
//! ```text
//! POST /send → Producer → data_stream queue → Consumer → GET /messages
//! ```
//!
//! Both binaries establish their broker link in a background task with
//! exponential backoff, so the HTTP surface stays responsive even while
//! RabbitMQ is unavailable.

pub mod config;
pub mod consume;
pub mod queue;
pub mod util;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use consume::DeliveryBuffer;
pub use queue::{ConnectError, Payload, PublishError, Publisher, RetryPolicy, DATA_QUEUE};
pub use web::{ConsumerState, ProducerState};
