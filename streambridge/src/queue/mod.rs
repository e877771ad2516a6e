//! Queue module for RabbitMQ operations.
//!
//! This module provides:
//! - The wire types and queue name shared by both roles
//! - The backoff-driven connection supervisor
//! - The async publisher used by the producer role
//!
//! ## Architecture
//!
//! ```text
//! Producer → data_stream queue → Consumer
//! ```

pub mod connect;
pub mod publisher;
pub mod types;

pub use connect::{connect_with_retries, ConnectError, RetryPolicy};
pub use publisher::{PublishError, Publisher};
pub use types::{decode_payload, encode_payload, Payload, DATA_QUEUE};
