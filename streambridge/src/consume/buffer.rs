//! In-memory log of received payloads.
//!
//! Append-only for the life of the process; unbounded growth is an accepted
//! trade-off of this design. The receive loop is the only writer, so arrival
//! order is append order. Readers get a point-in-time snapshot and never hold
//! up the loop beyond a short read lock.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

/// Shared append-only buffer of decoded payloads in arrival order.
///
/// Cloning is cheap and all clones observe the same log. A bounded or
/// persistent variant can replace this without touching the receive loop.
#[derive(Clone, Default)]
pub struct DeliveryBuffer {
    inner: Arc<RwLock<Vec<Value>>>,
}

impl DeliveryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a decoded payload. Called only from the receive loop.
    pub async fn append(&self, payload: Value) {
        self.inner.write().await.push(payload);
    }

    /// Point-in-time copy of everything received so far, in arrival order.
    pub async fn snapshot(&self) -> Vec<Value> {
        self.inner.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_snapshot_preserves_arrival_order() {
        let buffer = DeliveryBuffer::new();

        buffer.append(json!({"seq": 1})).await;
        buffer.append(json!({"seq": 2})).await;
        buffer.append(json!({"seq": 3})).await;

        let snapshot = buffer.snapshot().await;
        assert_eq!(
            snapshot,
            vec![json!({"seq": 1}), json!({"seq": 2}), json!({"seq": 3})]
        );
    }

    #[tokio::test]
    async fn test_snapshot_is_isolated_from_later_appends() {
        let buffer = DeliveryBuffer::new();
        buffer.append(json!({"seq": 1})).await;

        let snapshot = buffer.snapshot().await;
        buffer.append(json!({"seq": 2})).await;

        assert_eq!(snapshot.len(), 1);
        assert_eq!(buffer.len().await, 2);
    }

    #[tokio::test]
    async fn test_clones_share_the_log() {
        let buffer = DeliveryBuffer::new();
        let clone = buffer.clone();

        buffer.append(json!("a")).await;
        clone.append(json!("b")).await;

        assert_eq!(buffer.snapshot().await, vec![json!("a"), json!("b")]);
        assert!(!clone.is_empty().await);
    }
}
