//! Wire types shared by the producer and consumer roles.
//!
//! Payloads are opaque to the bridge: callers submit arbitrary JSON objects,
//! and the consumer hands back whatever JSON the queue delivered. Both sides
//! must agree on the queue name or messages are invisible to the consumer.

use serde_json::Value;

/// Durable queue carrying submitted payloads from producer to consumer.
pub const DATA_QUEUE: &str = "data_stream";

/// A submitted payload: an arbitrary JSON object, uninterpreted.
pub type Payload = serde_json::Map<String, Value>;

/// Serialize a payload into the JSON text body placed on the queue.
pub fn encode_payload(payload: &Payload) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(payload)
}

/// Decode a delivered message body back into JSON.
pub fn decode_payload(body: &[u8]) -> Result<Value, serde_json::Error> {
    serde_json::from_slice(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_round_trip() {
        let value = json!({"id": 1, "tags": ["a", "b"], "nested": {"ok": true}});
        let payload = value.as_object().unwrap().clone();

        let body = encode_payload(&payload).unwrap();
        let decoded = decode_payload(&body).unwrap();

        assert_eq!(decoded, value);
    }

    #[test]
    fn test_decode_payload_malformed() {
        assert!(decode_payload(b"{not json").is_err());
    }

    #[test]
    fn test_decode_payload_accepts_any_json() {
        // The consumer is tolerant: bodies need not be objects.
        let decoded = decode_payload(b"[1, 2, 3]").unwrap();
        assert_eq!(decoded, json!([1, 2, 3]));
    }
}
