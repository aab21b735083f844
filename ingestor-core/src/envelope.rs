//! The message envelope carried over the broker.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueEnvelope {
    pub url: String,
    pub request_id: Uuid,
}

impl EnqueueEnvelope {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), request_id: Uuid::new_v4() }
    }

    pub fn to_json_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let env = EnqueueEnvelope::new("https://example.com/");
        let bytes = env.to_json_vec().unwrap();
        let decoded = EnqueueEnvelope::from_json_slice(&bytes).unwrap();
        assert_eq!(env.url, decoded.url);
        assert_eq!(env.request_id, decoded.request_id);
    }

    #[test]
    fn rejects_malformed_payload() {
        assert!(EnqueueEnvelope::from_json_slice(b"not json").is_err());
        assert!(EnqueueEnvelope::from_json_slice(b"{}").is_err());
    }
}
