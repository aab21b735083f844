//! In-memory publisher double.
//!
//! Always reports `READY` and appends envelopes to a bounded buffer, so the
//! producer API can be exercised without a broker. Selected at startup via
//! `PUBLISHER_BACKEND=inmemory`.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::envelope::EnqueueEnvelope;
use crate::error::IngestError;
use crate::ports::MessagePublisher;

pub struct InMemoryPublisher {
    capacity: usize,
    published: Mutex<Vec<EnqueueEnvelope>>,
}

impl InMemoryPublisher {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, published: Mutex::new(Vec::new()) }
    }

    pub fn published(&self) -> Vec<EnqueueEnvelope> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagePublisher for InMemoryPublisher {
    async fn publish(&self, envelope: &EnqueueEnvelope) -> Result<(), IngestError> {
        let mut published = self.published.lock().unwrap();
        if published.len() >= self.capacity {
            return Err(IngestError::QueueRejected);
        }
        published.push(envelope.clone());
        Ok(())
    }

    fn is_ready(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publishes_until_capacity_then_rejects() {
        let publisher = InMemoryPublisher::new(1);
        assert!(publisher.publish(&EnqueueEnvelope::new("https://a/")).await.is_ok());
        let err = publisher.publish(&EnqueueEnvelope::new("https://b/")).await.unwrap_err();
        assert!(matches!(err, IngestError::QueueRejected));
        assert_eq!(publisher.published().len(), 1);
    }

    #[test]
    fn always_ready() {
        assert!(InMemoryPublisher::new(10).is_ready());
    }
}
