use async_trait::async_trait;
use std::sync::Arc;

use super::redpanda::RedpandaClient;
use crate::consumer::{DeadLetterSink, DeliveryError};

/// Dead-letter stream on the same cluster as the source stream.
///
/// Key and value bytes are republished exactly as they were consumed.
pub struct RedpandaDeadLetterSink {
    client: Arc<RedpandaClient>,
    topic: String,
}

impl RedpandaDeadLetterSink {
    pub fn new(client: Arc<RedpandaClient>, topic: impl Into<String>) -> Self {
        Self {
            client,
            topic: topic.into(),
        }
    }
}

#[async_trait]
impl DeadLetterSink for RedpandaDeadLetterSink {
    async fn send(&self, key: &str, payload: &[u8]) -> Result<(), DeliveryError> {
        self.client
            .publish(&self.topic, key, payload)
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError::Send {
                destination: self.topic.clone(),
                reason: e.to_string(),
            })
    }

    fn destination(&self) -> &str {
        &self.topic
    }
}
