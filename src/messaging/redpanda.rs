use rdkafka::{
    config::ClientConfig,
    error::KafkaError,
    producer::{FutureProducer, FutureRecord},
};
use std::time::Duration;

/// Upper bound on waiting for one broker acknowledgement
pub const SEND_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum MessagingError {
    #[error("Failed to create Redpanda client: {0}")]
    Client(#[from] KafkaError),

    #[error("Kafka send error on {topic}: {reason}")]
    Publish { topic: String, reason: String },
}

/// Thin producer shared by the dead-letter sink and the order producer
pub struct RedpandaClient {
    producer: FutureProducer,
}

impl RedpandaClient {
    pub fn new(brokers: &str) -> Result<Self, MessagingError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        tracing::debug!(brokers = %brokers, "Redpanda producer created");

        Ok(Self { producer })
    }

    /// Send one record and wait for the broker acknowledgement.
    ///
    /// Returns the partition and offset the record was written to.
    pub async fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: &[u8],
    ) -> Result<(i32, i64), MessagingError> {
        let record = FutureRecord::to(topic).key(key).payload(payload);

        match self
            .producer
            .send(record, rdkafka::util::Timeout::After(SEND_TIMEOUT))
            .await
        {
            Ok(rdkafka::producer::future_producer::Delivery {
                partition, offset, ..
            }) => {
                tracing::debug!(
                    topic = %topic,
                    key = %key,
                    partition = partition,
                    offset = offset,
                    "Published to Redpanda"
                );
                Ok((partition, offset))
            }
            Err((e, _)) => {
                tracing::error!(
                    error = %e,
                    topic = %topic,
                    key = %key,
                    "Failed to publish to Redpanda"
                );
                Err(MessagingError::Publish {
                    topic: topic.to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }
}
