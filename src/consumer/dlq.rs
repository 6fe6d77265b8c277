use async_trait::async_trait;
use std::sync::Arc;

use super::source::SourceRecord;
use crate::metrics::Metrics;

// ============================================================================
// Dead Letter Router
// ============================================================================
//
// Orders that exhaust their retries are forwarded, with their original key and
// payload, to a destination separate from the source stream. The send itself
// is not retried. If it fails the order has failed both processing and
// dead-lettering: that is logged at error level and counted, and reported back
// to the caller as `RouteResult::DeliveryFailed`.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("Dead-letter send to {destination} failed: {reason}")]
    Send { destination: String, reason: String },
}

/// Destination for permanently failed orders
#[async_trait]
pub trait DeadLetterSink: Send + Sync {
    /// Deliver `payload` under `key`, byte for byte
    async fn send(&self, key: &str, payload: &[u8]) -> Result<(), DeliveryError>;

    /// Name of the destination, for diagnostics
    fn destination(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteResult {
    Delivered,
    DeliveryFailed(String),
}

impl RouteResult {
    pub fn is_delivered(&self) -> bool {
        matches!(self, RouteResult::Delivered)
    }
}

pub struct DeadLetterRouter<D> {
    sink: D,
    metrics: Option<Arc<Metrics>>,
}

impl<D: DeadLetterSink> DeadLetterRouter<D> {
    pub fn new(sink: D) -> Self {
        Self { sink, metrics: None }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    pub async fn route(&self, record: &SourceRecord) -> RouteResult {
        let key = record.key.as_str();
        let order = &record.order;

        tracing::error!(
            key = %key,
            order_id = %order.order_id(),
            destination = %self.sink.destination(),
            "Message permanently failed. Moving to DLQ: {}",
            key
        );

        match self.sink.send(key, &record.payload).await {
            Ok(()) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_dlq_message();
                }
                tracing::info!(
                    key = %key,
                    destination = %self.sink.destination(),
                    "Message stored in DLQ"
                );
                RouteResult::Delivered
            }
            Err(e) => {
                if let Some(metrics) = &self.metrics {
                    metrics.record_dlq_delivery_failure();
                }
                tracing::error!(
                    error = %e,
                    key = %key,
                    order_id = %order.order_id(),
                    destination = %self.sink.destination(),
                    "💀 Dead-letter delivery failed; order is unrecoverable"
                );
                RouteResult::DeliveryFailed(e.to_string())
            }
        }
    }
}
