use async_trait::async_trait;
use std::time::Duration;

use crate::domain::order::{Order, OrderError};

// ============================================================================
// Order Source - batch pull side of the pipeline
// ============================================================================
//
// A source hands out batches of records with a bounded wait per poll. Once the
// pipeline has taken a record to its terminal fate it acknowledges it, and
// only acknowledged records are considered consumed. A crash between poll and
// acknowledgement therefore leads to redelivery, never to loss.
//
// ============================================================================

/// How long a single poll may wait for the first record
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Where a record sits in the source stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPosition {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

/// One consumed record: the routing key, the value bytes as received and
/// the order decoded from them
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    pub key: String,
    pub payload: Vec<u8>,
    pub order: Order,
    pub position: Option<RecordPosition>,
}

impl SourceRecord {
    /// Record for an order built in process; the payload is its encoding
    pub fn new(key: impl Into<String>, order: Order) -> Result<Self, OrderError> {
        let payload = order.to_json()?.into_bytes();
        Ok(Self {
            key: key.into(),
            payload,
            order,
            position: None,
        })
    }

    /// Record for value bytes read off a stream. The bytes are kept as they
    /// are so a dead-lettered copy matches the original exactly.
    pub fn decode(key: impl Into<String>, payload: Vec<u8>) -> Result<Self, OrderError> {
        let order = Order::from_json(&payload)?;
        Ok(Self {
            key: key.into(),
            payload,
            order,
            position: None,
        })
    }

    pub fn with_position(mut self, position: RecordPosition) -> Self {
        self.position = Some(position);
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to poll source stream: {0}")]
    Poll(String),

    #[error("Failed to acknowledge {topic}/{partition}@{offset}: {reason}")]
    Acknowledge {
        topic: String,
        partition: i32,
        offset: i64,
        reason: String,
    },
}

#[async_trait]
pub trait OrderSource: Send {
    /// Pull the next batch. An empty batch means nothing arrived within
    /// `timeout`.
    async fn poll_batch(&mut self, timeout: Duration) -> Result<Vec<SourceRecord>, SourceError>;

    /// Mark a record as fully handled
    fn acknowledge(&mut self, record: &SourceRecord) -> Result<(), SourceError>;
}
