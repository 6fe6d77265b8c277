use async_trait::async_trait;
use futures_util::FutureExt;
use rdkafka::{
    config::ClientConfig,
    consumer::{Consumer, StreamConsumer},
    message::{Message, OwnedMessage},
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::redpanda::MessagingError;
use crate::consumer::{OrderSource, RecordPosition, SourceError, SourceRecord};
use crate::domain::order::OrderError;
use crate::metrics::Metrics;

// ============================================================================
// Redpanda Order Source
// ============================================================================
//
// Kafka-protocol consumer feeding the pipeline.
//
// Delivery is at-least-once: automatic offset *storing* is off, so the client
// only commits offsets the pipeline has explicitly acknowledged. Auto-commit
// then flushes those stored offsets in the background.
//
// A poll waits up to the timeout for the first record, then drains whatever
// is already buffered without waiting again, up to `max_batch` records.
//
// Records that do not decode as orders never reach the pipeline, but their
// offsets must not be stored ahead of decoded records still in flight. Each
// skip waits for the decoded record before it on its partition to be
// acknowledged, so stored offsets only ever move forward.
//
// ============================================================================

/// Records per poll.
///
/// The pipeline does not poll librdkafka while it works through a batch. A
/// batch of failing orders costs the retry backoff plus a dead-letter send
/// per record, and the whole batch has to fit in `MAX_POLL_INTERVAL_MS` or
/// the group evicts this consumer.
pub const DEFAULT_MAX_BATCH: usize = 32;

/// librdkafka `max.poll.interval.ms`, set explicitly to its default
pub const MAX_POLL_INTERVAL_MS: u64 = 300_000;

/// A record dropped from a batch because it is not an order
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub position: RecordPosition,
    pub reason: String,
    /// Offset of the last decoded record ahead of it on the same partition
    pub after: Option<i64>,
}

/// A polled batch split into orders and skips, both in arrival order
#[derive(Debug, Default)]
pub struct DecodedBatch {
    pub records: Vec<SourceRecord>,
    pub skipped: Vec<SkippedRecord>,
}

/// Decode raw `(key, value, position)` triples in arrival order.
pub fn decode_batch<'a, I>(messages: I) -> DecodedBatch
where
    I: IntoIterator<Item = (Option<&'a [u8]>, Option<&'a [u8]>, RecordPosition)>,
{
    let mut batch = DecodedBatch::default();
    let mut last_decoded: HashMap<(String, i32), i64> = HashMap::new();

    for (key, payload, position) in messages {
        let partition = (position.topic.clone(), position.partition);

        match decode_record(key, payload, position.clone()) {
            Ok(record) => {
                last_decoded.insert(partition, position.offset);
                batch.records.push(record);
            }
            Err(e) => batch.skipped.push(SkippedRecord {
                after: last_decoded.get(&partition).copied(),
                reason: e.to_string(),
                position,
            }),
        }
    }

    batch
}

/// Build a `SourceRecord` from raw key/value bytes.
///
/// A missing key falls back to the order id so dead-lettered copies are
/// always keyed.
pub fn decode_record(
    key: Option<&[u8]>,
    payload: Option<&[u8]>,
    position: RecordPosition,
) -> Result<SourceRecord, OrderError> {
    let payload = payload.ok_or_else(|| OrderError::Malformed("empty record value".to_string()))?;
    let mut record = SourceRecord::decode(String::new(), payload.to_vec())?;

    record.key = match key {
        Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        None => record.order.order_id().to_string(),
    };

    Ok(record.with_position(position))
}

/// Skips waiting for their offsets to be stored
#[derive(Debug, Default)]
struct SkipLedger {
    pending: Vec<SkippedRecord>,
}

impl SkipLedger {
    /// Take the skips of a new batch, replacing any left from the last one.
    /// Returns the positions that have no decoded record to wait for.
    fn admit(&mut self, skipped: Vec<SkippedRecord>) -> Vec<RecordPosition> {
        if !self.pending.is_empty() {
            tracing::debug!(
                dropped = self.pending.len(),
                "Dropping skips whose preceding record was never acknowledged"
            );
        }

        let (ready, pending): (Vec<_>, Vec<_>) = skipped.into_iter().partition(|s| s.after.is_none());
        self.pending = pending;
        ready.into_iter().map(|s| s.position).collect()
    }

    /// Positions unblocked by acknowledging `acknowledged`
    fn release(&mut self, acknowledged: &RecordPosition) -> Vec<RecordPosition> {
        let (ready, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|s| {
                s.position.topic == acknowledged.topic
                    && s.position.partition == acknowledged.partition
                    && s.after == Some(acknowledged.offset)
            });
        self.pending = pending;
        ready.into_iter().map(|s| s.position).collect()
    }
}

fn note_skips(skipped: &[SkippedRecord], metrics: Option<&Metrics>) {
    for skip in skipped {
        tracing::warn!(
            error = %skip.reason,
            topic = %skip.position.topic,
            partition = skip.position.partition,
            offset = skip.position.offset,
            "Skipping undecodable record"
        );
        if let Some(metrics) = metrics {
            metrics.record_undecodable();
        }
    }
}

fn position_of(message: &OwnedMessage) -> RecordPosition {
    RecordPosition {
        topic: message.topic().to_string(),
        partition: message.partition(),
        offset: message.offset(),
    }
}

pub struct RedpandaOrderSource {
    consumer: StreamConsumer,
    max_batch: usize,
    skips: SkipLedger,
    metrics: Option<Arc<Metrics>>,
}

impl RedpandaOrderSource {
    pub fn new(brokers: &str, group_id: &str, topic: &str) -> Result<Self, MessagingError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "true")
            .set("enable.auto.offset.store", "false")
            .set("auto.offset.reset", "earliest")
            .set("max.poll.interval.ms", MAX_POLL_INTERVAL_MS.to_string())
            .create()?;

        consumer.subscribe(&[topic])?;

        tracing::info!(
            brokers = %brokers,
            group_id = %group_id,
            topic = %topic,
            "Subscribed to source stream"
        );

        Ok(Self {
            consumer,
            max_batch: DEFAULT_MAX_BATCH,
            skips: SkipLedger::default(),
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn store_offset(&self, position: &RecordPosition) -> Result<(), SourceError> {
        self.consumer
            .store_offset(&position.topic, position.partition, position.offset)
            .map_err(|e| SourceError::Acknowledge {
                topic: position.topic.clone(),
                partition: position.partition,
                offset: position.offset,
                reason: e.to_string(),
            })
    }

    fn store_skips(&self, positions: Vec<RecordPosition>) -> Result<(), SourceError> {
        for position in positions {
            self.store_offset(&position)?;
        }
        Ok(())
    }
}

#[async_trait]
impl OrderSource for RedpandaOrderSource {
    async fn poll_batch(&mut self, timeout: Duration) -> Result<Vec<SourceRecord>, SourceError> {
        let first = match tokio::time::timeout(timeout, self.consumer.recv()).await {
            Err(_elapsed) => return Ok(Vec::new()),
            Ok(received) => received.map_err(|e| SourceError::Poll(e.to_string()))?,
        };

        let mut messages = vec![first.detach()];
        while messages.len() < self.max_batch {
            match self.consumer.recv().now_or_never() {
                Some(Ok(message)) => messages.push(message.detach()),
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Consumer error while draining batch");
                    break;
                }
                None => break,
            }
        }

        let decoded = decode_batch(
            messages
                .iter()
                .map(|m| (m.key(), m.payload(), position_of(m))),
        );

        note_skips(&decoded.skipped, self.metrics.as_deref());
        let ready = self.skips.admit(decoded.skipped);
        if let Err(e) = self.store_skips(ready) {
            tracing::error!(error = %e, "Failed to skip undecodable record");
        }

        Ok(decoded.records)
    }

    fn acknowledge(&mut self, record: &SourceRecord) -> Result<(), SourceError> {
        let Some(position) = &record.position else {
            return Ok(());
        };

        self.store_offset(position)?;
        let released = self.skips.release(position);
        self.store_skips(released)
    }
}
