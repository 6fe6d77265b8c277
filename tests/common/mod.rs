//! In-memory source and dead-letter sink for driving the pipeline in tests

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use order_stream::consumer::{DeadLetterSink, DeliveryError, OrderSource, SourceError, SourceRecord};
use order_stream::domain::order::Order;

#[derive(Default)]
pub struct MemorySource {
    batches: VecDeque<Vec<SourceRecord>>,
    pub acknowledged: Vec<String>,
}

impl MemorySource {
    pub fn with_batches(batches: Vec<Vec<SourceRecord>>) -> Self {
        Self {
            batches: batches.into(),
            acknowledged: Vec::new(),
        }
    }
}

#[async_trait]
impl OrderSource for MemorySource {
    async fn poll_batch(&mut self, timeout: Duration) -> Result<Vec<SourceRecord>, SourceError> {
        match self.batches.pop_front() {
            Some(batch) => Ok(batch),
            None => {
                // Nothing left: behave like a bounded poll that timed out
                tokio::time::sleep(timeout).await;
                Ok(Vec::new())
            }
        }
    }

    fn acknowledge(&mut self, record: &SourceRecord) -> Result<(), SourceError> {
        self.acknowledged.push(record.key.clone());
        Ok(())
    }
}

/// Dead-letter sink whose contents stay inspectable after the pipeline is
/// consumed by `run`
#[derive(Clone, Default)]
pub struct MemoryDeadLetters {
    pub records: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl MemoryDeadLetters {
    pub fn snapshot(&self) -> Vec<(String, Vec<u8>)> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeadLetterSink for MemoryDeadLetters {
    async fn send(&self, key: &str, payload: &[u8]) -> Result<(), DeliveryError> {
        self.records.lock().unwrap().push((key.to_string(), payload.to_vec()));
        Ok(())
    }

    fn destination(&self) -> &str {
        "orders-dlq"
    }
}

pub fn record(id: &str, price: f64) -> SourceRecord {
    SourceRecord::new(id, Order::new(id, format!("Item-{id}"), price).unwrap()).unwrap()
}
