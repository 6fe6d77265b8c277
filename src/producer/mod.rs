use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tokio::sync::watch;

use crate::domain::order::{Order, OrderError};
use crate::messaging::{MessagingError, RedpandaClient};

// ============================================================================
// Order Producer - synthetic event source
// ============================================================================
//
// Emits one random order per interval onto the source stream, keyed by its
// order id. Ids count up from 1001; prices are uniform in [10, 110), so a
// share of orders lands above the processing ceiling and exercises the
// dead-letter path downstream.
//
// ============================================================================

/// Where generated orders are written
#[async_trait]
pub trait OrderPublisher: Send + Sync {
    /// Write one keyed record and wait for it to be acknowledged
    async fn publish_order(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), MessagingError>;
}

#[async_trait]
impl OrderPublisher for RedpandaClient {
    async fn publish_order(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), MessagingError> {
        self.publish(topic, key, payload).await.map(|_| ())
    }
}

const FIRST_ORDER_ID: u64 = 1001;
const MIN_PRICE: f64 = 10.0;
const PRICE_SPAN: f64 = 100.0;
const ITEM_VARIANTS: u32 = 5;

pub struct OrderGenerator<R> {
    rng: R,
    next_id: u64,
}

impl OrderGenerator<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for OrderGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> OrderGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            next_id: FIRST_ORDER_ID,
        }
    }

    pub fn next_order(&mut self) -> Result<Order, OrderError> {
        let order_id = self.next_id.to_string();
        self.next_id += 1;

        let item = self.rng.gen_range(1..=ITEM_VARIANTS);
        let price = MIN_PRICE + self.rng.gen::<f64>() * PRICE_SPAN;

        Order::new(order_id, format!("Item{item}"), price)
    }
}

/// Publish generated orders until `shutdown` reads `true`.
///
/// A failed send is logged and the producer moves on to the next order.
/// Returns the number of acknowledged sends.
pub async fn run_producer<P: OrderPublisher, R: Rng>(
    publisher: &P,
    topic: &str,
    interval: Duration,
    mut generator: OrderGenerator<R>,
    shutdown: watch::Receiver<bool>,
) -> u64 {
    let mut sent = 0;

    while !*shutdown.borrow() {
        match generator.next_order() {
            Ok(order) => {
                if publish_order(publisher, topic, &order).await {
                    sent += 1;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to generate order");
            }
        }

        tokio::time::sleep(interval).await;
    }

    sent
}

async fn publish_order<P: OrderPublisher>(publisher: &P, topic: &str, order: &Order) -> bool {
    let payload = match order.to_json() {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(error = %e, order_id = %order.order_id(), "Failed to encode order");
            return false;
        }
    };

    match publisher
        .publish_order(topic, order.order_id(), payload.as_bytes())
        .await
    {
        Ok(_) => {
            tracing::info!(
                order_id = %order.order_id(),
                price = order.price(),
                "Sent Order: {} Price: {:.2}",
                order.order_id(),
                order.price()
            );
            true
        }
        Err(e) => {
            tracing::error!(error = %e, order_id = %order.order_id(), "Failed to send order");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every send, rejects one key and stops the loop after
    /// `stop_after` sends
    struct ScriptedPublisher {
        sent: Mutex<Vec<(String, String, Vec<u8>)>>,
        reject_key: &'static str,
        stop_after: usize,
        shutdown: watch::Sender<bool>,
    }

    #[async_trait]
    impl OrderPublisher for ScriptedPublisher {
        async fn publish_order(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), MessagingError> {
            let mut sent = self.sent.lock().unwrap();
            sent.push((topic.to_string(), key.to_string(), payload.to_vec()));
            if sent.len() >= self.stop_after {
                let _ = self.shutdown.send(true);
            }
            if key == self.reject_key {
                return Err(MessagingError::Publish {
                    topic: topic.to_string(),
                    reason: "leader not available".to_string(),
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_run_producer_publishes_keyed_orders_until_shutdown() {
        let (tx, rx) = watch::channel(false);
        let publisher = ScriptedPublisher {
            sent: Mutex::new(Vec::new()),
            reject_key: "1002",
            stop_after: 3,
            shutdown: tx,
        };

        let acknowledged = run_producer(
            &publisher,
            "orders",
            Duration::from_millis(1),
            OrderGenerator::with_rng(StdRng::seed_from_u64(11)),
            rx,
        )
        .await;

        // The rejected send is skipped, not retried
        assert_eq!(acknowledged, 2);
        let sent = publisher.sent.lock().unwrap();
        let keys: Vec<&str> = sent.iter().map(|(_, key, _)| key.as_str()).collect();
        assert_eq!(keys, vec!["1001", "1002", "1003"]);
        for (topic, key, payload) in sent.iter() {
            assert_eq!(topic, "orders");
            let order = Order::from_json(payload).unwrap();
            assert_eq!(order.order_id(), key);
        }
    }

    #[tokio::test]
    async fn test_run_producer_sends_nothing_when_already_shut_down() {
        let (tx, rx) = watch::channel(true);
        let publisher = ScriptedPublisher {
            sent: Mutex::new(Vec::new()),
            reject_key: "",
            stop_after: 1,
            shutdown: tx,
        };

        let acknowledged = run_producer(&publisher, "orders", Duration::ZERO, OrderGenerator::new(), rx).await;

        assert_eq!(acknowledged, 0);
        assert!(publisher.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_ids_count_up_from_1001() {
        let mut generator = OrderGenerator::with_rng(StdRng::seed_from_u64(7));

        let ids: Vec<String> = (0..3).map(|_| generator.next_order().unwrap().order_id().to_string()).collect();
        assert_eq!(ids, vec!["1001", "1002", "1003"]);
    }

    #[test]
    fn test_generated_orders_stay_in_range() {
        let mut generator = OrderGenerator::with_rng(StdRng::seed_from_u64(42));

        for _ in 0..1_000 {
            let order = generator.next_order().unwrap();
            assert!(order.price() >= 10.0 && order.price() < 110.0);
            let item: u32 = order.item_name().trim_start_matches("Item").parse().unwrap();
            assert!((1..=5).contains(&item));
        }
    }

    #[test]
    fn test_same_seed_same_orders() {
        let mut a = OrderGenerator::with_rng(StdRng::seed_from_u64(3));
        let mut b = OrderGenerator::with_rng(StdRng::seed_from_u64(3));
        assert_eq!(a.next_order().unwrap(), b.next_order().unwrap());
    }
}
