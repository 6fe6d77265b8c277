use std::fmt;

use super::value_objects::Order;

// ============================================================================
// Order Aggregate - Running Statistics
// ============================================================================
//
// Cumulative sum and count over every successfully processed order. The state
// is a plain value owned by whoever drives the pipeline; there is exactly one
// writer, so no locking is involved. Nothing is evicted or decayed and the
// count only ever grows.
//
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateState {
    total_sum: f64,
    count: u64,
}

/// State of the aggregate right after one order was recorded
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSnapshot {
    pub order_id: String,
    pub price: f64,
    pub total_sum: f64,
    pub count: u64,
    pub average: f64,
}

impl AggregateState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_sum(&self) -> f64 {
        self.total_sum
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Running average, `None` until the first order is recorded
    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.total_sum / self.count as f64)
    }

    /// Fold one successfully processed order into the running totals.
    ///
    /// `count` is at least 1 once incremented, so the average below never
    /// divides by zero.
    pub fn record(&mut self, order: &Order) -> AggregateSnapshot {
        self.total_sum += order.price();
        self.count += 1;

        AggregateSnapshot {
            order_id: order.order_id().to_string(),
            price: order.price(),
            total_sum: self.total_sum,
            count: self.count,
            average: self.total_sum / self.count as f64,
        }
    }
}

impl fmt::Display for AggregateSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order: {} | Price: {:.2} | Running Avg: {:.2}",
            self.order_id, self.price, self.average
        )
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str, price: f64) -> Order {
        Order::new(id, "Item1", price).unwrap()
    }

    #[test]
    fn test_empty_state_has_no_average() {
        let state = AggregateState::new();
        assert_eq!(state.count(), 0);
        assert_eq!(state.total_sum(), 0.0);
        assert_eq!(state.average(), None);
    }

    #[test]
    fn test_record_accumulates() {
        let mut state = AggregateState::new();

        let first = state.record(&order("1001", 55.0));
        assert_eq!(first.count, 1);
        assert_eq!(first.average, 55.0);

        let second = state.record(&order("1003", 30.0));
        assert_eq!(second.count, 2);
        assert_eq!(second.total_sum, 85.0);
        assert_eq!(second.average, 42.5);
        assert_eq!(state.average(), Some(42.5));
    }

    #[test]
    fn test_zero_price_still_counts() {
        let mut state = AggregateState::new();
        state.record(&order("1", 10.0));
        let snapshot = state.record(&order("2", 0.0));

        assert_eq!(snapshot.count, 2);
        assert_eq!(snapshot.average, 5.0);
    }

    #[test]
    fn test_snapshot_display() {
        let mut state = AggregateState::new();
        state.record(&order("1001", 55.0));
        let snapshot = state.record(&order("1003", 30.126));

        assert_eq!(
            snapshot.to_string(),
            "Order: 1003 | Price: 30.13 | Running Avg: 42.56"
        );
    }
}
