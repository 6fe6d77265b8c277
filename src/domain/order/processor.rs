use super::errors::ProcessingError;
use super::value_objects::Order;

// ============================================================================
// Order Processor - the unit of work executed on every attempt
// ============================================================================
//
// The pipeline calls `process` once per attempt. Returning `Ok` lets the order
// be folded into the aggregate; returning `Err` counts as a failed attempt.
// Any `FnMut(&Order, u32) -> Result<(), ProcessingError>` closure is a
// processor, which lets tests script arbitrary success/failure sequences.
//
// ============================================================================

/// Default ceiling above which `PriceCeiling` rejects an order
pub const DEFAULT_PRICE_CEILING: f64 = 100.0;

pub trait Processor: Send {
    /// Run one attempt. `attempt` starts at 1.
    fn process(&mut self, order: &Order, attempt: u32) -> Result<(), ProcessingError>;
}

impl<F> Processor for F
where
    F: FnMut(&Order, u32) -> Result<(), ProcessingError> + Send,
{
    fn process(&mut self, order: &Order, attempt: u32) -> Result<(), ProcessingError> {
        self(order, attempt)
    }
}

/// Deterministic fault injector: fails every attempt for orders priced
/// strictly above the ceiling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceCeiling {
    pub ceiling: f64,
}

impl PriceCeiling {
    pub fn new(ceiling: f64) -> Self {
        Self { ceiling }
    }
}

impl Default for PriceCeiling {
    fn default() -> Self {
        Self::new(DEFAULT_PRICE_CEILING)
    }
}

impl Processor for PriceCeiling {
    fn process(&mut self, order: &Order, _attempt: u32) -> Result<(), ProcessingError> {
        if order.price() > self.ceiling {
            return Err(ProcessingError::PriceAboveCeiling {
                price: order.price(),
                ceiling: self.ceiling,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(price: f64) -> Order {
        Order::new("1001", "Item1", price).unwrap()
    }

    #[test]
    fn test_price_ceiling_boundary_is_inclusive() {
        let mut ceiling = PriceCeiling::default();
        assert!(ceiling.process(&order(100.0), 1).is_ok());
        assert!(ceiling.process(&order(99.99), 1).is_ok());
    }

    #[test]
    fn test_price_ceiling_rejects_above() {
        let mut ceiling = PriceCeiling::default();
        let err = ceiling.process(&order(100.01), 1).unwrap_err();
        assert_eq!(
            err,
            ProcessingError::PriceAboveCeiling { price: 100.01, ceiling: 100.0 }
        );
    }

    #[test]
    fn test_closure_is_a_processor() {
        let mut calls = Vec::new();
        let mut processor = |o: &Order, attempt: u32| {
            calls.push((o.order_id().to_string(), attempt));
            if attempt < 2 {
                Err(ProcessingError::Rejected("flaky".into()))
            } else {
                Ok(())
            }
        };

        assert!(processor.process(&order(1.0), 1).is_err());
        assert!(processor.process(&order(1.0), 2).is_ok());
        drop(processor);
        assert_eq!(calls, vec![("1001".to_string(), 1), ("1001".to_string(), 2)]);
    }
}
