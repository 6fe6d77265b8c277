// ============================================================================
// Order Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order id cannot be empty")]
    EmptyOrderId,

    #[error("Invalid order price: {0}")]
    InvalidPrice(f64),

    #[error("Malformed order payload: {0}")]
    Malformed(String),
}

/// Failure of a single processing attempt.
///
/// Every variant is treated as transient by the retry executor; an order only
/// leaves the retry loop through success or exhaustion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProcessingError {
    #[error("Simulated Processing Error: price {price} exceeds {ceiling}")]
    PriceAboveCeiling { price: f64, ceiling: f64 },

    #[error("Processing rejected: {0}")]
    Rejected(String),
}
