// ============================================================================
// Order Domain - Business Logic for Order Processing
// ============================================================================
//
// This module contains ALL Order-specific code:
// - Value objects (Order)
// - Errors (OrderError, ProcessingError)
// - Aggregate (AggregateState running statistics)
// - Processor (per-attempt processing step, PriceCeiling fault predicate)
//
// Nothing here knows about the stream transport.
//
// ============================================================================

pub mod value_objects;
pub mod errors;
pub mod aggregate;
pub mod processor;

// Re-export for convenience
pub use value_objects::*;
pub use errors::*;
pub use aggregate::*;
pub use processor::*;
