// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Domain types for the order stream. Transport, retry and dead-letter
// plumbing live outside this layer and only see these types.
//
// ============================================================================

pub mod order;
