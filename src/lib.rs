// ============================================================================
// order_stream - bounded at-least-once order processing
// ============================================================================
//
// A producer emits synthetic orders onto a stream; the consumer pipeline
// processes each one with bounded retry, aggregates the successes into a
// running average and routes permanent failures to a dead-letter stream.
//
// Layout:
// - domain/    - Order, AggregateState, Processor (no transport knowledge)
// - utils/     - fixed backoff retry
// - consumer/  - ProcessingPipeline, DeadLetterRouter, OrderSource
// - messaging/ - Redpanda/Kafka implementations of the consumer traits
// - producer/  - random order generator and publish loop
// - metrics/   - Prometheus registry and HTTP exposition
//
// ============================================================================

pub mod config;
pub mod consumer;
pub mod domain;
pub mod messaging;
pub mod metrics;
pub mod producer;
pub mod telemetry;
pub mod utils;

pub use config::{Config, ConfigError};
