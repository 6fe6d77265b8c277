// ============================================================================
// Consumer Module
// ============================================================================
//
// The core of the order stream: per-record retry, dead-lettering and
// aggregation.
//
// Structure:
// - source   - OrderSource trait, SourceRecord, batch poll contract
// - dlq      - DeadLetterSink trait and DeadLetterRouter
// - pipeline - ProcessingPipeline driving retry -> aggregate | dead-letter
//
// Transport implementations of the traits live in `messaging`.
//
// ============================================================================

mod dlq;
mod pipeline;
mod source;

pub use dlq::{DeadLetterRouter, DeadLetterSink, DeliveryError, RouteResult};
pub use pipeline::{BatchReport, Fate, PipelineSummary, ProcessingPipeline};
pub use source::{OrderSource, RecordPosition, SourceError, SourceRecord, DEFAULT_POLL_TIMEOUT};
