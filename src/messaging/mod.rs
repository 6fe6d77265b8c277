// ============================================================================
// Messaging - Redpanda/Kafka transport for the order stream
// ============================================================================

mod consumer;
mod dead_letter;
mod redpanda;

pub use consumer::{
    decode_batch, decode_record, DecodedBatch, RedpandaOrderSource, SkippedRecord, DEFAULT_MAX_BATCH,
    MAX_POLL_INTERVAL_MS,
};
pub use dead_letter::RedpandaDeadLetterSink;
pub use redpanda::{MessagingError, RedpandaClient, SEND_TIMEOUT};
