// Private module declaration
mod server;

use prometheus::{
    Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Orders aggregated and their processing latency
// - Retry attempts by outcome
// - Dead Letter Queue traffic and delivery failures
// - Undecodable records skipped by the source
// - The running average itself
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the order stream
pub struct Metrics {
    registry: Registry,

    // Processing Metrics
    pub orders_processed: IntCounter,
    pub processing_duration: Histogram,
    pub running_average: Gauge,
    pub orders_undecodable: IntCounter,

    // Retry Metrics
    pub retry_attempts_total: IntCounterVec,

    // DLQ Metrics
    pub dlq_messages_total: IntCounter,
    pub dlq_delivery_failures: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Processing Metrics
        let orders_processed = IntCounter::new(
            "orders_processed_total",
            "Total orders folded into the running aggregate",
        )?;
        registry.register(Box::new(orders_processed.clone()))?;

        let processing_duration = Histogram::with_opts(
            HistogramOpts::new(
                "order_processing_duration_seconds",
                "Time from first attempt to aggregation, backoff included",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        )?;
        registry.register(Box::new(processing_duration.clone()))?;

        let running_average = Gauge::new(
            "orders_running_average",
            "Running average price over aggregated orders",
        )?;
        registry.register(Box::new(running_average.clone()))?;

        let orders_undecodable = IntCounter::new(
            "orders_undecodable_total",
            "Source records skipped because their value is not an order",
        )?;
        registry.register(Box::new(orders_undecodable.clone()))?;

        // Retry Metrics
        let retry_attempts_total = IntCounterVec::new(
            Opts::new("retry_attempts_total", "Processing attempts by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(retry_attempts_total.clone()))?;

        // DLQ Metrics
        let dlq_messages_total = IntCounter::new(
            "orders_dead_lettered_total",
            "Total orders delivered to the dead letter stream",
        )?;
        registry.register(Box::new(dlq_messages_total.clone()))?;

        let dlq_delivery_failures = IntCounter::new(
            "dlq_delivery_failures_total",
            "Orders that failed processing and could not be dead-lettered",
        )?;
        registry.register(Box::new(dlq_delivery_failures.clone()))?;

        Ok(Self {
            registry,
            orders_processed,
            processing_duration,
            running_average,
            orders_undecodable,
            retry_attempts_total,
            dlq_messages_total,
            dlq_delivery_failures,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record one processing attempt
    pub fn record_attempt(&self, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        self.retry_attempts_total.with_label_values(&[outcome]).inc();
    }

    /// Helper to record an aggregated order
    pub fn record_processed(&self, duration_secs: f64, average: f64) {
        self.orders_processed.inc();
        self.processing_duration.observe(duration_secs);
        self.running_average.set(average);
    }

    pub fn record_dlq_message(&self) {
        self.dlq_messages_total.inc();
    }

    pub fn record_dlq_delivery_failure(&self) {
        self.dlq_delivery_failures.inc();
    }

    pub fn record_undecodable(&self) {
        self.orders_undecodable.inc();
    }
}
