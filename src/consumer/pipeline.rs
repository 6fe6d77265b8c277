use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

use super::dlq::{DeadLetterRouter, DeadLetterSink, RouteResult};
use super::source::{OrderSource, SourceError, SourceRecord, DEFAULT_POLL_TIMEOUT};
use crate::domain::order::{AggregateSnapshot, AggregateState, ProcessingError, Processor};
use crate::metrics::Metrics;
use crate::utils::{retry_with_backoff, RetryPolicy, RetryResult};

// ============================================================================
// Processing Pipeline
// ============================================================================
//
// Per record:
//   Received -> Attempting -> Aggregated | DeadLettered
//
// 1. The processor runs under the retry policy. A successful attempt folds
//    the order into the aggregate before the attempt returns.
// 2. Exhaustion hands the record, unchanged, to the dead-letter router.
// 3. The record is acknowledged to the source once it has a terminal fate.
//
// Records are handled one at a time in batch order by a single task. The
// aggregate is owned here and mutated through `&mut self` only, so there is
// one writer and no lock. A backoff stalls the whole pipeline, which is
// accepted at this scale.
//
// ============================================================================

/// Terminal fate of one record
#[derive(Debug, Clone, PartialEq)]
pub enum Fate {
    Aggregated(AggregateSnapshot),
    DeadLettered {
        attempts: u32,
        last_error: ProcessingError,
        route: RouteResult,
    },
}

impl Fate {
    pub fn is_aggregated(&self) -> bool {
        matches!(self, Fate::Aggregated(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub aggregated: usize,
    pub dead_lettered: usize,
    /// Dead-lettered records whose dead-letter send failed
    pub dead_letter_failures: usize,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.aggregated + self.dead_lettered
    }
}

/// Totals returned when `run` stops
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineSummary {
    pub batches: u64,
    pub aggregated: u64,
    pub dead_lettered: u64,
    pub dead_letter_failures: u64,
    pub aggregate: AggregateState,
}

pub struct ProcessingPipeline<S, D, P> {
    source: S,
    router: DeadLetterRouter<D>,
    processor: P,
    policy: RetryPolicy,
    poll_timeout: Duration,
    state: AggregateState,
    metrics: Option<Arc<Metrics>>,
    summary: PipelineSummary,
}

impl<S, D, P> ProcessingPipeline<S, D, P>
where
    S: OrderSource,
    D: DeadLetterSink,
    P: Processor,
{
    pub fn new(source: S, dead_letters: D, processor: P) -> Self {
        Self {
            source,
            router: DeadLetterRouter::new(dead_letters),
            processor,
            policy: RetryPolicy::default(),
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            state: AggregateState::new(),
            metrics: None,
            summary: PipelineSummary::default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.router = self.router.with_metrics(metrics.clone());
        self.metrics = Some(metrics);
        self
    }

    pub fn state(&self) -> &AggregateState {
        &self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn dead_letters(&self) -> &D {
        self.router.sink()
    }

    /// Take one record to its terminal fate. Does not acknowledge it.
    pub async fn process_record(&mut self, record: &SourceRecord) -> Fate {
        let started = Instant::now();
        let order = &record.order;

        let processor = &mut self.processor;
        let state = &mut self.state;
        let metrics = self.metrics.as_deref();

        let result = retry_with_backoff(&self.policy, |attempt| {
            let outcome = processor
                .process(order, attempt)
                .map(|()| state.record(order));
            if let Some(metrics) = metrics {
                metrics.record_attempt(outcome.is_ok());
            }
            outcome
        })
        .await;

        match result {
            RetryResult::Success { value: snapshot, .. } => {
                tracing::info!(
                    order_id = %snapshot.order_id,
                    price = snapshot.price,
                    average = snapshot.average,
                    count = snapshot.count,
                    "{}",
                    snapshot
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_processed(started.elapsed().as_secs_f64(), snapshot.average);
                }
                Fate::Aggregated(snapshot)
            }
            RetryResult::Exhausted { last_error, attempts } => {
                tracing::debug!(
                    key = %record.key,
                    attempts = attempts,
                    error = %last_error,
                    "Retries exhausted"
                );
                let route = self.router.route(record).await;
                Fate::DeadLettered {
                    attempts,
                    last_error,
                    route,
                }
            }
        }
    }

    /// Process a pulled batch in order, acknowledging each record after its
    /// fate is decided.
    pub async fn process_batch(&mut self, batch: Vec<SourceRecord>) -> BatchReport {
        let mut report = BatchReport::default();

        for record in batch {
            match self.process_record(&record).await {
                Fate::Aggregated(_) => report.aggregated += 1,
                Fate::DeadLettered { route, .. } => {
                    report.dead_lettered += 1;
                    if !route.is_delivered() {
                        report.dead_letter_failures += 1;
                    }
                }
            }

            if let Err(e) = self.source.acknowledge(&record) {
                tracing::error!(
                    error = %e,
                    key = %record.key,
                    "Failed to acknowledge record; it may be redelivered"
                );
            }
        }

        tracing::debug!(
            processed = report.total(),
            aggregated = report.aggregated,
            dead_lettered = report.dead_lettered,
            "Batch complete"
        );

        self.summary.batches += 1;
        self.summary.aggregated += report.aggregated as u64;
        self.summary.dead_lettered += report.dead_lettered as u64;
        self.summary.dead_letter_failures += report.dead_letter_failures as u64;

        report
    }

    /// Pull one batch and process it. An empty poll changes nothing.
    pub async fn poll_once(&mut self) -> Result<BatchReport, SourceError> {
        let batch = self.source.poll_batch(self.poll_timeout).await?;
        if batch.is_empty() {
            return Ok(BatchReport::default());
        }

        tracing::debug!(batch_size = batch.len(), "📬 Pulled batch");
        Ok(self.process_batch(batch).await)
    }

    /// Keep pulling and processing until `shutdown` reads `true`.
    ///
    /// The signal is checked between batches; a batch that has started is
    /// always finished.
    pub async fn run(mut self, shutdown: watch::Receiver<bool>) -> PipelineSummary {
        tracing::info!(
            max_attempts = self.policy.max_attempts(),
            backoff_ms = self.policy.backoff().as_millis() as u64,
            poll_timeout_ms = self.poll_timeout.as_millis() as u64,
            "🔄 Processing pipeline started"
        );

        while !*shutdown.borrow() {
            if let Err(e) = self.poll_once().await {
                tracing::error!(error = %e, "Failed to pull batch");
                tokio::time::sleep(self.poll_timeout).await;
            }
        }

        tracing::info!(
            batches = self.summary.batches,
            aggregated = self.summary.aggregated,
            dead_lettered = self.summary.dead_lettered,
            "Processing pipeline stopped"
        );

        PipelineSummary {
            aggregate: self.state.clone(),
            ..self.summary
        }
    }
}
