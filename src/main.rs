use std::sync::Arc;

use order_stream::consumer::ProcessingPipeline;
use order_stream::domain::order::PriceCeiling;
use order_stream::messaging::{RedpandaClient, RedpandaDeadLetterSink, RedpandaOrderSource};
use order_stream::metrics::{self, Metrics};
use order_stream::{telemetry, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    tracing::info!("🚀 Starting order consumer");

    let config = Config::from_env()?;
    tracing::info!(
        brokers = %config.brokers,
        source_topic = %config.source_topic,
        dlq_topic = %config.dlq_topic,
        group_id = %config.group_id,
        "Loaded configuration"
    );

    // === 1. Initialize Prometheus metrics ===
    let metrics = Arc::new(Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    // Metrics HTTP server runs on its own thread with its own actix system
    let registry = metrics.registry().clone();
    let metrics_port = config.metrics_port;
    std::thread::spawn(move || {
        let system = actix_web::rt::System::new();
        if let Err(e) = system.block_on(metrics::start_metrics_server(registry, metrics_port)) {
            tracing::error!("Metrics server error: {}", e);
        }
    });

    // === 2. Connect source and dead-letter streams ===
    let source = RedpandaOrderSource::new(&config.brokers, &config.group_id, &config.source_topic)?
        .with_metrics(metrics.clone());
    let client = Arc::new(RedpandaClient::new(&config.brokers)?);
    let dead_letters = RedpandaDeadLetterSink::new(client, config.dlq_topic.clone());

    // === 3. Run the pipeline until Ctrl-C ===
    let pipeline = ProcessingPipeline::new(source, dead_letters, PriceCeiling::default())
        .with_metrics(metrics);

    tracing::info!("Consumer Started...");
    let summary = pipeline.run(telemetry::shutdown_on_ctrl_c()).await;

    tracing::info!(
        batches = summary.batches,
        aggregated = summary.aggregated,
        dead_lettered = summary.dead_lettered,
        dead_letter_failures = summary.dead_letter_failures,
        average = ?summary.aggregate.average(),
        "🎉 Consumer stopped"
    );

    Ok(())
}
