use order_stream::messaging::RedpandaClient;
use order_stream::producer::{run_producer, OrderGenerator};
use order_stream::{telemetry, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let config = Config::from_env()?;
    tracing::info!(
        brokers = %config.brokers,
        topic = %config.source_topic,
        interval_ms = config.produce_interval.as_millis() as u64,
        "🚀 Starting order producer"
    );

    let client = RedpandaClient::new(&config.brokers)?;

    let sent = run_producer(
        &client,
        &config.source_topic,
        config.produce_interval,
        OrderGenerator::new(),
        telemetry::shutdown_on_ctrl_c(),
    )
    .await;

    tracing::info!(sent = sent, "Producer stopped");

    Ok(())
}
