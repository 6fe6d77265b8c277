use tokio::sync::watch;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize structured logging with environment-based filtering.
///
/// Defaults to INFO, with debug output for this crate. Override with
/// RUST_LOG, e.g. `RUST_LOG=order_stream=trace`.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_stream=debug")),
        )
        .init();
}

/// Shutdown signal flipped to `true` on Ctrl-C
pub fn shutdown_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("🛑 Ctrl-C received, finishing current batch");
                let _ = tx.send(true);
            }
            // Without a handler the process runs until it is killed
            Err(e) => tracing::error!("Failed to register ctrl-c handler: {}", e),
        }
    });

    rx
}
