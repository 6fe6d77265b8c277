use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use prometheus::{Encoder, Registry, TextEncoder};

const SERVICE_NAME: &str = "order-stream-consumer";

/// Serve the pipeline's registry on `/metrics` and a liveness check on
/// `/health` until the actix system it runs under stops.
///
/// The consumer drives this from a dedicated thread with its own
/// `actix_web::rt::System`, so scrapes are answered even while the pipeline
/// sits in a retry backoff. Ctrl-C is handled by the consumer, not here.
pub async fn start_metrics_server(registry: Registry, port: u16) -> std::io::Result<()> {
    tracing::info!(port = port, "📊 Serving pipeline metrics on http://0.0.0.0:{}/metrics", port);

    let registry = web::Data::new(registry);

    HttpServer::new(move || {
        App::new()
            .app_data(registry.clone())
            .route("/metrics", web::get().to(scrape))
            .route("/health", web::get().to(health))
    })
    .workers(1)
    .disable_signals()
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

async fn scrape(registry: web::Data<Registry>) -> impl Responder {
    let mut body = Vec::new();
    let encoder = TextEncoder::new();

    match encoder.encode(&registry.gather(), &mut body) {
        Ok(()) => HttpResponse::Ok()
            .content_type(encoder.format_type())
            .body(body),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode pipeline metrics");
            HttpResponse::InternalServerError().finish()
        }
    }
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metrics;
    use actix_web::test::{self, TestRequest};

    #[actix_web::test]
    async fn test_endpoints_expose_pipeline_registry() {
        let metrics = Metrics::new().unwrap();
        metrics.record_undecodable();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(metrics.registry().clone()))
                .route("/metrics", web::get().to(scrape))
                .route("/health", web::get().to(health)),
        )
        .await;

        let body = test::call_and_read_body(&app, TestRequest::get().uri("/metrics").to_request()).await;
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("orders_undecodable_total 1"));

        let status: serde_json::Value =
            test::call_and_read_body_json(&app, TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(status["service"], SERVICE_NAME);
    }
}
