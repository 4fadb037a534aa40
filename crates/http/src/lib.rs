//! HTTP server facade for shelf with Axum, error handling, and OpenAPI support.

use anyhow::Context;
use axum::{routing::get, Router};
use utoipa::openapi::OpenApi;

use shelf_kernel::{settings::Settings, ModuleRegistry};

pub mod error;
pub mod router;

pub use error::{AppError, AppResult, ErrorBody};
use router::RouterBuilder;

/// Start the HTTP server and serve until Ctrl-C is received
pub async fn start_server(registry: &ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    let app = build_router(registry, settings);

    let address = settings.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind to {}", address))?;

    tracing::info!("HTTP server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Build the main HTTP router with every module's routes merged in
pub fn build_router(registry: &ModuleRegistry, settings: &Settings) -> Router {
    collect_routes(registry, settings)
        .route("/healthz", get(health_check))
        .with_openapi(&settings.docs)
        .with_error_fallbacks()
        .with_tracing()
        .with_cors()
        .with_timeout(settings.server.request_timeout_ms)
        .with_request_id()
        .build()
}

/// OpenAPI document describing every module route
pub fn openapi_document(registry: &ModuleRegistry, settings: &Settings) -> OpenApi {
    collect_routes(registry, settings).openapi().clone()
}

fn collect_routes(registry: &ModuleRegistry, settings: &Settings) -> RouterBuilder {
    registry.modules().fold(
        RouterBuilder::new().with_server_url(format!("http://{}", settings.server.bind_address())),
        |builder, module| builder.mount_module(module.name(), module.routes()),
    )
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        // Without a signal handler the server runs until the process is killed.
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct EmptyModule;

    #[async_trait::async_trait]
    impl shelf_kernel::Module for EmptyModule {
        fn name(&self) -> &'static str {
            "empty"
        }
    }

    #[tokio::test]
    async fn test_health_check_route() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(EmptyModule));

        let app = build_router(&registry, &Settings::default());
        let request = axum::http::Request::builder()
            .uri("/healthz")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_openapi_document_lists_server() {
        let registry = ModuleRegistry::new();
        let document = openapi_document(&registry, &Settings::default());
        let servers = document.servers.unwrap();
        assert_eq!(servers[0].url, "http://127.0.0.1:8080");
    }
}
