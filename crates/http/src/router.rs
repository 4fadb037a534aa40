//! Router builder for the shelf HTTP server

use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode},
    Router,
};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use utoipa::openapi::{server::Server, InfoBuilder, OpenApi, OpenApiBuilder};
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use shelf_kernel::settings::DocsSettings;

use crate::error::AppError;

pub const API_TITLE: &str = "Book API";
pub const API_DESCRIPTION: &str = "A simple CRUD API for managing in-memory books.";

/// Builder for constructing the main HTTP router together with its OpenAPI document
pub struct RouterBuilder {
    router: Router,
    openapi: OpenApi,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        let openapi = OpenApiBuilder::new()
            .info(
                InfoBuilder::new()
                    .title(API_TITLE)
                    .description(Some(API_DESCRIPTION))
                    .version(env!("CARGO_PKG_VERSION"))
                    .build(),
            )
            .build();

        Self {
            router: Router::new(),
            openapi,
        }
    }

    /// Add an undocumented route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Merge a module's documented router; its paths are served as declared
    pub fn mount_module(mut self, module_name: &str, module_router: OpenApiRouter) -> Self {
        let (router, openapi) = module_router.split_for_parts();

        tracing::info!(
            module = module_name,
            paths = openapi.paths.paths.len(),
            "mounting module routes"
        );

        self.router = self.router.merge(router);
        self.openapi.merge(openapi);
        self
    }

    /// Advertise the address the API is reachable at
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.openapi.servers = Some(vec![Server::new(url)]);
        self
    }

    /// The OpenAPI document collected so far
    pub fn openapi(&self) -> &OpenApi {
        &self.openapi
    }

    /// Serve Swagger UI and the raw JSON document
    pub fn with_openapi(mut self, docs: &DocsSettings) -> Self {
        if !docs.enabled {
            tracing::info!("API documentation disabled");
            return self;
        }

        self.router = self.router.merge(
            SwaggerUi::new(docs.ui_path.clone()).url(docs.spec_path.clone(), self.openapi.clone()),
        );
        self
    }

    /// Render unknown routes and unsupported methods as `ErrorBody`.
    ///
    /// Must run after every route is registered: the method fallback only
    /// reaches routes that already exist.
    pub fn with_error_fallbacks(mut self) -> Self {
        self.router = self
            .router
            .fallback(route_not_found)
            .method_not_allowed_fallback(method_not_allowed);
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add CORS middleware
    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Add request ID middleware; the id is echoed back on the response
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7));
        self
    }

    /// Add timeout middleware
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self
            .router
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_millis(timeout_ms),
            ));
        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn route_not_found() -> AppError {
    AppError::not_found("Route not found")
}

async fn method_not_allowed() -> AppError {
    AppError::rejected(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

/// Time-ordered request ids
#[derive(Clone, Copy)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let request_id = Uuid::now_v7().to_string().parse::<HeaderValue>().ok()?;
        Some(RequestId::new(request_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get};
    use tower::ServiceExt;
    use utoipa_axum::routes;

    /// Ping
    #[utoipa::path(get, path = "/ping", responses((status = 200, body = String)))]
    async fn ping() -> &'static str {
        "pong"
    }

    fn request(uri: &str) -> Request<Body> {
        axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_module_routes_are_served_and_documented() {
        let builder =
            RouterBuilder::new().mount_module("ping", OpenApiRouter::new().routes(routes!(ping)));
        assert!(builder.openapi().paths.paths.contains_key("/ping"));

        let response = builder.build().oneshot(request("/ping")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_middleware_chain_sets_request_id() {
        let router = RouterBuilder::new()
            .route("/health", get(|| async { "ok" }))
            .with_tracing()
            .with_cors()
            .with_timeout(5000)
            .with_request_id()
            .build();

        let response = router.oneshot(request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    async fn error_of(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: crate::error::ErrorBody = serde_json::from_slice(&bytes).unwrap();
        body.error
    }

    #[tokio::test]
    async fn test_slow_handler_times_out_with_408() {
        let router = RouterBuilder::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "late"
                }),
            )
            .with_timeout(20)
            .build();

        let response = router.oneshot(request("/slow")).await.unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn test_unknown_route_renders_error_body() {
        let router = RouterBuilder::new()
            .route("/health", get(|| async { "ok" }))
            .with_error_fallbacks()
            .build();

        let response = router.clone().oneshot(request("/nowhere")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(error_of(response).await, "Route not found");

        let patch = axum::http::Request::builder()
            .method("PATCH")
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(patch).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(error_of(response).await, "Method not allowed");
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let router = RouterBuilder::new()
            .mount_module("ping", OpenApiRouter::new().routes(routes!(ping)))
            .with_server_url("http://127.0.0.1:8080")
            .with_openapi(&DocsSettings::default())
            .build();

        let response = router.oneshot(request("/openapi.json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let document: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(document["info"]["title"], API_TITLE);
        assert!(document["paths"]["/ping"]["get"].is_object());
        assert_eq!(document["servers"][0]["url"], "http://127.0.0.1:8080");
    }

    #[tokio::test]
    async fn test_docs_can_be_disabled() {
        let docs = DocsSettings {
            enabled: false,
            ..DocsSettings::default()
        };
        let router = RouterBuilder::new().with_openapi(&docs).build();

        let response = router.oneshot(request("/openapi.json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
