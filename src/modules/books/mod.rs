pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use shelf_kernel::{settings::BooksSettings, InitCtx, Module};
use utoipa_axum::router::OpenApiRouter;

use crate::utils;
use repository::InMemoryBookRepository;
use service::BookService;

/// Shared handler state: the service plus the creation quota.
#[derive(Clone)]
pub struct BooksState {
    pub service: BookService,
    pub limit: usize,
}

/// Books module: an in-memory catalogue capped at a configured size
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(settings: &BooksSettings) -> Self {
        let repository = Arc::new(InMemoryBookRepository::new());
        Self::with_service(BookService::new(repository), settings.limit)
    }

    /// Build the module around an existing service
    pub fn with_service(service: BookService, limit: usize) -> Self {
        Self {
            state: BooksState { service, limit },
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        if self.state.limit == 0 {
            tracing::warn!(module = self.name(), "book limit is 0; every create will be refused");
        }

        let prefix = utils::log_prefix(self.name());
        tracing::info!(
            %prefix,
            environment = ?ctx.settings.environment,
            limit = self.state.limit,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> OpenApiRouter {
        routes::router(self.state.clone())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let discarded = self.state.service.count().await;
        tracing::info!(module = self.name(), discarded, "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(settings: &BooksSettings) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(settings))
}
