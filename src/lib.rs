//! Shelf application library
//!
//! Wires the project modules into the kernel registry and runs the HTTP server.

pub mod modules;
pub mod utils;

use shelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Registry holding every project module, built from the given settings
pub fn registry(settings: &Settings) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings);
    registry
}

/// Run the full module lifecycle around the HTTP server.
///
/// Modules are stopped even when the server exits with an error.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let registry = registry(&settings);
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    let served = shelf_http::start_server(&registry, &settings).await;
    registry.stop_modules().await?;

    served
}
