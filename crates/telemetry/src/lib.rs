//! Tracing bootstrap shared by every shelf binary.

use anyhow::Context;
use shelf_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the `EnvFilter`, preferring `RUST_LOG` over the configured directive.
pub fn env_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&settings.filter)
            .with_context(|| format!("invalid telemetry filter '{}'", settings.filter)),
    }
}

/// Install the global tracing subscriber.
///
/// Later calls leave the first subscriber in place and return `Ok`.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(settings)?);

    let installed = match settings.log_format {
        LogFormat::Pretty => registry.with(fmt::layer()).try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init(),
    };

    if installed.is_ok() {
        tracing::info!(
            target: "shelf-telemetry",
            format = ?settings.log_format,
            filter = %settings.filter,
            "telemetry initialized"
        );
    }

    Ok(())
}
