use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use shelf_kernel::settings::Settings;

/// Shelf book catalogue
#[derive(Debug, Parser)]
#[command(name = "shelf", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Print the OpenAPI document as JSON
    Openapi,
    /// Print the effective configuration as JSON
    Config,
}

/// Command-line overrides layered on top of the loaded settings
#[derive(Debug, Default, Args)]
struct ServeArgs {
    /// Address to bind, overriding `server.host`
    #[arg(long)]
    host: Option<String>,
    /// Port to bind, overriding `server.port`
    #[arg(long)]
    port: Option<u16>,
    /// Maximum number of books, overriding `books.limit`
    #[arg(long)]
    limit: Option<usize>,
}

impl ServeArgs {
    fn apply(self, settings: &mut Settings) {
        if let Some(host) = self.host {
            settings.server.host = host;
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(limit) = self.limit {
            settings.books.limit = limit;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load shelf settings")?;

    match cli.command {
        Command::Serve(args) => {
            args.apply(&mut settings);
            shelf_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "shelf serve starting");
            shelf_app::serve(settings).await
        }
        Command::Openapi => {
            let registry = shelf_app::registry(&settings);
            let document = shelf_http::openapi_document(&registry, &settings);
            let json = serde_json::to_string_pretty(&document)
                .with_context(|| "failed to render OpenAPI document")?;
            println!("{json}");
            Ok(())
        }
        Command::Config => {
            let json = serde_json::to_string_pretty(&settings)
                .with_context(|| "failed to render settings")?;
            println!("{json}");
            Ok(())
        }
    }
}
