use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use fhoneos_core::config::Config;
use fhoneos_core::service::http::{create_router, AppState};

#[derive(Parser)]
#[command(
    name = "fhoneos-functions",
    about = "FhoneOS serverless functions, hosted on a local port",
    version = fhoneos_core::VERSION,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the functions locally (same router the Lambda hosts)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fhoneos_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            let config = Config::from_env()?;
            let state = Arc::new(AppState::from_config(&config));
            let router = create_router(state);

            let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
            info!("Serving FhoneOS functions on port {}", port);
            axum::serve(listener, router).await?;
        }
    }

    Ok(())
}
