use std::sync::Arc;

use lambda_http::{run, Error};
use tracing::info;

use fhoneos_core::config::Config;
use fhoneos_core::service::http::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fhoneos_core=info".parse()?),
        )
        .with_ansi(false)
        .init();

    info!("FhoneOS functions Lambda starting...");

    let config = Config::from_env()?;
    let state = Arc::new(AppState::from_config(&config));
    let router = create_router(state);

    run(router).await
}
