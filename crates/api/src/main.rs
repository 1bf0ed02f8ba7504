use std::sync::Arc;

use anyhow::Context;

use restaurant_api::app::{build_app, services::build_services};
use restaurant_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    restaurant_observability::init();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    let services = build_services(&config.storage)
        .await
        .context("failed to initialise storage")?;

    let app = build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
