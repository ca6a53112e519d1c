use std::net::SocketAddr;

use anyhow::Result;
use wayfarer_agents::Settings;
use wayfarer_api::{build_app, ApiConfig};
use wayfarer_observability::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("wayfarer_api");

    let settings = Settings::from_env();
    let config = ApiConfig::from_env();
    let app = build_app(&settings, &config).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!(bind = %config.bind, "wayfarer api started");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
