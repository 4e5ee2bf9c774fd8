use std::sync::Arc;

use anyhow::Context;

use userhub_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env().context("invalid configuration")?;
    userhub_observability::init(config.log_format);

    if config.dev_secret {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }

    let services = Arc::new(userhub_api::app::services::build_services(&config).await?);
    let app = userhub_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
