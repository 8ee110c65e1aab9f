use std::sync::Arc;

use anyhow::Context;

use salesadvisor_api::app::{build_app, AppServices};
use salesadvisor_infra::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    salesadvisor_observability::init();

    let settings = Settings::from_env().context("invalid configuration")?;
    let services = AppServices::from_settings(&settings)
        .await
        .context("failed to initialize sales data source")?;

    let app = build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
