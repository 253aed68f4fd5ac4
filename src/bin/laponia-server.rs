use anyhow::Result;
use laponia_metrics::{MetricsService, TracingService};
use laponia_models::Config;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    TracingService::init(&config.logging)?;

    info!("Starting Laponia server");
    info!(
        bind = %config.bind_addr(),
        db_url = %config.data.db_url,
        model = %config.completions.model,
        api_key_set = config.completions.api_key.is_some(),
        "Configuration loaded"
    );

    let metrics = Arc::new(MetricsService::new()?);
    let state = laponia::build_state(config, metrics).await;

    laponia_api::start_server(state)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    info!("Laponia server shutdown complete");
    Ok(())
}
