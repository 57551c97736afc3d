use std::time::Duration;

use anyhow::Result;
use harvest::{api, app_state::AppState, config::Config, telemetry};
use tracing::{debug, info};

const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    telemetry::init(config.log_format());

    let state = AppState::new(&config)?;

    // evict results that are never downloaded
    let runner = state.runner.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            let purged = runner.store().purge_expired();
            if purged > 0 {
                debug!(purged, "expired results evicted");
            }
        }
    });

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
