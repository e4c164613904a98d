//! FactoryGuard service entrypoint: load config and model once, then serve HTTP.
//! A model that fails to load does not stop the process; scoring routes answer 503.

use factoryguard::{
    api::{self, AppState},
    config::ServiceConfig,
    logging::StructuredLogger,
    service::ServiceContext,
};
use std::path::PathBuf;
use tracing::{error, info, warn};

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config_path = std::env::var("FACTORYGUARD_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.json"));
    let config = ServiceConfig::load(&config_path)?;

    StructuredLogger::init(config.log.json, &config.log.level);

    info!(config = %config_path.display(), "FactoryGuard service starting");

    let state = match ServiceContext::from_config(&config) {
        Ok(ctx) => {
            info!(
                kind = ?config.model.kind,
                features = ctx.schema().len(),
                version = ctx.model_version().unwrap_or("unknown"),
                "model loaded"
            );
            AppState::ready(ctx)
        }
        Err(e) => {
            error!(
                path = %config.model.path.display(),
                error = %e,
                "model failed to load; scoring routes will answer 503"
            );
            AppState::unavailable(e.to_string())
        }
    };

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, model_ready = state.is_ready(), endpoints = ?api::ENDPOINTS, "listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("FactoryGuard service stopping");
    Ok(())
}
