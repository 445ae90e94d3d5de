use anyhow::Result;
use roulette_block_predictor::ai::ModelRoster;
use roulette_block_predictor::api;
use roulette_block_predictor::core::{self, Config, HealthChecker, PredictionMetrics};
use roulette_block_predictor::prediction::PredictionOrchestrator;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    core::logging::init_logging(&config.monitoring.log_level, config.monitoring.log_format);

    tracing::info!("🎰 Roulette block predictor starting...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Feature encoding: {} (models must be trained for this scheme)",
        config.prediction.encoding
    );

    // Models are loaded once; the roster is read-only from here on
    let roster = Arc::new(ModelRoster::load(&config.models)?);
    tracing::info!(
        "📦 {}/{} models available",
        roster.loaded_count(),
        roster.len()
    );
    if roster.loaded_count() < config.prediction.min_votes {
        tracing::warn!(
            "⚠️  Only {} models loaded but consensus needs {} votes; consensus will be empty",
            roster.loaded_count(),
            config.prediction.min_votes
        );
    }

    let health_checker = HealthChecker::new();
    health_checker.register_roster(&roster).await;

    let metrics = PredictionMetrics::new()?;
    let orchestrator = Arc::new(
        PredictionOrchestrator::from_config(&config, roster).with_metrics(metrics),
    );

    let host: IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(host, config.server.port);

    let (bound, server) = warp::serve(api::routes(orchestrator, health_checker))
        .try_bind_with_graceful_shutdown(addr, async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("🛑 Shutdown signal received");
        })?;

    tracing::info!("✅ Listening on {}", bound);
    server.await;

    Ok(())
}
