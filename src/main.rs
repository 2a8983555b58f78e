//! connpass-raffle server entry point.
//!
//! Loads the raffle from the configured CSV files and serves the REST API.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use connpass_raffle::api;
use connpass_raffle::app_state::AppState;
use connpass_raffle::config::RaffleConfig;
use connpass_raffle::domain::TracingLog;
use connpass_raffle::service::RaffleManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = RaffleConfig::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;
    tracing::info!(
        participants = %config.participants_csv.display(),
        prizes = %config.prizes_csv.display(),
        seeded = config.seed.is_some(),
        "starting connpass-raffle"
    );

    // Load the raffle; a half-loaded raffle is never served
    let rng = config
        .seed
        .map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
    let manager = RaffleManager::open(config.sources(), Arc::new(TracingLog), rng)
        .context("failed to load raffle sources")?;
    tracing::info!(
        pool_size = manager.pool().len(),
        winner_count = manager.winners().len(),
        prize_count = manager.prizes().len(),
        winner_file = %manager.winner_path().display(),
        "raffle loaded"
    );

    // Build router
    let app = Router::new().merge(api::build_router());

    #[cfg(feature = "swagger-ui")]
    let app = {
        use utoipa::OpenApi;
        app.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        )
    };

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState::new(manager));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
