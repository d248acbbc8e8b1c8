use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, RestConfig, config::rest_addr_from_env_value, router};
use nexus_gateway::{ContentService, GatewayConfig};

/// Main entry point for the NexusBio content server
///
/// Resolves configuration once, builds the rate-limited content service and serves the REST
/// API until interrupted.
///
/// # Environment Variables
/// - `NEXUS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `STORYBLOK_ACCESS_TOKEN`: CMS read token (required)
/// - see `GatewayConfig::from_env` and `RestConfig::from_env` for the rest
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nexus=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = rest_addr_from_env_value(std::env::var("NEXUS_REST_ADDR").ok());

    let gateway_cfg = GatewayConfig::from_env()?;
    let rest_cfg = RestConfig::from_env()?;
    let content = ContentService::from_config(&gateway_cfg)?;

    let app = router(AppState::new(rest_cfg, content));

    tracing::info!("++ Starting NexusBio REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("-- Shutting down NexusBio REST");
}
