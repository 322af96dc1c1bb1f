use a2a_gateway::{config::GatewayConfig, server::GatewayServer};
use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    info!("a2a-gateway v{} starting", VERSION);

    let config = GatewayConfig::from_env().context("Failed to load configuration")?;
    if config.is_placeholder() {
        warn!("GATEWAY_PROVIDERS is empty, answering tasks with the placeholder provider");
    }

    let (host, port) = config.bind_addr();
    let server = GatewayServer::from_config(&config).context("Failed to build gateway")?;

    server
        .serve((host, port))
        .await
        .with_context(|| format!("Server on {host}:{port} failed"))?;

    info!("Gateway stopped");
    Ok(())
}

fn init_tracing() -> Result<()> {
    let log_format = std::env::var("GATEWAY_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("a2a_gateway=info,tower_http=info"))
        .context("Failed to create env filter")?;

    match log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty())
            .init(),
    }

    Ok(())
}
