use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use dipthinq_relay::{Relay, RelayConfig, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = RelayConfig::parse();
    if config.api_key().is_none() {
        tracing::warn!("OPENROUTER_API_KEY is not set; chat requests will fail until it is configured");
    }

    let relay = Relay::new(&config)?;
    let app = router(Arc::new(relay));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(
        "DipThinq relay listening on {} (upstream {})",
        listener.local_addr()?,
        config.completions_url()
    );
    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize tracing with an environment filter
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,dipthinq_relay=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
