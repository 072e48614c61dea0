use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use supacha_gateway::server;
use supacha_gateway::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = supacha_core::Config::from_env()?;

    // Warm up the render pipeline before the first interaction arrives
    supacha_gateway::render::init();

    let state = Arc::new(AppState::new(&config)?);

    let bind_addr = config.bind_addr();
    info!("Starting supacha gateway on {}", bind_addr);

    server::run(state, &bind_addr).await
}
