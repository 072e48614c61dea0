//! Publishes the `/superchat` command definition to the Discord command
//! catalog. Run once after deploying or whenever the definition changes.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use supacha_core::RegisterConfig;
use supacha_gateway::discord::superchat_command;

const API_BASE: &str = "https://discord.com/api/v10";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RegisterConfig::from_env()?;

    // Guild-scoped commands update instantly and suit development; global
    // registration can take up to an hour to propagate.
    let url = match &config.guild_id {
        Some(guild_id) => format!(
            "{API_BASE}/applications/{}/guilds/{guild_id}/commands",
            config.application_id
        ),
        None => format!("{API_BASE}/applications/{}/commands", config.application_id),
    };

    let client = reqwest::Client::new();
    let response = client
        .put(&url)
        .header("Authorization", format!("Bot {}", config.discord_token))
        .json(&vec![superchat_command()])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("Command registration failed ({status}): {body}").into());
    }

    info!("Registered /superchat against {}", url);
    Ok(())
}
