use std::env;

/// Load .env file if it exists (called automatically when using `from_env`)
pub fn load_dotenv() {
    // Silently ignore errors (file might not exist)
    let _ = dotenvy::dotenv();
}

/// Gateway configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Hex-encoded Ed25519 public key for interaction signature checks
    pub discord_public_key: String,
    /// Gateway host (default: 127.0.0.1)
    pub gateway_host: String,
    /// Gateway port (default: 3000)
    pub gateway_port: u16,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function automatically loads a .env file from the project root if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();

        Self::from_env_inner()
    }

    /// Internal method to load from env without loading .env
    fn from_env_inner() -> Result<Self, ConfigError> {
        let discord_public_key = env::var("DISCORD_PUBLIC_KEY")
            .map_err(|_| ConfigError::MissingVar("DISCORD_PUBLIC_KEY".to_string()))?;

        Ok(Self {
            discord_public_key,
            gateway_host: env::var("GATEWAY_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            gateway_port: env::var("GATEWAY_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
        })
    }

    /// Get the HTTP bind address for the gateway
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.gateway_host, self.gateway_port)
    }
}

/// Configuration for the command-registration binary
#[derive(Debug, Clone)]
pub struct RegisterConfig {
    /// Bot token used for the `Authorization: Bot ...` header
    pub discord_token: String,
    /// Application whose command catalog is updated
    pub application_id: String,
    /// When set, commands are registered guild-scoped instead of globally
    pub guild_id: Option<String>,
}

impl RegisterConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();

        Self::from_env_inner()
    }

    fn from_env_inner() -> Result<Self, ConfigError> {
        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| ConfigError::MissingVar("DISCORD_TOKEN".to_string()))?;
        let application_id = env::var("DISCORD_APPLICATION_ID")
            .map_err(|_| ConfigError::MissingVar("DISCORD_APPLICATION_ID".to_string()))?;

        Ok(Self {
            discord_token,
            application_id,
            guild_id: env::var("DISCORD_GUILD_ID").ok().filter(|v| !v.is_empty()),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),
}
