//! Shared application state.

use std::time::Duration;

use ed25519_dalek::VerifyingKey;
use supacha_core::Config;

use crate::discord::{PublicKeyError, parse_public_key};

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    PublicKey(#[from] PublicKeyError),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// State shared by every interaction: one HTTP client for all asset fetches
/// and the key interactions are verified against. Nothing here is mutable;
/// requests are fully isolated from each other.
pub struct AppState {
    pub http: reqwest::Client,
    pub public_key: VerifyingKey,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, StateError> {
        let public_key = parse_public_key(&config.discord_public_key)?;
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| StateError::HttpClient(e.to_string()))?;

        Ok(Self { http, public_key })
    }
}
