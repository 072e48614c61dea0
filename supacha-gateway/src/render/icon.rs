//! Avatar/icon fetching.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::header::CONTENT_TYPE;

#[derive(Debug, thiserror::Error)]
pub enum IconFetchError {
    #[error("icon request failed: {0}")]
    RequestFailed(String),
    #[error("icon returned status {0}")]
    Status(u16),
}

fn parse_content_type(headers: &reqwest::header::HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.split(';').next().unwrap_or(value).trim().to_string())
}

/// Fetch an icon and inline it as a base64 data URI, preserving the upstream
/// content type in the URI header.
pub async fn fetch_icon(client: &reqwest::Client, url: &str) -> Result<String, IconFetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| IconFetchError::RequestFailed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(IconFetchError::Status(response.status().as_u16()));
    }

    let content_type = parse_content_type(response.headers())
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let bytes = response
        .bytes()
        .await
        .map_err(|e| IconFetchError::RequestFailed(e.to_string()))?;

    Ok(format!("data:{content_type};base64,{}", BASE64.encode(&bytes)))
}
