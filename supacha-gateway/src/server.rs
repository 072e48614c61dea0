//! HTTP server and the interaction endpoint.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{error, info, warn};

use supacha_core::{SuperchatRequest, validate};

use crate::discord::{
    COMMAND_NAME, Interaction, MULTIPART_BOUNDARY, attachment_message, ephemeral_message,
    interaction::{INTERACTION_TYPE_APPLICATION_COMMAND, INTERACTION_TYPE_PING},
    multipart_body, pong, verify_signature,
};
use crate::render;
use crate::state::AppState;

const ATTACHMENT_FILENAME: &str = "superchat.png";
const SUCCESS_CONTENT: &str = "スーパーチャットを送りました！";
const FAILURE_CONTENT: &str = "スーパーチャットの生成に失敗しました";

/// Error response
#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    message: String,
}

/// Run the HTTP server
pub async fn run(state: Arc<AppState>, bind_addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Create the router with all routes
fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/interaction", post(interaction_handler))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorResponse {
            status: status.as_u16(),
            message: message.to_string(),
        }),
    )
        .into_response()
}

/// Interaction handler - POST /interaction
///
/// Verifies the request signature over the raw body before decoding, then
/// routes by interaction type: ping handshake, `/superchat` command, or 400.
async fn interaction_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get("X-Signature-Ed25519")
        .and_then(|v| v.to_str().ok());
    let timestamp = headers
        .get("X-Signature-Timestamp")
        .and_then(|v| v.to_str().ok());
    let (Some(signature), Some(timestamp)) = (signature, timestamp) else {
        return error_response(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    if !verify_signature(&state.public_key, signature, timestamp, &body) {
        return error_response(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    let interaction: Interaction = match serde_json::from_slice(&body) {
        Ok(interaction) => interaction,
        Err(e) => {
            warn!("Undecodable interaction payload: {}", e);
            return error_response(StatusCode::BAD_REQUEST, "Bad Request");
        }
    };

    match interaction.kind {
        INTERACTION_TYPE_PING => Json(pong()).into_response(),
        INTERACTION_TYPE_APPLICATION_COMMAND
            if interaction.data.as_ref().is_some_and(|d| d.name == COMMAND_NAME) =>
        {
            handle_superchat(&state, &interaction).await
        }
        _ => error_response(StatusCode::BAD_REQUEST, "Bad Request"),
    }
}

/// Handle a `/superchat` invocation: validate, render, attach.
async fn handle_superchat(state: &AppState, interaction: &Interaction) -> Response {
    let data = match interaction.data.as_ref() {
        Some(data) => data,
        None => return error_response(StatusCode::BAD_REQUEST, "Bad Request"),
    };

    // A missing or mistyped 金額 reads as 0 and is rejected by the bounds
    // check like any other out-of-range price.
    let price = data
        .integer_option("金額")
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0);
    let message = data.string_option("コメント").map(str::to_string);

    if let Some(rejection) = validate(price, message.as_deref()) {
        return Json(ephemeral_message(&rejection)).into_response();
    }

    let request = SuperchatRequest {
        price,
        name: interaction.display_name(),
        message,
        icon_url: interaction.avatar_url(),
    };

    let png = match render::render_superchat(&state.http, &request).await {
        Ok(png) => png,
        Err(e) => {
            error!("Superchat render failed: {}", e);
            return Json(ephemeral_message(FAILURE_CONTENT)).into_response();
        }
    };

    let response = attachment_message(SUCCESS_CONTENT, ATTACHMENT_FILENAME);
    let body = match multipart_body(&response, ATTACHMENT_FILENAME, &png) {
        Ok(body) => body,
        Err(e) => {
            error!("Failed to serialize interaction response: {}", e);
            return Json(ephemeral_message(FAILURE_CONTENT)).into_response();
        }
    };

    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use ed25519_dalek::{Signer, SigningKey};

    fn test_state() -> (SigningKey, Arc<AppState>) {
        let signing = SigningKey::from_bytes(&[9u8; 32]);
        let state = Arc::new(AppState {
            http: reqwest::Client::new(),
            public_key: signing.verifying_key(),
        });
        (signing, state)
    }

    fn signed_headers(signing: &SigningKey, timestamp: &str, body: &str) -> HeaderMap {
        let mut message = timestamp.as_bytes().to_vec();
        message.extend_from_slice(body.as_bytes());
        let signature = hex::encode(signing.sign(&message).to_bytes());

        let mut headers = HeaderMap::new();
        headers.insert("X-Signature-Ed25519", signature.parse().unwrap());
        headers.insert("X-Signature-Timestamp", timestamp.parse().unwrap());
        headers
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn ping_pongs_when_signed() {
        let (signing, state) = test_state();
        let body = r#"{"type":1}"#;
        let headers = signed_headers(&signing, "123", body);

        let response =
            interaction_handler(State(state), headers, Bytes::from(body.to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!({"type": 1}));
    }

    #[tokio::test]
    async fn unsigned_requests_are_unauthorized() {
        let (_, state) = test_state();
        let response = interaction_handler(
            State(state),
            HeaderMap::new(),
            Bytes::from(r#"{"type":1}"#.to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn tampered_requests_are_unauthorized() {
        let (signing, state) = test_state();
        let headers = signed_headers(&signing, "123", r#"{"type":1}"#);
        let response = interaction_handler(
            State(state),
            headers,
            Bytes::from(r#"{"type":2}"#.to_string()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unknown_commands_are_bad_requests() {
        let (signing, state) = test_state();
        let body = r#"{"type":2,"data":{"name":"other"}}"#;
        let headers = signed_headers(&signing, "123", body);

        let response =
            interaction_handler(State(state), headers, Bytes::from(body.to_string())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn out_of_bounds_price_gets_an_ephemeral_rejection() {
        let (signing, state) = test_state();
        let body = r#"{"type":2,"data":{"name":"superchat","options":[{"type":4,"name":"金額","value":99}]},"user":{"id":"1","username":"shun","global_name":null,"avatar":null}}"#;
        let headers = signed_headers(&signing, "123", body);

        let response =
            interaction_handler(State(state), headers, Bytes::from(body.to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["type"], 4);
        assert_eq!(json["data"]["flags"], 64);
        assert!(json["data"]["content"].as_str().unwrap().contains("100"));
    }

    #[tokio::test]
    async fn disallowed_message_gets_an_ephemeral_rejection() {
        let (signing, state) = test_state();
        let body = r#"{"type":2,"data":{"name":"superchat","options":[{"type":4,"name":"金額","value":150},{"type":3,"name":"コメント","value":"hi"}]},"user":{"id":"1","username":"shun","global_name":null,"avatar":null}}"#;
        let headers = signed_headers(&signing, "123", body);

        let response =
            interaction_handler(State(state), headers, Bytes::from(body.to_string())).await;
        let json = body_json(response).await;
        assert_eq!(json["data"]["flags"], 64);
        assert!(
            json["data"]["content"]
                .as_str()
                .unwrap()
                .contains("200円未満")
        );
    }

    #[tokio::test]
    async fn missing_price_option_fails_closed_to_a_rejection() {
        let (signing, state) = test_state();
        let body = r#"{"type":2,"data":{"name":"superchat","options":[]},"user":{"id":"1","username":"shun","global_name":null,"avatar":null}}"#;
        let headers = signed_headers(&signing, "123", body);

        let response =
            interaction_handler(State(state), headers, Bytes::from(body.to_string())).await;
        let json = body_json(response).await;
        assert_eq!(json["type"], 4);
        assert_eq!(json["data"]["flags"], 64);
    }
}
