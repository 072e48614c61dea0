//! Typed interaction payloads and response builders.
//!
//! Only the slice of the interaction schema this service consumes is
//! modeled. Command options are extracted by exact name + kind match and
//! fail closed: an absent or differently-typed option reads as `None`.

use serde::{Deserialize, Serialize};

pub const INTERACTION_TYPE_PING: u8 = 1;
pub const INTERACTION_TYPE_APPLICATION_COMMAND: u8 = 2;

pub const RESPONSE_TYPE_PONG: u8 = 1;
pub const RESPONSE_TYPE_CHANNEL_MESSAGE: u8 = 4;

pub const OPTION_TYPE_STRING: u8 = 3;
pub const OPTION_TYPE_INTEGER: u8 = 4;

/// Reply visible only to the invoking user.
const FLAG_EPHEMERAL: u64 = 64;

const AVATAR_CDN_BASE: &str = "https://cdn.discordapp.com/avatars";

#[derive(Debug, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub kind: u8,
    pub data: Option<CommandData>,
    pub member: Option<Member>,
    pub user: Option<User>,
}

#[derive(Debug, Deserialize)]
pub struct CommandData {
    pub name: String,
    #[serde(default)]
    pub options: Vec<CommandOption>,
}

#[derive(Debug, Deserialize)]
pub struct CommandOption {
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: String,
    pub value: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct Member {
    pub nick: Option<String>,
    pub user: Option<User>,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub global_name: Option<String>,
    pub avatar: Option<String>,
}

impl CommandData {
    /// Integer option by exact name, `None` on absence or kind mismatch.
    pub fn integer_option(&self, name: &str) -> Option<i64> {
        self.options
            .iter()
            .find(|o| o.kind == OPTION_TYPE_INTEGER && o.name == name)
            .and_then(|o| o.value.as_ref())
            .and_then(serde_json::Value::as_i64)
    }

    /// String option by exact name, `None` on absence or kind mismatch.
    pub fn string_option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.kind == OPTION_TYPE_STRING && o.name == name)
            .and_then(|o| o.value.as_ref())
            .and_then(serde_json::Value::as_str)
    }
}

impl Interaction {
    fn invoking_user(&self) -> Option<&User> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
    }

    /// Display name of the invoking user: guild nickname, then global
    /// display name, then account name.
    pub fn display_name(&self) -> String {
        if let Some(nick) = self.member.as_ref().and_then(|m| m.nick.as_deref()) {
            return nick.to_string();
        }
        match self.invoking_user() {
            Some(user) => user
                .global_name
                .clone()
                .unwrap_or_else(|| user.username.clone()),
            None => String::new(),
        }
    }

    /// CDN URL of the invoking user's avatar, when one is set.
    pub fn avatar_url(&self) -> Option<String> {
        let user = self.invoking_user()?;
        let hash = user.avatar.as_deref()?;
        Some(format!(
            "{AVATAR_CDN_BASE}/{}/{hash}.png?size=128",
            user.id
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

#[derive(Debug, Serialize)]
pub struct ResponseData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<AttachmentDescriptor>>,
}

#[derive(Debug, Serialize)]
pub struct AttachmentDescriptor {
    pub id: u64,
    pub filename: String,
}

/// Reply to the handshake ping.
pub fn pong() -> InteractionResponse {
    InteractionResponse {
        kind: RESPONSE_TYPE_PONG,
        data: None,
    }
}

/// Plain text reply visible only to the invoking user.
pub fn ephemeral_message(content: &str) -> InteractionResponse {
    InteractionResponse {
        kind: RESPONSE_TYPE_CHANNEL_MESSAGE,
        data: Some(ResponseData {
            content: Some(content.to_string()),
            flags: Some(FLAG_EPHEMERAL),
            attachments: None,
        }),
    }
}

/// Public reply announcing the superchat, with one attachment slot.
pub fn attachment_message(content: &str, filename: &str) -> InteractionResponse {
    InteractionResponse {
        kind: RESPONSE_TYPE_CHANNEL_MESSAGE,
        data: Some(ResponseData {
            content: Some(content.to_string()),
            flags: None,
            attachments: Some(vec![AttachmentDescriptor {
                id: 0,
                filename: filename.to_string(),
            }]),
        }),
    }
}

/// Boundary for multipart interaction responses. Fixed so identical renders
/// produce identical bodies.
pub const MULTIPART_BOUNDARY: &str = "supacha-boundary";

/// Serialize a response + PNG attachment as a multipart/form-data body.
pub fn multipart_body(
    response: &InteractionResponse,
    filename: &str,
    png: &[u8],
) -> Result<Vec<u8>, serde_json::Error> {
    let payload = serde_json::to_string(response)?;

    let mut body = Vec::with_capacity(payload.len() + png.len() + 256);
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"payload_json\"\r\nContent-Type: application/json\r\n\r\n",
    );
    body.extend_from_slice(payload.as_bytes());
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"files[0]\"; filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(png);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    Ok(body)
}
