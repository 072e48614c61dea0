pub mod commands;
pub mod interaction;
pub mod verify;

pub use commands::{COMMAND_NAME, superchat_command};
pub use interaction::{
    Interaction, InteractionResponse, MULTIPART_BOUNDARY, attachment_message, ephemeral_message,
    multipart_body, pong,
};
pub use verify::{PublicKeyError, parse_public_key, verify_signature};
