//! The `/superchat` command definition published to the command catalog.

use serde::Serialize;

use super::interaction::{OPTION_TYPE_INTEGER, OPTION_TYPE_STRING};

pub const COMMAND_NAME: &str = "superchat";

#[derive(Debug, Serialize)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub options: Vec<CommandOptionDefinition>,
}

#[derive(Debug, Serialize)]
pub struct CommandOptionDefinition {
    #[serde(rename = "type")]
    pub kind: u8,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
}

pub fn superchat_command() -> CommandDefinition {
    CommandDefinition {
        name: COMMAND_NAME,
        description: "スーパーチャットを送ります",
        options: vec![
            CommandOptionDefinition {
                kind: OPTION_TYPE_INTEGER,
                name: "金額",
                description: "スーパーチャットの金額",
                required: true,
            },
            CommandOptionDefinition {
                kind: OPTION_TYPE_STRING,
                name: "コメント",
                description: "スーパーチャットのコメント",
                required: false,
            },
        ],
    }
}
