//! The decoded superchat command, as consumed by the render pipeline.

/// One validated superchat invocation. Built per interaction, consumed once.
#[derive(Debug, Clone)]
pub struct SuperchatRequest {
    /// Price in yen, already validated against the tier bounds.
    pub price: u32,
    /// Display name of the invoking user.
    pub name: String,
    /// Optional message, already validated against the tier length limit.
    pub message: Option<String>,
    /// Optional avatar URL to fetch and inline into the card.
    pub icon_url: Option<String>,
}
