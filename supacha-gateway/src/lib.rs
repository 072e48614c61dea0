pub mod discord;
pub mod render;
pub mod server;
pub mod state;

pub use render::{RenderError, render_superchat};
pub use state::AppState;
