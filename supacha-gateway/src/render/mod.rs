//! The superchat render pipeline: fetch assets concurrently, compose the
//! card scene, rasterize to a trimmed PNG.

pub mod card;
pub mod emoji;
pub mod fonts;
pub mod icon;
pub mod raster;
pub mod scene;

use supacha_core::SuperchatRequest;

pub use emoji::EmojiFetchError;
pub use fonts::FontFetchError;
pub use icon::IconFetchError;
pub use raster::RasterizationError;

/// Any failure that aborts a render. None of these are retried; the first
/// one ends the request.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Font(#[from] FontFetchError),
    #[error(transparent)]
    Emoji(#[from] EmojiFetchError),
    #[error(transparent)]
    Icon(#[from] IconFetchError),
    #[error(transparent)]
    Raster(#[from] RasterizationError),
}

/// Eagerly initialize the pipeline's process-wide pieces.
///
/// Idempotent; called once at startup so the first interaction doesn't pay
/// for lazy initialization.
pub fn init() {
    fonts::init();
}

/// Render one superchat request to PNG bytes.
///
/// The two font subsets and the optional avatar are fetched concurrently;
/// emoji resolve lazily while the text is shaped. Layout and rasterization
/// are synchronous once the assets are in hand.
pub async fn render_superchat(
    client: &reqwest::Client,
    request: &SuperchatRequest,
) -> Result<Vec<u8>, RenderError> {
    // The medium subset carries the header line plus the ellipsis used for
    // name overflow; the regular subset carries the message.
    let header_text = format!("{}￥{}…", request.name, request.price);
    let message_text = request.message.clone().unwrap_or_default();

    let (medium, regular, icon) = tokio::try_join!(
        async {
            fonts::fetch_font_subset(client, &header_text, fonts::WEIGHT_MEDIUM)
                .await
                .map_err(RenderError::from)
        },
        async {
            fonts::fetch_font_subset(client, &message_text, fonts::WEIGHT_REGULAR)
                .await
                .map_err(RenderError::from)
        },
        async {
            match &request.icon_url {
                Some(url) => icon::fetch_icon(client, url)
                    .await
                    .map(Some)
                    .map_err(RenderError::from),
                None => Ok(None),
            }
        },
    )?;

    let scene = card::build_scene(client, request, icon.as_deref(), &medium, &regular).await?;
    let (svg, _) = card::render_svg(&scene);

    Ok(raster::rasterize(&svg, &[&medium, &regular])?)
}
