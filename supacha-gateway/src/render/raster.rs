//! SVG scene rasterization.
//!
//! Renders the laid-out card onto a transparent pixmap, trims it to the
//! tight bounding box of visible pixels (dropping the generous canvas
//! slack), and encodes the result as PNG.

use resvg::tiny_skia;
use resvg::usvg;

use super::fonts::FontAsset;

#[derive(Debug, thiserror::Error)]
pub enum RasterizationError {
    #[error("SVG parse failed: {0}")]
    Svg(String),
    #[error("pixmap allocation failed")]
    Alloc,
    #[error("rendered scene has no visible content")]
    EmptyCanvas,
    #[error("PNG encode failed: {0}")]
    Encode(String),
}

/// Rasterize an SVG document to trimmed PNG bytes.
///
/// Only the given font subsets are loaded into the font database, so output
/// depends on nothing outside the fetched assets.
pub fn rasterize(svg: &str, fonts: &[&FontAsset]) -> Result<Vec<u8>, RasterizationError> {
    let mut options = usvg::Options::default();
    for font in fonts {
        options.fontdb_mut().load_font_data(font.data.clone());
    }

    let tree = usvg::Tree::from_data(svg.as_bytes(), &options)
        .map_err(|e| RasterizationError::Svg(e.to_string()))?;

    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or(RasterizationError::Alloc)?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    let trimmed = trim_to_visible(&pixmap)?;
    trimmed
        .encode_png()
        .map_err(|e| RasterizationError::Encode(e.to_string()))
}

/// Crop a pixmap to the bounding box of its non-transparent pixels.
fn trim_to_visible(pixmap: &tiny_skia::Pixmap) -> Result<tiny_skia::Pixmap, RasterizationError> {
    let (x0, y0, x1, y1) = visible_bounds(pixmap).ok_or(RasterizationError::EmptyCanvas)?;
    let width = x1 - x0 + 1;
    let height = y1 - y0 + 1;

    let stride = pixmap.width() as usize * 4;
    let data = pixmap.data();
    let mut cropped = Vec::with_capacity(width * height * 4);
    for row in y0..=y1 {
        let start = row * stride + x0 * 4;
        cropped.extend_from_slice(&data[start..start + width * 4]);
    }

    let size = tiny_skia::IntSize::from_wh(width as u32, height as u32)
        .ok_or(RasterizationError::Alloc)?;
    tiny_skia::Pixmap::from_vec(cropped, size).ok_or(RasterizationError::Alloc)
}

/// Inclusive bounds (x0, y0, x1, y1) of pixels with non-zero alpha.
fn visible_bounds(pixmap: &tiny_skia::Pixmap) -> Option<(usize, usize, usize, usize)> {
    let width = pixmap.width() as usize;
    let data = pixmap.data();

    let mut bounds: Option<(usize, usize, usize, usize)> = None;
    for (i, pixel) in data.chunks_exact(4).enumerate() {
        if pixel[3] == 0 {
            continue;
        }
        let x = i % width;
        let y = i / width;
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bounds
}
