//! Font subset fetching against the Google Fonts CSS API.
//!
//! A card only ever renders the characters of one request, so instead of
//! shipping a full CJK family the fetcher asks the CSS endpoint for a subset
//! scoped to exactly those characters, extracts the binary URL from the
//! returned `@font-face` block, and downloads that.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

pub const FONT_FAMILY: &str = "Noto Sans JP";
pub const WEIGHT_REGULAR: u16 = 400;
pub const WEIGHT_MEDIUM: u16 = 500;

const FONT_CSS_ENDPOINT: &str = "https://fonts.googleapis.com/css2";

// With no browser User-Agent the endpoint serves truetype sources, which is
// what the rasterizer's font database can load.
static FONT_SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"src:\s*url\(([^)]+)\)\s*format\('(?:truetype|opentype)'\)")
        .expect("font src pattern is valid")
});

/// Force the lazily compiled pieces of this module. Idempotent; called once
/// at startup so the first render doesn't pay for them.
pub(crate) fn init() {
    LazyLock::force(&FONT_SRC_RE);
}

#[derive(Debug, thiserror::Error)]
pub enum FontFetchError {
    #[error("font css request failed: {0}")]
    CssRequest(String),
    #[error("font css returned status {0}")]
    CssStatus(u16),
    #[error("no truetype src found in font css")]
    MissingSrc,
    #[error("font binary request failed: {0}")]
    BinaryRequest(String),
    #[error("font binary returned status {0}")]
    BinaryStatus(u16),
    #[error("font binary is not parsable")]
    Unparsable,
}

/// A fetched font subset plus the metrics the layout pass needs from it.
#[derive(Debug, Clone)]
pub struct FontAsset {
    pub family: &'static str,
    pub weight: u16,
    pub data: Vec<u8>,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    advances: HashMap<char, u16>,
}

impl FontAsset {
    /// Parse a font binary and precompute advances for the characters of
    /// `text` (the exact set the subset was requested for).
    pub fn from_bytes(weight: u16, text: &str, data: Vec<u8>) -> Result<Self, FontFetchError> {
        let face = ttf_parser::Face::parse(&data, 0).map_err(|_| FontFetchError::Unparsable)?;

        let units_per_em = face.units_per_em();
        let ascender = face.ascender();
        let descender = face.descender();

        let mut advances = HashMap::new();
        for c in text.chars() {
            if let Some(glyph) = face.glyph_index(c)
                && let Some(advance) = face.glyph_hor_advance(glyph)
            {
                advances.insert(c, advance);
            }
        }

        Ok(Self {
            family: FONT_FAMILY,
            weight,
            data,
            units_per_em,
            ascender,
            descender,
            advances,
        })
    }

    /// Advance width of `text` at `px` font size. Characters outside the
    /// subset (emoji, which render as images) contribute nothing.
    pub fn text_width(&self, text: &str, px: f32) -> f32 {
        let units: u32 = text
            .chars()
            .map(|c| u32::from(self.advances.get(&c).copied().unwrap_or(0)))
            .sum();
        units as f32 * px / f32::from(self.units_per_em)
    }

    /// Distance from the top of a line box to the text baseline at `px`.
    pub fn ascent(&self, px: f32) -> f32 {
        f32::from(self.ascender) * px / f32::from(self.units_per_em)
    }

    /// Default line box height at `px`.
    pub fn line_height(&self, px: f32) -> f32 {
        f32::from(self.ascender - self.descender) * px / f32::from(self.units_per_em)
    }

    #[cfg(test)]
    pub(crate) fn fixed_width_stub(advance_per_char: u16) -> Self {
        // Every ASCII char gets the same advance; units_per_em 1000 so a
        // 1000px font size yields `advance_per_char` px per char.
        let mut advances = HashMap::new();
        for c in ' '..='~' {
            advances.insert(c, advance_per_char);
        }
        Self {
            family: FONT_FAMILY,
            weight: WEIGHT_REGULAR,
            data: Vec::new(),
            units_per_em: 1000,
            ascender: 800,
            descender: -200,
            advances,
        }
    }
}

/// Extract the font binary URL from a fetched stylesheet.
fn extract_src_url(css: &str) -> Option<&str> {
    FONT_SRC_RE
        .captures(css)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().trim())
}

/// Build the CSS request URL for one family/weight/text subset.
fn subset_css_url(weight: u16, text: &str) -> Result<url::Url, FontFetchError> {
    let mut url = url::Url::parse(FONT_CSS_ENDPOINT)
        .map_err(|e| FontFetchError::CssRequest(e.to_string()))?;
    url.query_pairs_mut()
        .append_pair("family", &format!("{FONT_FAMILY}:wght@{weight}"))
        .append_pair("text", text);
    Ok(url)
}

/// Fetch a font subset covering exactly the characters of `text`.
///
/// A dummy leading character is prepended before the request: an empty or
/// all-unsupported-glyph string can otherwise produce an empty subset
/// response that fails to parse downstream.
pub async fn fetch_font_subset(
    client: &reqwest::Client,
    text: &str,
    weight: u16,
) -> Result<FontAsset, FontFetchError> {
    let subset_text = format!("x{text}");
    let css_url = subset_css_url(weight, &subset_text)?;

    let response = client
        .get(css_url)
        .send()
        .await
        .map_err(|e| FontFetchError::CssRequest(e.to_string()))?;
    if !response.status().is_success() {
        return Err(FontFetchError::CssStatus(response.status().as_u16()));
    }
    let css = response
        .text()
        .await
        .map_err(|e| FontFetchError::CssRequest(e.to_string()))?;

    let binary_url = extract_src_url(&css).ok_or(FontFetchError::MissingSrc)?;

    let response = client
        .get(binary_url)
        .send()
        .await
        .map_err(|e| FontFetchError::BinaryRequest(e.to_string()))?;
    if !response.status().is_success() {
        return Err(FontFetchError::BinaryStatus(response.status().as_u16()));
    }
    let data = response
        .bytes()
        .await
        .map_err(|e| FontFetchError::BinaryRequest(e.to_string()))?;

    FontAsset::from_bytes(weight, &subset_text, data.to_vec())
}
