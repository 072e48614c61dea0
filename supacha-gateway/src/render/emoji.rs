//! Emoji-to-image resolution against the twemoji asset CDN.
//!
//! A grapheme cluster maps to a codepoint key (`2764` for a heart,
//! `1f468-200d-1f469-200d-1f466` for a joined family) that names a vector
//! asset on the CDN. The asset is inlined as a base64 data URI so the
//! rasterizer never touches the network.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

const TWEMOJI_BASE: &str = "https://cdn.jsdelivr.net/gh/twitter/twemoji@14.0.2/assets/svg";

const ZWJ: char = '\u{200d}';
/// VARIATION SELECTOR-16 (emoji presentation selector)
const VS16: char = '\u{fe0f}';

#[derive(Debug, thiserror::Error)]
pub enum EmojiFetchError {
    #[error("emoji request failed: {0}")]
    RequestFailed(String),
    #[error("emoji asset {key} returned status {status}")]
    Status { key: String, status: u16 },
}

/// Codepoint key for a grapheme cluster, matching the CDN's asset naming.
///
/// VS16 is dropped unless the cluster also contains a ZWJ: joiner-based
/// composite emoji never carry the selector in asset names, while many single
/// emoji do and must have it stripped.
pub fn emoji_code(segment: &str) -> String {
    let stripped: String = if segment.contains(ZWJ) {
        segment.to_string()
    } else {
        segment.chars().filter(|&c| c != VS16).collect()
    };

    stripped
        .chars()
        .map(|c| format!("{:x}", c as u32))
        .collect::<Vec<_>>()
        .join("-")
}

/// True when a grapheme cluster should render as an emoji image rather than
/// as font glyphs.
pub fn is_emoji(segment: &str) -> bool {
    segment.chars().any(|c| {
        matches!(
            u32::from(c),
            0x1F000..=0x1FAFF   // enclosed ideographs, pictographs, symbols
                | 0x2600..=0x27BF // misc symbols, dingbats
                | 0x2B00..=0x2BFF // arrows, stars, squares
                | 0x20E3          // keycap combiner
                | 0xFE0F          // VS16 forces emoji presentation
                | 0x200D
        )
    })
}

/// Fetch the vector asset for a grapheme cluster and inline it as a data URI.
pub async fn fetch_emoji(
    client: &reqwest::Client,
    segment: &str,
) -> Result<String, EmojiFetchError> {
    let code = emoji_code(segment);
    let url = format!("{TWEMOJI_BASE}/{code}.svg");

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| EmojiFetchError::RequestFailed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(EmojiFetchError::Status {
            key: code,
            status: response.status().as_u16(),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| EmojiFetchError::RequestFailed(e.to_string()))?;

    Ok(format!("data:image/svg+xml;base64,{}", BASE64.encode(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_codepoint() {
        assert_eq!(emoji_code("😀"), "1f600");
    }

    #[test]
    fn selector_is_stripped_without_joiner() {
        // Red heart: U+2764 U+FE0F
        assert_eq!(emoji_code("❤\u{fe0f}"), "2764");
    }

    #[test]
    fn selector_is_kept_with_joiner() {
        // Heart on fire: U+2764 U+FE0F U+200D U+1F525
        assert_eq!(emoji_code("❤\u{fe0f}\u{200d}🔥"), "2764-fe0f-200d-1f525");
    }

    #[test]
    fn joined_family_keeps_all_codepoints() {
        assert_eq!(
            emoji_code("👨\u{200d}👩\u{200d}👧\u{200d}👦"),
            "1f468-200d-1f469-200d-1f467-200d-1f466"
        );
    }

    #[test]
    fn key_is_lowercase_hex() {
        let code = emoji_code("🇯🇵");
        assert_eq!(code, "1f1ef-1f1f5");
        assert_eq!(code, code.to_lowercase());
    }

    #[test]
    fn emoji_classification() {
        assert!(is_emoji("😀"));
        assert!(is_emoji("❤\u{fe0f}"));
        assert!(is_emoji("🇯🇵"));
        assert!(is_emoji("1\u{fe0f}\u{20e3}"));
        assert!(!is_emoji("a"));
        assert!(!is_emoji("あ"));
        assert!(!is_emoji("漢"));
    }
}
