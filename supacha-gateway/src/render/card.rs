//! Superchat card composition and SVG emission.
//!
//! Mirrors the fixed card structure: a rounded column with the tier's
//! background color, a header row (circular avatar or placeholder, name with
//! ellipsis overflow, `￥price`), and an optional word-wrapped message block.
//! Emoji graphemes encountered while shaping text are swapped for inline
//! images through the emoji resolver.

use std::fmt::Write;

use supacha_core::{Rgba, SuperchatRequest, tier_color};
use unicode_segmentation::UnicodeSegmentation;

use super::emoji::{self, EmojiFetchError};
use super::fonts::{FONT_FAMILY, FontAsset, WEIGHT_MEDIUM, WEIGHT_REGULAR};
use super::scene::{
    Align, BoxNode, BoxStyle, Direction, Edges, ImageNode, InlineRun, Line, Node, Primitive, Scene,
    TextNode, layout,
};

pub const CARD_WIDTH: f32 = 368.0;

// The canvas is rasterized taller than any card and trimmed to the visible
// bounding box afterwards.
const CANVAS_HEIGHT: f32 = 1024.0;

const CORNER_RADIUS: f32 = 12.0;
const BASE_FONT_SIZE: f32 = 15.0;
const NAME_FONT_SIZE: f32 = 14.0;
const AVATAR_SIZE: f32 = 80.0;
const PAD_X: f32 = 16.0;
const PAD_Y: f32 = 8.0;
const AVATAR_GAP: f32 = 16.0;
const NAME_PRICE_GAP: f32 = 8.0;
const ELLIPSIS: &str = "…";

const PLACEHOLDER_FILL: Rgba = Rgba::new(158, 158, 158, 1.0);

/// One shaped grapheme: either font glyphs or an inline emoji image.
#[derive(Debug, Clone)]
enum Atom {
    Text { s: String, w: f32 },
    Emoji { uri: String, w: f32 },
}

impl Atom {
    fn width(&self) -> f32 {
        match self {
            Atom::Text { w, .. } | Atom::Emoji { w, .. } => *w,
        }
    }

    fn is_whitespace(&self) -> bool {
        matches!(self, Atom::Text { s, .. } if s.trim().is_empty())
    }
}

/// An unbreakable word: a run of shaped graphemes between word boundaries.
#[derive(Debug, Clone)]
struct ShapedWord {
    atoms: Vec<Atom>,
    width: f32,
}

impl ShapedWord {
    fn is_whitespace(&self) -> bool {
        self.atoms.iter().all(Atom::is_whitespace)
    }
}

/// Shape one line of text into words, resolving emoji graphemes to inline
/// images as they are encountered.
async fn shape_words(
    client: &reqwest::Client,
    text: &str,
    font: &FontAsset,
    px: f32,
) -> Result<Vec<ShapedWord>, EmojiFetchError> {
    let mut words = Vec::new();
    for segment in text.split_word_bounds() {
        let mut atoms = Vec::new();
        let mut width = 0.0;
        for grapheme in segment.graphemes(true) {
            let atom = if emoji::is_emoji(grapheme) {
                let uri = emoji::fetch_emoji(client, grapheme).await?;
                Atom::Emoji { uri, w: px }
            } else {
                Atom::Text {
                    s: grapheme.to_string(),
                    w: font.text_width(grapheme, px),
                }
            };
            width += atom.width();
            atoms.push(atom);
        }
        words.push(ShapedWord { atoms, width });
    }
    Ok(words)
}

/// Merge shaped atoms into a line, coalescing adjacent text runs.
fn merge_atoms(atoms: Vec<Atom>) -> Line {
    let mut runs: Vec<InlineRun> = Vec::new();
    let mut total = 0.0;
    for atom in atoms {
        total += atom.width();
        match atom {
            Atom::Text { s, w } => {
                if let Some(InlineRun::Text { content, width }) = runs.last_mut() {
                    content.push_str(&s);
                    *width += w;
                } else {
                    runs.push(InlineRun::Text { content: s, width: w });
                }
            }
            Atom::Emoji { uri, w } => runs.push(InlineRun::Emoji { uri, size: w }),
        }
    }
    Line { runs, width: total }
}

/// Wrap words to `max_w`, breaking at word boundaries and falling back to
/// grapheme breaks for words wider than a whole line.
fn wrap_words(words: &[ShapedWord], max_w: f32) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current: Vec<Atom> = Vec::new();
    let mut current_w = 0.0;

    let flush = |current: &mut Vec<Atom>, current_w: &mut f32, lines: &mut Vec<Line>| {
        while current.last().is_some_and(Atom::is_whitespace) {
            let dropped = current.pop();
            *current_w -= dropped.map(|a| a.width()).unwrap_or(0.0);
        }
        lines.push(merge_atoms(std::mem::take(current)));
        *current_w = 0.0;
    };

    for word in words {
        if current_w + word.width > max_w && current_w > 0.0 {
            flush(&mut current, &mut current_w, &mut lines);
            if word.is_whitespace() {
                continue;
            }
        }

        if word.width > max_w {
            for atom in &word.atoms {
                if current_w + atom.width() > max_w && current_w > 0.0 {
                    flush(&mut current, &mut current_w, &mut lines);
                }
                current_w += atom.width();
                current.push(atom.clone());
            }
        } else {
            if current.is_empty() && word.is_whitespace() {
                continue;
            }
            current_w += word.width;
            current.extend(word.atoms.iter().cloned());
        }
    }

    if !current.is_empty() || lines.is_empty() {
        flush(&mut current, &mut current_w, &mut lines);
    }
    lines
}

/// Fit words onto a single line, truncating at a grapheme boundary with an
/// ellipsis when they overflow `max_w`.
fn truncate_words(words: &[ShapedWord], max_w: f32, ellipsis: Atom) -> Line {
    let total: f32 = words.iter().map(|w| w.width).sum();
    if total <= max_w {
        let atoms: Vec<Atom> = words.iter().flat_map(|w| w.atoms.iter().cloned()).collect();
        return merge_atoms(atoms);
    }

    let target = (max_w - ellipsis.width()).max(0.0);
    let mut kept = Vec::new();
    let mut kept_w = 0.0;
    'outer: for word in words {
        for atom in &word.atoms {
            if kept_w + atom.width() > target {
                break 'outer;
            }
            kept_w += atom.width();
            kept.push(atom.clone());
        }
    }
    kept.push(ellipsis);
    merge_atoms(kept)
}

fn text_block(lines: Vec<Line>, size: f32, weight: u16, color: Rgba, font: &FontAsset) -> TextNode {
    TextNode {
        lines,
        size,
        weight,
        color,
        ascent: font.ascent(size),
        line_height: font.line_height(size),
    }
}

/// Compose the card scene for one request.
///
/// Async only because emoji segments resolve against the asset CDN while the
/// text is shaped; the geometry itself is deterministic given the fonts.
pub async fn build_scene(
    client: &reqwest::Client,
    request: &SuperchatRequest,
    icon: Option<&str>,
    medium: &FontAsset,
    regular: &FontAsset,
) -> Result<Scene, EmojiFetchError> {
    let color = tier_color(request.price);
    let content_w = CARD_WIDTH - 2.0 * PAD_X;

    let price_text = format!("￥{}", request.price);
    let price_width = medium.text_width(&price_text, BASE_FONT_SIZE);
    let price_line = Line {
        runs: vec![InlineRun::Text {
            content: price_text,
            width: price_width,
        }],
        width: price_width,
    };

    let name_max = (content_w - AVATAR_SIZE - AVATAR_GAP - NAME_PRICE_GAP - price_width).max(0.0);
    let name_words = shape_words(client, &request.name, medium, NAME_FONT_SIZE).await?;
    let ellipsis = Atom::Text {
        s: ELLIPSIS.to_string(),
        w: medium.text_width(ELLIPSIS, NAME_FONT_SIZE),
    };
    let name_line = truncate_words(&name_words, name_max, ellipsis);

    let header = Node::Box(BoxNode {
        style: BoxStyle {
            direction: Direction::Row,
            padding: Edges::symmetric(PAD_Y, PAD_X),
            gap: AVATAR_GAP,
            align: Align::Center,
            ..Default::default()
        },
        children: vec![
            Node::Image(ImageNode {
                uri: icon.map(str::to_string),
                size: AVATAR_SIZE,
                fallback: PLACEHOLDER_FILL,
            }),
            Node::Box(BoxNode {
                style: BoxStyle {
                    direction: Direction::Row,
                    gap: NAME_PRICE_GAP,
                    align: Align::Center,
                    ..Default::default()
                },
                children: vec![
                    Node::Text(text_block(
                        vec![name_line],
                        NAME_FONT_SIZE,
                        WEIGHT_MEDIUM,
                        color.name,
                        medium,
                    )),
                    Node::Text(text_block(
                        vec![price_line],
                        BASE_FONT_SIZE,
                        WEIGHT_MEDIUM,
                        color.text,
                        medium,
                    )),
                ],
            }),
        ],
    });

    let mut children = vec![header];

    if let Some(message) = request.message.as_deref().filter(|m| !m.is_empty()) {
        let mut lines = Vec::new();
        for raw_line in message.split('\n') {
            let words = shape_words(client, raw_line, regular, BASE_FONT_SIZE).await?;
            lines.extend(wrap_words(&words, content_w));
        }
        children.push(Node::Box(BoxNode {
            style: BoxStyle {
                padding: Edges {
                    top: 0.0,
                    right: PAD_X,
                    bottom: PAD_Y,
                    left: PAD_X,
                },
                ..Default::default()
            },
            children: vec![Node::Text(text_block(
                lines,
                BASE_FONT_SIZE,
                WEIGHT_REGULAR,
                color.text,
                regular,
            ))],
        }));
    }

    Ok(Scene {
        width: CARD_WIDTH,
        root: Node::Box(BoxNode {
            style: BoxStyle {
                background: Some(color.background),
                corner_radius: CORNER_RADIUS,
                ..Default::default()
            },
            children,
        }),
    })
}

/// Lay the scene out and serialize it to an SVG document on the generous
/// canvas. Returns the document and the laid-out content height.
pub fn render_svg(scene: &Scene) -> (String, f32) {
    let out = layout(scene);
    let canvas_h = CANVAS_HEIGHT.max(out.height.ceil());
    let width = scene.width;

    let mut defs = String::new();
    let mut body = String::new();
    let mut clip_count = 0usize;

    for primitive in &out.primitives {
        match primitive {
            Primitive::RoundedRect {
                x,
                y,
                width,
                height,
                radius,
                fill,
            } => {
                let _ = write!(
                    body,
                    r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" rx="{radius}" fill="{}" fill-opacity="{}"/>"#,
                    fill.css_rgb(),
                    fill.a,
                );
            }
            Primitive::Circle {
                cx,
                cy,
                radius,
                fill,
            } => {
                let _ = write!(
                    body,
                    r#"<circle cx="{cx}" cy="{cy}" r="{radius}" fill="{}" fill-opacity="{}"/>"#,
                    fill.css_rgb(),
                    fill.a,
                );
            }
            Primitive::CircleImage { x, y, size, uri } => {
                let r = size / 2.0;
                let _ = write!(
                    defs,
                    r#"<clipPath id="avatar{clip_count}"><circle cx="{}" cy="{}" r="{r}"/></clipPath>"#,
                    x + r,
                    y + r,
                );
                let _ = write!(
                    body,
                    r#"<image x="{x}" y="{y}" width="{size}" height="{size}" href="{uri}" clip-path="url(#avatar{clip_count})" preserveAspectRatio="xMidYMid slice"/>"#,
                );
                clip_count += 1;
            }
            Primitive::Text {
                x,
                baseline,
                content,
                size,
                weight,
                color,
            } => {
                let _ = write!(
                    body,
                    r#"<text x="{x}" y="{baseline}" font-family="{FONT_FAMILY}" font-size="{size}" font-weight="{weight}" fill="{}" fill-opacity="{}">{}</text>"#,
                    color.css_rgb(),
                    color.a,
                    xml_escape(content),
                );
            }
            Primitive::EmojiImage { x, y, size, uri } => {
                let _ = write!(
                    body,
                    r#"<image x="{x}" y="{y}" width="{size}" height="{size}" href="{uri}"/>"#,
                );
            }
        }
    }

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{canvas_h}" viewBox="0 0 {width} {canvas_h}">"#,
    );
    if !defs.is_empty() {
        svg.push_str("<defs>");
        svg.push_str(&defs);
        svg.push_str("</defs>");
    }
    svg.push_str(&body);
    svg.push_str("</svg>");

    (svg, out.height)
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
