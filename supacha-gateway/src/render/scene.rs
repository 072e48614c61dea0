//! The card's render scene: a small styled box tree and the layout pass that
//! resolves it into absolutely positioned primitives.
//!
//! The tree is built once per render, laid out, serialized to SVG and
//! dropped. Boxes flow their children like a single-axis flexbox (column or
//! row, padding, gap, optional cross-axis centering); text nodes carry
//! pre-shaped lines whose widths were measured against the fetched font
//! subsets at build time.

use supacha_core::Rgba;

#[derive(Debug, Clone)]
pub struct Scene {
    pub width: f32,
    pub root: Node,
}

#[derive(Debug, Clone)]
pub enum Node {
    Box(BoxNode),
    Text(TextNode),
    Image(ImageNode),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Direction {
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Align {
    Start,
    Center,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub const ZERO: Self = Self {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    pub const fn symmetric(vertical: f32, horizontal: f32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

#[derive(Debug, Clone)]
pub struct BoxStyle {
    pub direction: Direction,
    pub padding: Edges,
    pub gap: f32,
    pub align: Align,
    pub background: Option<Rgba>,
    pub corner_radius: f32,
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            direction: Direction::Column,
            padding: Edges::ZERO,
            gap: 0.0,
            align: Align::Start,
            background: None,
            corner_radius: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BoxNode {
    pub style: BoxStyle,
    pub children: Vec<Node>,
}

/// A block of pre-shaped text lines sharing one font face and color.
#[derive(Debug, Clone)]
pub struct TextNode {
    pub lines: Vec<Line>,
    pub size: f32,
    pub weight: u16,
    pub color: Rgba,
    /// Distance from line-box top to the baseline, in px.
    pub ascent: f32,
    pub line_height: f32,
}

#[derive(Debug, Clone)]
pub struct Line {
    pub runs: Vec<InlineRun>,
    pub width: f32,
}

#[derive(Debug, Clone)]
pub enum InlineRun {
    Text { content: String, width: f32 },
    Emoji { uri: String, size: f32 },
}

/// A circular image slot: an avatar when `uri` is set, otherwise a neutral
/// placeholder circle.
#[derive(Debug, Clone)]
pub struct ImageNode {
    pub uri: Option<String>,
    pub size: f32,
    pub fallback: Rgba,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    RoundedRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        fill: Rgba,
    },
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
        fill: Rgba,
    },
    CircleImage {
        x: f32,
        y: f32,
        size: f32,
        uri: String,
    },
    Text {
        x: f32,
        baseline: f32,
        content: String,
        size: f32,
        weight: u16,
        color: Rgba,
    },
    EmojiImage {
        x: f32,
        y: f32,
        size: f32,
        uri: String,
    },
}

#[derive(Debug)]
pub struct LayoutOutput {
    pub primitives: Vec<Primitive>,
    /// Height of the laid-out content; the canvas below this line is slack.
    pub height: f32,
}

/// Resolve the scene into positioned primitives, top-left at the origin.
pub fn layout(scene: &Scene) -> LayoutOutput {
    let mut primitives = Vec::new();
    let (_, height) = arrange(&scene.root, 0.0, 0.0, scene.width, &mut primitives);
    LayoutOutput { primitives, height }
}

/// Natural (width, height) of a node within `avail_w`.
fn measure(node: &Node, avail_w: f32) -> (f32, f32) {
    match node {
        Node::Box(b) => {
            let content_w = avail_w - b.style.padding.horizontal();
            match b.style.direction {
                Direction::Column => {
                    let mut height = 0.0;
                    for (i, child) in b.children.iter().enumerate() {
                        if i > 0 {
                            height += b.style.gap;
                        }
                        height += measure(child, content_w).1;
                    }
                    (avail_w, height + b.style.padding.vertical())
                }
                Direction::Row => {
                    let mut width = 0.0;
                    let mut height: f32 = 0.0;
                    for (i, child) in b.children.iter().enumerate() {
                        if i > 0 {
                            width += b.style.gap;
                        }
                        let (cw, ch) = measure(child, content_w);
                        width += cw;
                        height = height.max(ch);
                    }
                    (
                        width + b.style.padding.horizontal(),
                        height + b.style.padding.vertical(),
                    )
                }
            }
        }
        Node::Text(t) => {
            let width = t.lines.iter().map(|l| l.width).fold(0.0, f32::max);
            (width, t.lines.len() as f32 * t.line_height)
        }
        Node::Image(i) => (i.size, i.size),
    }
}

fn arrange(node: &Node, x: f32, y: f32, avail_w: f32, out: &mut Vec<Primitive>) -> (f32, f32) {
    match node {
        Node::Box(b) => {
            let (_, height) = measure(node, avail_w);
            if let Some(fill) = b.style.background {
                out.push(Primitive::RoundedRect {
                    x,
                    y,
                    width: avail_w,
                    height,
                    radius: b.style.corner_radius,
                    fill,
                });
            }

            let content_x = x + b.style.padding.left;
            let content_w = avail_w - b.style.padding.horizontal();
            match b.style.direction {
                Direction::Column => {
                    let mut cy = y + b.style.padding.top;
                    for (i, child) in b.children.iter().enumerate() {
                        if i > 0 {
                            cy += b.style.gap;
                        }
                        let (_, ch) = arrange(child, content_x, cy, content_w, out);
                        cy += ch;
                    }
                }
                Direction::Row => {
                    let inner_h = height - b.style.padding.vertical();
                    let mut cx = content_x;
                    for (i, child) in b.children.iter().enumerate() {
                        if i > 0 {
                            cx += b.style.gap;
                        }
                        let (cw, ch) = measure(child, content_w);
                        let cy = y
                            + b.style.padding.top
                            + match b.style.align {
                                Align::Start => 0.0,
                                Align::Center => (inner_h - ch) / 2.0,
                            };
                        arrange(child, cx, cy, cw, out);
                        cx += cw;
                    }
                }
            }
            (avail_w, height)
        }
        Node::Text(t) => {
            let (width, height) = measure(node, avail_w);
            for (i, line) in t.lines.iter().enumerate() {
                let line_top = y + i as f32 * t.line_height;
                let baseline = line_top + t.ascent;
                let mut cursor = x;
                for run in &line.runs {
                    match run {
                        InlineRun::Text { content, width } => {
                            out.push(Primitive::Text {
                                x: cursor,
                                baseline,
                                content: content.clone(),
                                size: t.size,
                                weight: t.weight,
                                color: t.color,
                            });
                            cursor += width;
                        }
                        InlineRun::Emoji { uri, size } => {
                            out.push(Primitive::EmojiImage {
                                x: cursor,
                                y: line_top + (t.line_height - size) / 2.0,
                                size: *size,
                                uri: uri.clone(),
                            });
                            cursor += size;
                        }
                    }
                }
            }
            (width, height)
        }
        Node::Image(i) => {
            match &i.uri {
                Some(uri) => out.push(Primitive::CircleImage {
                    x,
                    y,
                    size: i.size,
                    uri: uri.clone(),
                }),
                None => out.push(Primitive::Circle {
                    cx: x + i.size / 2.0,
                    cy: y + i.size / 2.0,
                    radius: i.size / 2.0,
                    fill: i.fallback,
                }),
            }
            (i.size, i.size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_node(lines: Vec<Line>, line_height: f32) -> TextNode {
        TextNode {
            lines,
            size: 15.0,
            weight: 400,
            color: Rgba::new(0, 0, 0, 1.0),
            ascent: line_height * 0.8,
            line_height,
        }
    }

    fn plain_line(content: &str, width: f32) -> Line {
        Line {
            runs: vec![InlineRun::Text {
                content: content.to_string(),
                width,
            }],
            width,
        }
    }

    #[test]
    fn column_stacks_children_with_padding_and_gap() {
        let scene = Scene {
            width: 100.0,
            root: Node::Box(BoxNode {
                style: BoxStyle {
                    padding: Edges::symmetric(10.0, 5.0),
                    gap: 4.0,
                    background: Some(Rgba::new(1, 2, 3, 1.0)),
                    ..Default::default()
                },
                children: vec![
                    Node::Text(text_node(vec![plain_line("a", 20.0)], 20.0)),
                    Node::Text(text_node(vec![plain_line("b", 20.0)], 20.0)),
                ],
            }),
        };

        let out = layout(&scene);
        assert_eq!(out.height, 10.0 + 20.0 + 4.0 + 20.0 + 10.0);

        match &out.primitives[0] {
            Primitive::RoundedRect { width, height, .. } => {
                assert_eq!(*width, 100.0);
                assert_eq!(*height, out.height);
            }
            other => panic!("expected background rect, got {other:?}"),
        }
        match &out.primitives[2] {
            Primitive::Text { x, baseline, .. } => {
                assert_eq!(*x, 5.0);
                // second line box starts below the first plus the gap
                assert_eq!(*baseline, 10.0 + 20.0 + 4.0 + 16.0);
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn row_centers_children_on_the_cross_axis() {
        let scene = Scene {
            width: 200.0,
            root: Node::Box(BoxNode {
                style: BoxStyle {
                    direction: Direction::Row,
                    gap: 16.0,
                    align: Align::Center,
                    ..Default::default()
                },
                children: vec![
                    Node::Image(ImageNode {
                        uri: None,
                        size: 80.0,
                        fallback: Rgba::new(128, 128, 128, 1.0),
                    }),
                    Node::Text(text_node(vec![plain_line("name", 40.0)], 20.0)),
                ],
            }),
        };

        let out = layout(&scene);
        assert_eq!(out.height, 80.0);

        match &out.primitives[0] {
            Primitive::Circle { cx, cy, radius, .. } => {
                assert_eq!((*cx, *cy, *radius), (40.0, 40.0, 40.0));
            }
            other => panic!("expected placeholder circle, got {other:?}"),
        }
        match &out.primitives[1] {
            Primitive::Text { x, baseline, .. } => {
                assert_eq!(*x, 80.0 + 16.0);
                // 20px line box centered in an 80px row: top at 30, ascent 16
                assert_eq!(*baseline, 30.0 + 16.0);
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn emoji_runs_advance_the_cursor_by_their_size() {
        let line = Line {
            runs: vec![
                InlineRun::Text {
                    content: "hi ".to_string(),
                    width: 30.0,
                },
                InlineRun::Emoji {
                    uri: "data:image/svg+xml;base64,AA==".to_string(),
                    size: 15.0,
                },
                InlineRun::Text {
                    content: " there".to_string(),
                    width: 60.0,
                },
            ],
            width: 105.0,
        };
        let scene = Scene {
            width: 200.0,
            root: Node::Text(text_node(vec![line], 21.0)),
        };

        let out = layout(&scene);
        let xs: Vec<f32> = out
            .primitives
            .iter()
            .map(|p| match p {
                Primitive::Text { x, .. } | Primitive::EmojiImage { x, .. } => *x,
                other => panic!("unexpected primitive {other:?}"),
            })
            .collect();
        assert_eq!(xs, vec![0.0, 30.0, 45.0]);

        match &out.primitives[1] {
            Primitive::EmojiImage { y, size, .. } => {
                assert_eq!(*size, 15.0);
                assert_eq!(*y, (21.0 - 15.0) / 2.0);
            }
            other => panic!("expected emoji image, got {other:?}"),
        }
    }

    #[test]
    fn avatar_image_is_emitted_when_a_uri_is_present() {
        let scene = Scene {
            width: 100.0,
            root: Node::Image(ImageNode {
                uri: Some("data:image/png;base64,AA==".to_string()),
                size: 80.0,
                fallback: Rgba::TRANSPARENT,
            }),
        };
        let out = layout(&scene);
        assert!(matches!(
            &out.primitives[0],
            Primitive::CircleImage { size, .. } if *size == 80.0
        ));
    }
}
