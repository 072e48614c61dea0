//! Price tier tables for superchat cards.
//!
//! Two statically sorted tables keyed by price threshold: one for the card
//! color scheme, one for the maximum message length. A price resolves to the
//! entry with the greatest threshold at or below it.

/// An RGB color with a separate opacity, emitted as `fill` + `fill-opacity`
/// when the card is serialized to SVG.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0.0);

    /// CSS `rgb(...)` form, opacity excluded.
    pub fn css_rgb(&self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// Color scheme of one price bracket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierColor {
    pub background: Rgba,
    pub text: Rgba,
    pub name: Rgba,
}

/// Fallback for prices below the smallest threshold. Validation rejects such
/// prices before rendering; the transparent scheme only exists so the lookup
/// stays total.
pub const DEFAULT_COLOR: TierColor = TierColor {
    background: Rgba::TRANSPARENT,
    text: Rgba::TRANSPARENT,
    name: Rgba::TRANSPARENT,
};

const COLOR_TABLE: &[(u32, TierColor)] = &[
    (
        100,
        TierColor {
            background: Rgba::new(30, 136, 229, 1.0),
            text: Rgba::new(255, 255, 255, 1.0),
            name: Rgba::new(255, 255, 255, 0.7019608),
        },
    ),
    (
        200,
        TierColor {
            background: Rgba::new(0, 229, 255, 1.0),
            text: Rgba::new(0, 0, 0, 1.0),
            name: Rgba::new(0, 0, 0, 0.7019608),
        },
    ),
    (
        500,
        TierColor {
            background: Rgba::new(29, 233, 182, 1.0),
            text: Rgba::new(0, 0, 0, 1.0),
            name: Rgba::new(0, 0, 0, 0.5411765),
        },
    ),
    (
        1000,
        TierColor {
            background: Rgba::new(255, 202, 40, 1.0),
            text: Rgba::new(0, 0, 0, 0.8745098),
            name: Rgba::new(0, 0, 0, 0.5411765),
        },
    ),
    (
        2000,
        TierColor {
            background: Rgba::new(245, 124, 0, 1.0),
            text: Rgba::new(255, 255, 255, 0.8745098),
            name: Rgba::new(255, 255, 255, 0.7019608),
        },
    ),
    (
        5000,
        TierColor {
            background: Rgba::new(233, 30, 99, 1.0),
            text: Rgba::new(255, 255, 255, 1.0),
            name: Rgba::new(255, 255, 255, 0.7019608),
        },
    ),
    (
        10000,
        TierColor {
            background: Rgba::new(230, 33, 23, 1.0),
            text: Rgba::new(255, 255, 255, 1.0),
            name: Rgba::new(255, 255, 255, 0.7019608),
        },
    ),
];

/// Maximum message length (in grapheme clusters) per price bracket.
const LENGTH_TABLE: &[(u32, usize)] = &[
    (100, 0),
    (200, 50),
    (500, 150),
    (1000, 200),
    (2000, 225),
    (5000, 250),
    (10000, 270),
    (20000, 290),
    (30000, 310),
    (40000, 330),
    (50000, 350),
];

/// Entry with the greatest threshold <= price, or `default` below the table.
fn lookup<T: Copy>(table: &[(u32, T)], price: u32, default: T) -> T {
    let idx = table.partition_point(|(threshold, _)| *threshold <= price);
    if idx == 0 { default } else { table[idx - 1].1 }
}

/// Card color scheme for a price.
pub fn tier_color(price: u32) -> TierColor {
    lookup(COLOR_TABLE, price, DEFAULT_COLOR)
}

/// Maximum allowed message length for a price, in grapheme clusters.
pub fn max_message_len(price: u32) -> usize {
    lookup(LENGTH_TABLE, price, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_thresholds_resolve_to_their_own_tier() {
        for &(threshold, color) in COLOR_TABLE {
            assert_eq!(tier_color(threshold), color);
        }
        for &(threshold, len) in LENGTH_TABLE {
            assert_eq!(max_message_len(threshold), len);
        }
    }

    #[test]
    fn prices_between_thresholds_resolve_downward() {
        assert_eq!(tier_color(1500), tier_color(1000));
        assert_eq!(tier_color(199), tier_color(100));
        assert_eq!(tier_color(9999), tier_color(5000));
        assert_eq!(max_message_len(1500), 200);
        assert_eq!(max_message_len(150), 0);
        assert_eq!(max_message_len(49999), 330);
    }

    #[test]
    fn color_table_saturates_at_ten_thousand() {
        assert_eq!(tier_color(20000), tier_color(10000));
        assert_eq!(tier_color(50000), tier_color(10000));
    }

    #[test]
    fn length_cap_at_maximum_price() {
        assert_eq!(max_message_len(50000), 350);
        assert_eq!(max_message_len(u32::MAX), 350);
    }

    // Boundary condition: below the smallest threshold the lookup falls
    // through to the empty default. Validation keeps such prices out of the
    // render path.
    #[test]
    fn below_minimum_falls_through_to_default() {
        assert_eq!(tier_color(99), DEFAULT_COLOR);
        assert_eq!(tier_color(0), DEFAULT_COLOR);
        assert_eq!(max_message_len(99), 0);
    }

    #[test]
    fn tables_are_strictly_increasing() {
        for pair in COLOR_TABLE.windows(2) {
            assert!(pair[0].0 < pair[1].0);
        }
        for pair in LENGTH_TABLE.windows(2) {
            assert!(pair[0].0 < pair[1].0);
        }
    }
}
