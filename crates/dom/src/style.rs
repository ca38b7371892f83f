//! Computed style extension point
//!
//! Layout is only known to the surface that renders the augmented markup, so
//! the core defines the snapshot shape and a source trait, and carries the
//! values opaquely.

use serde::{Deserialize, Serialize};

/// Live layout properties of one rendered element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComputedStyles {
    pub width: String,
    pub height: String,
    pub display: String,
    pub justify_content: String,
    pub align_items: String,
    pub font_family: String,
    pub color: String,
    pub background_color: String,
    pub margin: String,
    pub padding: String,
    pub font_size: String,
    pub line_height: String,
}

impl ComputedStyles {
    /// Width and height rounded to whole pixels; unparseable values become 0
    pub fn rounded_dimensions(&self) -> (i64, i64) {
        (parse_px(&self.width), parse_px(&self.height))
    }

    /// First family of the font stack, quotes stripped
    pub fn primary_font_family(&self) -> Option<String> {
        let first = self.font_family.split(',').next()?.trim();
        let cleaned: String = first.chars().filter(|c| *c != '"' && *c != '\'').collect();
        (!cleaned.is_empty()).then_some(cleaned)
    }

    /// Top edge of the margin shorthand
    pub fn margin_top(&self) -> Option<&str> {
        self.margin.split_whitespace().next()
    }

    /// Top edge of the padding shorthand
    pub fn padding_top(&self) -> Option<&str> {
        self.padding.split_whitespace().next()
    }
}

/// Leading numeric prefix of a CSS length, rounded
fn parse_px(value: &str) -> i64 {
    let value = value.trim();
    let end = value
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    value[..end]
        .parse::<f64>()
        .map(|v| v.round() as i64)
        .unwrap_or(0)
}

/// Reads computed styles off the rendered element with the given lookup id
pub trait StyleSource {
    fn computed_styles(&self, lookup_id: &str) -> Option<ComputedStyles>;
}

impl<F> StyleSource for F
where
    F: Fn(&str) -> Option<ComputedStyles>,
{
    fn computed_styles(&self, lookup_id: &str) -> Option<ComputedStyles> {
        self(lookup_id)
    }
}
