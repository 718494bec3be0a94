use serde::{Deserialize, Serialize};

use crate::foundation::color::CssColor;
use crate::foundation::core::Rgba8;
use crate::foundation::error::StripResult;
use crate::model::wire::null_as_default;

/// Font size used when an element gives none (or a non-positive one).
pub const DEFAULT_FONT_SIZE: f32 = 24.0;
/// Family used when an element gives none.
pub const DEFAULT_FONT_FAMILY: &str = "Arial";

/// Named placement preset of a text element.
///
/// Unrecognized names deserialize as [`TextPosition::Center`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TextPosition {
    /// Anchored at the left padding, inside the top margin.
    TopLeft,
    /// Anchored at the right padding, inside the top margin.
    TopRight,
    /// Horizontally centred in the bottom margin band.
    Bottom,
    /// Canvas centre.
    #[default]
    Center,
    /// Explicit `x`/`y`.
    Custom,
}

impl From<String> for TextPosition {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "top-left" => Self::TopLeft,
            "top-right" => Self::TopRight,
            "bottom" => Self::Bottom,
            "custom" => Self::Custom,
            _ => Self::Center,
        }
    }
}

impl From<TextPosition> for String {
    fn from(p: TextPosition) -> Self {
        match p {
            TextPosition::TopLeft => "top-left",
            TextPosition::TopRight => "top-right",
            TextPosition::Bottom => "bottom",
            TextPosition::Center => "center",
            TextPosition::Custom => "custom",
        }
        .to_owned()
    }
}

/// Horizontal alignment of a text run relative to its anchor `x`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TextAlign {
    /// Run starts at `x` (`left` or `start`).
    Left,
    /// Run is centred on `x`.
    #[default]
    Center,
    /// Run ends at `x` (`right` or `end`).
    Right,
}

impl From<String> for TextAlign {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Self::Left,
            "right" | "end" => Self::Right,
            _ => Self::Center,
        }
    }
}

impl From<TextAlign> for String {
    fn from(a: TextAlign) -> Self {
        match a {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
        .to_owned()
    }
}

/// Shadow blur used when none (or zero) is given.
pub const DEFAULT_SHADOW_BLUR: f32 = 5.0;
/// Shadow displacement used on an axis given as none (or zero).
pub const DEFAULT_SHADOW_OFFSET: f64 = 2.0;

/// Drop shadow painted beneath one text element.
///
/// Zero fields mean "unset": see [`TextShadow::effective_blur`] and
/// [`TextShadow::effective_offset`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextShadow {
    /// Shadow colour.
    pub color: CssColor,
    /// Blur amount; the Gaussian sigma is `blur / 2`.
    #[serde(deserialize_with = "null_as_default")]
    pub blur: f32,
    /// Horizontal displacement.
    #[serde(deserialize_with = "null_as_default")]
    pub offset_x: f64,
    /// Vertical displacement.
    #[serde(deserialize_with = "null_as_default")]
    pub offset_y: f64,
}

impl Default for TextShadow {
    fn default() -> Self {
        Self {
            color: CssColor::known("rgba(0,0,0,0.5)", Rgba8::new(0, 0, 0, 128)),
            blur: DEFAULT_SHADOW_BLUR,
            offset_x: DEFAULT_SHADOW_OFFSET,
            offset_y: DEFAULT_SHADOW_OFFSET,
        }
    }
}

impl TextShadow {
    /// Blur amount, with zero and non-finite values replaced by [`DEFAULT_SHADOW_BLUR`].
    pub fn effective_blur(&self) -> f32 {
        if self.blur.is_finite() && self.blur != 0.0 {
            self.blur
        } else {
            DEFAULT_SHADOW_BLUR
        }
    }

    /// `(x, y)` displacement; each zero or non-finite axis becomes [`DEFAULT_SHADOW_OFFSET`].
    pub fn effective_offset(&self) -> (f64, f64) {
        let axis = |v: f64| {
            if v.is_finite() && v != 0.0 {
                v
            } else {
                DEFAULT_SHADOW_OFFSET
            }
        };
        (axis(self.offset_x), axis(self.offset_y))
    }
}

/// One caption drawn over the strip. Elements paint in input order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextElement {
    /// Text to draw; no wrapping is applied.
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
    /// Placement preset.
    #[serde(deserialize_with = "null_as_default")]
    pub position: TextPosition,
    /// Horizontal nudge for presets.
    #[serde(deserialize_with = "null_as_default")]
    pub offset_x: f64,
    /// Vertical nudge for presets. For the top presets, `0` means "use the font size".
    #[serde(deserialize_with = "null_as_default")]
    pub offset_y: f64,
    /// Explicit anchor x for [`TextPosition::Custom`].
    pub x: Option<f64>,
    /// Explicit baseline y for [`TextPosition::Custom`].
    pub y: Option<f64>,
    /// Fill colour.
    pub color: CssColor,
    /// Font size in pixels; `0` (or `null`) means [`DEFAULT_FONT_SIZE`].
    #[serde(deserialize_with = "null_as_default")]
    pub font_size: f32,
    /// Requested family name.
    pub font_family: String,
    /// Alignment relative to the anchor.
    #[serde(deserialize_with = "null_as_default")]
    pub align: TextAlign,
    /// Optional drop shadow.
    pub shadow: Option<TextShadow>,
}

impl Default for TextElement {
    fn default() -> Self {
        Self {
            content: String::new(),
            position: TextPosition::Center,
            offset_x: 0.0,
            offset_y: 0.0,
            x: None,
            y: None,
            color: CssColor::known("#000000", Rgba8::BLACK),
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.to_owned(),
            align: TextAlign::Center,
            shadow: None,
        }
    }
}

impl TextElement {
    /// Fail with a validation error naming the first colour field that does not parse.
    ///
    /// `index` is the element's position in `textElements`.
    pub fn check_colors(&self, index: usize) -> StripResult<()> {
        self.color.check(&format!("textElements[{index}].color"))?;
        if let Some(shadow) = &self.shadow {
            shadow
                .color
                .check(&format!("textElements[{index}].shadow.color"))?;
        }
        Ok(())
    }

    /// Font size with the zero/invalid fallback applied.
    pub fn effective_font_size(&self) -> f32 {
        if self.font_size.is_finite() && self.font_size > 0.0 {
            self.font_size
        } else {
            DEFAULT_FONT_SIZE
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/text.rs"]
mod tests;
