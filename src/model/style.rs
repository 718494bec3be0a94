use serde::{Deserialize, Serialize};

use crate::foundation::color::CssColor;
use crate::foundation::core::Rgba8;
use crate::foundation::error::StripResult;
use crate::model::wire::pixels;

/// Encoder quality used when a request gives none, or gives zero.
pub const DEFAULT_QUALITY: f64 = 0.9;

/// Output container for the encoded strip.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossy JPEG; alpha is dropped.
    #[default]
    #[serde(alias = "jpg")]
    Jpeg,
    /// Lossless PNG with alpha.
    Png,
}

impl OutputFormat {
    /// MIME type used in data URLs.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

/// How a decoded photo is mapped onto its `photoWidth × photoHeight` cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoFit {
    /// Scale both axes independently to fill the cell exactly.
    #[default]
    Stretch,
    /// Centre-crop to the cell's aspect ratio, then scale.
    Cover,
}

/// Sizing and styling options for one run (`dimensions` in the request).
///
/// Every field has a default, so `{}` is a valid value, and `null` fields read as absent.
/// Sizes accept any non-negative JSON number and are rounded to whole pixels. The record is
/// never mutated by the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StripStyleWire")]
pub struct StripStyle {
    /// Width of every photo cell in pixels. Must be `> 0`.
    pub photo_width: u32,
    /// Gap between cells and around the grid.
    pub padding: u32,
    /// Blank band above the grid.
    pub top_margin: u32,
    /// Blank band below the grid.
    pub bottom_margin: u32,
    /// Canvas fill painted before anything else.
    pub background_color: CssColor,
    /// Frame colour drawn behind each photo.
    pub photo_border_color: CssColor,
    /// Frame thickness; `0` disables borders.
    pub photo_border_width: u32,
    /// Encoder quality in `0.0..=1.0`.
    pub quality: f64,
    /// Output container.
    pub format: OutputFormat,
    /// Photo-to-cell mapping.
    pub photo_fit: PhotoFit,
}

impl Default for StripStyle {
    fn default() -> Self {
        Self {
            photo_width: 600,
            padding: 30,
            top_margin: 120,
            bottom_margin: 240,
            background_color: CssColor::known("white", Rgba8::WHITE),
            photo_border_color: CssColor::known("#ddd", Rgba8::new(0xdd, 0xdd, 0xdd, 0xff)),
            photo_border_width: 2,
            quality: DEFAULT_QUALITY,
            format: OutputFormat::Jpeg,
            photo_fit: PhotoFit::Stretch,
        }
    }
}

/// JSON shape of [`StripStyle`] as clients send it.
#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StripStyleWire {
    photo_width: Option<f64>,
    padding: Option<f64>,
    top_margin: Option<f64>,
    bottom_margin: Option<f64>,
    background_color: Option<CssColor>,
    photo_border_color: Option<CssColor>,
    photo_border_width: Option<f64>,
    quality: Option<f64>,
    format: Option<OutputFormat>,
    photo_fit: Option<PhotoFit>,
}

impl TryFrom<StripStyleWire> for StripStyle {
    type Error = String;

    fn try_from(w: StripStyleWire) -> Result<Self, Self::Error> {
        let d = Self::default();
        Ok(Self {
            photo_width: pixels("photoWidth", w.photo_width, d.photo_width)?,
            padding: pixels("padding", w.padding, d.padding)?,
            top_margin: pixels("topMargin", w.top_margin, d.top_margin)?,
            bottom_margin: pixels("bottomMargin", w.bottom_margin, d.bottom_margin)?,
            background_color: w.background_color.unwrap_or(d.background_color),
            photo_border_color: w.photo_border_color.unwrap_or(d.photo_border_color),
            photo_border_width: pixels(
                "photoBorderWidth",
                w.photo_border_width,
                d.photo_border_width,
            )?,
            quality: w.quality.unwrap_or(d.quality),
            format: w.format.unwrap_or(d.format),
            photo_fit: w.photo_fit.unwrap_or(d.photo_fit),
        })
    }
}

impl StripStyle {
    /// Fail with a validation error naming the first colour field that does not parse.
    pub fn check_colors(&self) -> StripResult<()> {
        self.background_color.check("dimensions.backgroundColor")?;
        self.photo_border_color.check("dimensions.photoBorderColor")?;
        Ok(())
    }

    /// Quality clamped into `0.0..=1.0`. Zero and non-finite values fall back to
    /// [`DEFAULT_QUALITY`].
    pub fn effective_quality(&self) -> f64 {
        if self.quality.is_finite() && self.quality != 0.0 {
            self.quality.clamp(0.0, 1.0)
        } else {
            DEFAULT_QUALITY
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/style.rs"]
mod tests;
