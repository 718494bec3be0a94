use serde::{Deserialize, Serialize};

use crate::foundation::core::Canvas;
use crate::foundation::error::{StripError, StripResult};
use crate::model::layout::Layout;
use crate::model::style::StripStyle;
use crate::model::text::TextElement;

/// Message reported when a request lacks `photos` or `layout`.
pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields: photos and layout";

/// One strip-generation request, as received over the request/response boundary.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StripRequest {
    /// Encoded photo references, addressed by layout index.
    #[serde(default)]
    pub photos: Option<Vec<String>>,
    /// Grid of cells.
    #[serde(default)]
    pub layout: Option<Layout>,
    /// Captions painted over the finished grid.
    #[serde(default)]
    pub text_elements: Option<Vec<TextElement>>,
    /// Text drawn centred in every text-region cell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_text: Option<String>,
    /// Sizing and style options.
    #[serde(default)]
    pub dimensions: Option<StripStyle>,
}

/// Borrowed, precondition-checked view of a [`StripRequest`].
#[derive(Clone, Copy, Debug)]
pub struct CheckedRequest<'a> {
    /// Photo references.
    pub photos: &'a [String],
    /// Non-empty layout.
    pub layout: &'a Layout,
    /// Captions (possibly empty).
    pub text_elements: &'a [TextElement],
    /// Text for text-region cells, if any.
    pub cell_text: Option<&'a str>,
    /// Style in effect.
    pub style: &'a StripStyle,
}

impl StripRequest {
    /// Parse a request from JSON text.
    pub fn from_json(text: &str) -> StripResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| StripError::serde(format!("invalid strip request: {e}")))
    }

    /// Build a request from explicit parts.
    pub fn new(photos: Vec<String>, layout: Layout) -> Self {
        Self {
            photos: Some(photos),
            layout: Some(layout),
            ..Self::default()
        }
    }

    /// Check the request preconditions before any processing starts.
    ///
    /// `style_default` backs a missing `dimensions` object.
    pub fn check<'a>(&'a self, style_default: &'a StripStyle) -> StripResult<CheckedRequest<'a>> {
        let (Some(photos), Some(layout)) = (self.photos.as_deref(), self.layout.as_ref()) else {
            return Err(StripError::validation(MISSING_FIELDS_MESSAGE));
        };
        if photos.is_empty() {
            return Err(StripError::validation("no photos supplied"));
        }

        let style = self.dimensions.as_ref().unwrap_or(style_default);
        style.check_colors()?;
        let text_elements = self.text_elements.as_deref().unwrap_or(&[]);
        for (i, element) in text_elements.iter().enumerate() {
            element.check_colors(i)?;
        }

        Ok(CheckedRequest {
            photos,
            layout,
            text_elements,
            cell_text: self.cell_text.as_deref().filter(|t| !t.is_empty()),
            style,
        })
    }
}

/// Wire response: `{ success: true, ... }` or `{ success: false, ... }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StripResponse {
    /// The strip was produced.
    Success(StripSuccess),
    /// The run failed; no partial output.
    Failure(StripFailure),
}

/// Body of a successful response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StripSuccess {
    /// Always `true`.
    pub success: bool,
    /// `data:` URL holding the encoded strip.
    pub strip_url: String,
    /// Pixel size of the strip.
    pub dimensions: Canvas,
    /// Non-fatal diagnostics (photo decode failures, missing fonts).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Body of a failure response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StripFailure {
    /// Always `false`.
    pub success: bool,
    /// Human-readable reason.
    pub error: String,
    /// Diagnostic chain; only populated in debug mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl StripResponse {
    /// Build a success response.
    pub fn success(strip_url: String, dimensions: Canvas, warnings: Vec<String>) -> Self {
        Self::Success(StripSuccess {
            success: true,
            strip_url,
            dimensions,
            warnings,
        })
    }

    /// Build a failure response.
    pub fn failure(error: impl Into<String>, details: Option<String>) -> Self {
        Self::Failure(StripFailure {
            success: false,
            error: error.into(),
            details,
        })
    }

    /// `true` for success responses.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> StripResult<String> {
        serde_json::to_string(self).map_err(|e| StripError::serde(e.to_string()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/request.rs"]
mod tests;
