//! Photostrip composes captured photos into a single "photo strip" image.
//!
//! A run takes a grid layout of photo indices and text slots, a list of encoded photos, optional
//! captions and a style record, and produces one encoded raster plus its pixel size:
//!
//! - [`resolve`] computes the canvas size and every cell origin
//! - [`composite_photos`] paints background, borders and photos (decoded concurrently)
//! - [`render_text`] draws cell text and captions on top
//! - [`encode`] compresses the surface as JPEG or PNG
//!
//! [`StripEngine`] wires the stages together and maps outcomes onto the JSON wire contract.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod encode;
mod engine;
mod foundation;
mod layout;
mod model;
mod render;

pub use crate::foundation::color::CssColor;
pub use crate::foundation::core::{Affine, Canvas, Point, Rect, Rgba8, Rgba8Premul, Vec2};
pub use crate::foundation::error::{StripError, StripResult};

pub use crate::model::layout::{Cell, GRID_MAX_SIDE, Layout};
pub use crate::model::request::{
    CheckedRequest, MISSING_FIELDS_MESSAGE, StripFailure, StripRequest, StripResponse,
    StripSuccess,
};
pub use crate::model::style::{DEFAULT_QUALITY, OutputFormat, PhotoFit, StripStyle};
pub use crate::model::text::{
    DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_SHADOW_BLUR, DEFAULT_SHADOW_OFFSET, TextAlign,
    TextElement, TextPosition, TextShadow,
};

pub use crate::layout::resolver::{CellSlot, Geometry, photo_height_for, resolve, resolve_for_style};

pub use crate::assets::decode::{
    CellTarget, DecodedPhoto, DefaultPhotoDecoder, PhotoDecoder, decode_photo, photo_bytes,
};
pub use crate::assets::fonts::{
    FontBook, ResolvedFont, ShapedText, TextBrushRgba8, TextLayoutEngine,
};

pub use crate::render::compositor::{CompositeReport, DecodeWarning, composite_photos};
pub use crate::render::surface::{DEFAULT_MAX_PIXELS, Surface};
pub use crate::render::text::{
    CELL_TEXT_COLOR, CELL_TEXT_SIZE, TextWarning, align_shift, place_text, render_text,
    shadow_sigma,
};

pub use crate::encode::image_out::{EncodedStrip, encode, jpeg_quality};

pub use crate::engine::config::EngineConfig;
pub use crate::engine::pipeline::{
    RenderedStrip, RunFailure, Stage, StripEngine, StripOutput, generate_strip,
};
