use std::io::Cursor;

use anyhow::Context;
use base64::Engine as _;
use image::ImageEncoder as _;

use crate::{
    foundation::core::Canvas,
    foundation::error::{StripError, StripResult},
    model::style::{DEFAULT_QUALITY, OutputFormat},
    render::surface::Surface,
};

/// Compressed strip image.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedStrip {
    /// Encoded file bytes.
    pub bytes: Vec<u8>,
    /// Container format of `bytes`.
    pub format: OutputFormat,
    /// Pixel size of the image.
    pub canvas: Canvas,
}

impl std::fmt::Debug for EncodedStrip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedStrip")
            .field("format", &self.format)
            .field("canvas", &self.canvas)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

impl EncodedStrip {
    /// MIME type of the encoded bytes.
    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }

    /// `data:<mime>;base64,<payload>` form of the image.
    pub fn to_data_url(&self) -> String {
        let payload = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{payload}", self.mime())
    }
}

/// Map a `0.0..=1.0` quality onto the JPEG `1..=100` scale.
///
/// Zero and non-finite values mean "unset" and give the default of 90.
pub fn jpeg_quality(quality: f64) -> u8 {
    let q = if quality.is_finite() && quality != 0.0 {
        quality
    } else {
        DEFAULT_QUALITY
    };
    (q.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Compress the finished surface.
///
/// JPEG has no alpha channel: the premultiplied colour is written as-is, which is the surface
/// composited over black. PNG keeps alpha and is written un-premultiplied.
#[tracing::instrument(level = "debug", skip(surface), fields(canvas = ?surface.canvas()))]
pub fn encode(surface: &Surface, format: OutputFormat, quality: f64) -> StripResult<EncodedStrip> {
    let canvas = surface.canvas();
    let bytes = match format {
        OutputFormat::Jpeg => encode_jpeg(surface.data(), canvas, jpeg_quality(quality))?,
        OutputFormat::Png => encode_png(surface.data(), canvas)?,
    };
    if bytes.is_empty() {
        return Err(StripError::encoding("encoder produced no output"));
    }
    tracing::debug!(bytes = bytes.len(), ?format, "strip encoded");
    Ok(EncodedStrip {
        bytes,
        format,
        canvas,
    })
}

fn encode_jpeg(rgba8_premul: &[u8], canvas: Canvas, quality: u8) -> StripResult<Vec<u8>> {
    let rgb = rgba8_premul
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect::<Vec<u8>>();

    let mut out = Cursor::new(Vec::new());
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality)
        .write_image(
            &rgb,
            canvas.width,
            canvas.height,
            image::ExtendedColorType::Rgb8,
        )
        .context("encode strip as jpeg")
        .map_err(|e| StripError::encoding(format!("{e:#}")))?;
    Ok(out.into_inner())
}

fn encode_png(rgba8_premul: &[u8], canvas: Canvas) -> StripResult<Vec<u8>> {
    let mut rgba = rgba8_premul.to_vec();
    unpremultiply_rgba8_in_place(&mut rgba);

    let mut out = Cursor::new(Vec::new());
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(
            &rgba,
            canvas.width,
            canvas.height,
            image::ExtendedColorType::Rgba8,
        )
        .context("encode strip as png")
        .map_err(|e| StripError::encoding(format!("{e:#}")))?;
    Ok(out.into_inner())
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        if a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/image_out.rs"]
mod tests;
