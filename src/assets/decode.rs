use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use base64::Engine as _;

use crate::{
    foundation::error::{StripError, StripResult},
    model::style::PhotoFit,
};

#[derive(Clone, Debug)]
/// Decoded photo in premultiplied RGBA8 form, already fitted to its cell.
pub struct DecodedPhoto {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Target cell a photo is decoded for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellTarget {
    /// Cell width in pixels.
    pub width: u32,
    /// Cell height in pixels.
    pub height: u32,
    /// Mapping from photo to cell.
    pub fit: PhotoFit,
}

/// Turns a photo reference into cell-sized pixels.
///
/// Implementations must be callable from several threads at once: the compositor issues every
/// decode of a run concurrently.
pub trait PhotoDecoder: Send + Sync {
    /// Decode `reference` and fit it to `target`.
    fn decode(&self, reference: &str, target: CellTarget) -> StripResult<DecodedPhoto>;
}

/// Decoder for `data:` URLs, bare base64 payloads and, when a root is configured, relative
/// file paths.
#[derive(Clone, Debug, Default)]
pub struct DefaultPhotoDecoder {
    photo_root: Option<PathBuf>,
}

impl DefaultPhotoDecoder {
    /// Decoder that only accepts inline (data URL / base64) photos.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder that also resolves relative paths against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            photo_root: Some(root.into()),
        }
    }
}

impl PhotoDecoder for DefaultPhotoDecoder {
    fn decode(&self, reference: &str, target: CellTarget) -> StripResult<DecodedPhoto> {
        let bytes = photo_bytes(reference, self.photo_root.as_deref())?;
        decode_photo(&bytes, target)
    }
}

/// Resolve a photo reference to its encoded bytes.
pub fn photo_bytes(reference: &str, root: Option<&Path>) -> StripResult<Vec<u8>> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(StripError::validation("photo reference is empty"));
    }

    if let Some(rest) = reference.strip_prefix("data:") {
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| StripError::validation("data URL has no ',' separator"))?;
        if header.ends_with(";base64") {
            return decode_base64(payload);
        }
        return Ok(percent_decode(payload));
    }

    if let Some(root) = root
        && let Ok(norm) = normalize_rel_path(reference)
    {
        let path = root.join(Path::new(&norm));
        if path.is_file() {
            return std::fs::read(&path)
                .with_context(|| format!("read photo bytes from '{}'", path.display()))
                .map_err(StripError::from);
        }
    }

    decode_base64(reference).map_err(|_| {
        StripError::validation("photo reference is not a data URL, base64 payload or known file")
    })
}

fn decode_base64(payload: &str) -> StripResult<Vec<u8>> {
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .context("decode base64 photo payload")
        .map_err(StripError::from)
}

/// Bytes of a URL-encoded data URL payload: each `%XX` becomes one byte, anything else is
/// copied as-is.
fn percent_decode(payload: &str) -> Vec<u8> {
    fn hex(b: u8) -> Option<u8> {
        match b {
            b'0'..=b'9' => Some(b - b'0'),
            b'a'..=b'f' => Some(b - b'a' + 10),
            b'A'..=b'F' => Some(b - b'A' + 10),
            _ => None,
        }
    }

    let bytes = payload.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && let Some(&[hi, lo]) = bytes.get(i + 1..i + 3)
            && let (Some(hi), Some(lo)) = (hex(hi), hex(lo))
        {
            out.push(hi << 4 | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    out
}

/// Decode encoded image bytes, fit them to `target` and convert to premultiplied RGBA8.
pub fn decode_photo(bytes: &[u8], target: CellTarget) -> StripResult<DecodedPhoto> {
    if target.width == 0 || target.height == 0 {
        return Err(StripError::validation("photo cell must be non-empty"));
    }

    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let filter = image::imageops::FilterType::Triangle;
    let fitted = match target.fit {
        PhotoFit::Stretch => dyn_img.resize_exact(target.width, target.height, filter),
        PhotoFit::Cover => dyn_img.resize_to_fill(target.width, target.height, filter),
    };
    let rgba = fitted.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(DecodedPhoto {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Normalize and validate root-relative photo paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and rejects absolute paths or
/// parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> StripResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(StripError::validation("photo paths must be relative"));
    }
    if s.is_empty() {
        return Err(StripError::validation("photo path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(StripError::validation("photo paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(StripError::validation(
            "photo path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
