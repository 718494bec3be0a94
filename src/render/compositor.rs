use std::sync::Arc;

use rayon::prelude::*;

use crate::{
    assets::decode::{CellTarget, DecodedPhoto, PhotoDecoder},
    foundation::core::{Affine, Rect},
    foundation::error::{StripError, StripResult},
    layout::resolver::{CellSlot, Geometry},
    model::style::StripStyle,
    render::surface::{Surface, affine_to_cpu, rect_to_cpu},
};

/// A photo cell that was left empty because its photo could not be decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeWarning {
    /// Row of the affected cell.
    pub row: usize,
    /// Column of the affected cell.
    pub col: usize,
    /// Index into the request's photo list.
    pub photo_index: usize,
    /// Decoder error message.
    pub message: String,
}

impl std::fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "photo {} for cell ({}, {}) could not be decoded: {}",
            self.photo_index, self.row, self.col, self.message
        )
    }
}

/// Outcome of the photo compositing stage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompositeReport {
    /// Photos that were drawn.
    pub drawn: usize,
    /// Photo cells skipped because their index had no photo.
    pub missing: usize,
    /// Photo cells whose decode failed.
    pub warnings: Vec<DecodeWarning>,
}

struct PlacedPhoto<'a> {
    slot: &'a CellSlot,
    photo: DecodedPhoto,
}

/// Paint the background, cell borders and photos onto `surface`.
///
/// All decodes are issued at once on the current rayon pool; results are collected in layout
/// order so the drawn output does not depend on completion order. A cell is framed only when
/// its photo decoded.
#[tracing::instrument(level = "debug", skip_all, fields(cells = geometry.slots.len()))]
pub fn composite_photos(
    surface: &mut Surface,
    geometry: &Geometry,
    photos: &[String],
    style: &StripStyle,
    decoder: &dyn PhotoDecoder,
) -> StripResult<CompositeReport> {
    if surface.canvas() != geometry.canvas {
        return Err(StripError::resource(format!(
            "surface {:?} does not match layout canvas {:?}",
            surface.canvas(),
            geometry.canvas
        )));
    }

    surface.fill(style.background_color.rgba());

    let mut report = CompositeReport::default();
    let mut jobs = Vec::<(&CellSlot, usize, &str)>::new();
    for slot in &geometry.slots {
        let Some(index) = slot.cell.photo_index() else {
            continue;
        };
        match photos.get(index) {
            Some(reference) => jobs.push((slot, index, reference.as_str())),
            None => {
                tracing::debug!(
                    row = slot.row,
                    col = slot.col,
                    index,
                    "no photo for cell index"
                );
                report.missing += 1;
            }
        }
    }

    let target = CellTarget {
        width: geometry.photo_width,
        height: geometry.photo_height,
        fit: style.photo_fit,
    };
    let decoded: Vec<StripResult<DecodedPhoto>> = jobs
        .par_iter()
        .map(|(_, _, reference)| decoder.decode(reference, target))
        .collect();

    let mut placed = Vec::<PlacedPhoto<'_>>::with_capacity(decoded.len());
    for ((slot, index, _), result) in jobs.iter().zip(decoded) {
        match result {
            Ok(photo) => placed.push(PlacedPhoto { slot, photo }),
            Err(e) => {
                let warning = DecodeWarning {
                    row: slot.row,
                    col: slot.col,
                    photo_index: *index,
                    message: e.public_message(),
                };
                tracing::warn!(%warning, "skipping undecodable photo");
                report.warnings.push(warning);
            }
        }
    }

    if placed.is_empty() {
        return Ok(report);
    }

    let border_color = style.photo_border_color.rgba();
    let border_width = f64::from(style.photo_border_width);
    let images = placed
        .iter()
        .map(|p| {
            photo_paint(&p.photo).map(|image| {
                let (w, h) = (f64::from(p.photo.width), f64::from(p.photo.height));
                (p.slot, image, w, h)
            })
        })
        .collect::<StripResult<Vec<_>>>()?;

    surface.paint_layer(|ctx| {
        if border_width > 0.0 && !border_color.is_transparent() {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(border_color.to_cpu_color());
            for p in &placed {
                let frame = geometry.cell_rect(p.slot).inflate(border_width, border_width);
                ctx.fill_rect(&rect_to_cpu(frame));
            }
        }

        for (slot, image, w, h) in &images {
            ctx.set_transform(affine_to_cpu(Affine::translate((
                f64::from(slot.x),
                f64::from(slot.y),
            ))));
            ctx.set_paint(image.clone());
            ctx.fill_rect(&rect_to_cpu(Rect::new(0.0, 0.0, *w, *h)));
        }
        Ok(())
    })?;

    report.drawn = placed.len();
    Ok(report)
}

fn photo_paint(photo: &DecodedPhoto) -> StripResult<vello_cpu::Image> {
    let pixmap = image_premul_bytes_to_pixmap(&photo.rgba8_premul, photo.width, photo.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> StripResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StripError::resource("photo width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StripError::resource("photo height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(StripError::resource("decoded photo byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect::<Vec<_>>();

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
