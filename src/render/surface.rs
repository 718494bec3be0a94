use crate::{
    foundation::core::{Affine, Canvas, Rect, Rgba8, Rgba8Premul},
    foundation::error::{StripError, StripResult},
    render::blend::{blur_reach, box_blur_rgba8_premul, box_widths, ink_bounds, over_in_place},
};

/// Upper bound on canvas pixels when no explicit limit is configured (64 Mpx, 256 MiB).
pub const DEFAULT_MAX_PIXELS: usize = 64 * 1024 * 1024;

/// Premultiplied RGBA8 drawing surface owned by a single run.
///
/// Every drawing stage renders into a fresh transparent layer and is composited source-over
/// onto this buffer, so stages never observe each other's rasterizer state.
pub struct Surface {
    width: u16,
    height: u16,
    data: Vec<u8>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl Surface {
    /// Allocate a transparent surface covering `canvas`.
    pub fn new(canvas: Canvas, max_pixels: usize) -> StripResult<Self> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(StripError::resource(format!(
                "canvas {}x{} has no area",
                canvas.width, canvas.height
            )));
        }
        let width: u16 = canvas.width.try_into().map_err(|_| {
            StripError::resource(format!("canvas width {} exceeds 65535", canvas.width))
        })?;
        let height: u16 = canvas.height.try_into().map_err(|_| {
            StripError::resource(format!("canvas height {} exceeds 65535", canvas.height))
        })?;

        let pixels = canvas
            .pixel_count()
            .ok_or_else(|| StripError::resource("canvas pixel count overflow"))?;
        if pixels > max_pixels {
            return Err(StripError::resource(format!(
                "canvas {}x{} exceeds the {max_pixels} pixel limit",
                canvas.width, canvas.height
            )));
        }
        let len = pixels
            .checked_mul(4)
            .ok_or_else(|| StripError::resource("canvas byte size overflow"))?;

        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|e| {
            StripError::resource(format!(
                "failed to allocate {}x{} surface: {e}",
                canvas.width, canvas.height
            ))
        })?;
        data.resize(len, 0);

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Size of the surface.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: u32::from(self.width),
            height: u32::from(self.height),
        }
    }

    /// Raw premultiplied RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Pixel at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8Premul> {
        if x >= u32::from(self.width) || y >= u32::from(self.height) {
            return None;
        }
        let idx = (y as usize * usize::from(self.width) + x as usize) * 4;
        let px = self.data.get(idx..idx + 4)?;
        Some(Rgba8Premul {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        })
    }

    /// Overwrite every pixel with `color`.
    pub fn fill(&mut self, color: Rgba8) {
        let px = color.premultiplied().to_array();
        for dst in self.data.chunks_exact_mut(4) {
            dst.copy_from_slice(&px);
        }
    }

    /// Render `draw` into a transparent layer and return the layer bytes.
    pub(crate) fn render_layer<F>(&self, draw: F) -> StripResult<Vec<u8>>
    where
        F: FnOnce(&mut vello_cpu::RenderContext) -> StripResult<()>,
    {
        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        draw(&mut ctx)?;
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        ctx.render_to_pixmap(&mut pixmap);
        Ok(pixmap.data_as_u8_slice().to_vec())
    }

    /// Render `draw` into a transparent layer and composite it over the surface.
    pub(crate) fn paint_layer<F>(&mut self, draw: F) -> StripResult<()>
    where
        F: FnOnce(&mut vello_cpu::RenderContext) -> StripResult<()>,
    {
        let layer = self.render_layer(draw)?;
        self.composite(&layer)
    }

    /// Blur `layer` with an approximate Gaussian of standard deviation `sigma`, then composite it.
    ///
    /// Only the inked part of the layer, grown by the blur reach, is filtered and composited.
    pub(crate) fn paint_blurred(&mut self, layer: &[u8], sigma: f32) -> StripResult<()> {
        let widths = box_widths(sigma);
        let reach = blur_reach(widths);
        if reach == 0 {
            return self.composite(layer);
        }
        if layer.len() != self.data.len() {
            return Err(StripError::resource(
                "blurred layer does not match the surface size",
            ));
        }

        let (width, height) = (u32::from(self.width), u32::from(self.height));
        let Some(ink) = ink_bounds(layer, width) else {
            return Ok(());
        };
        let region = ink.expand(reach, width, height);
        let mut patch = region.crop(layer, width);
        box_blur_rgba8_premul(&mut patch, region.width(), region.height(), widths)?;

        let row = region.width() as usize * 4;
        for (i, src_row) in patch.chunks_exact(row).enumerate() {
            let y = region.y0 as usize + i;
            let start = (y * usize::from(self.width) + region.x0 as usize) * 4;
            over_in_place(&mut self.data[start..start + row], src_row)?;
        }
        Ok(())
    }

    /// Source-over a full-size premultiplied layer onto the surface.
    pub(crate) fn composite(&mut self, layer: &[u8]) -> StripResult<()> {
        over_in_place(&mut self.data, layer)
    }
}

pub(crate) fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
