use crate::foundation::error::{StripError, StripResult};

/// Largest shadow sigma honoured; bigger values are clamped to it.
pub const MAX_SHADOW_SIGMA: f32 = 4096.0;

/// Source-over of premultiplied `src` onto premultiplied `dst`, in place.
pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> StripResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(StripError::resource(
            "source-over needs two rgba8 buffers of the same length",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        match s[3] {
            0 => {}
            255 => d.copy_from_slice(s),
            a => {
                let keep = 255 - u32::from(a);
                for (dc, &sc) in d.iter_mut().zip(s) {
                    let kept = (u32::from(*dc) * keep + 127) / 255;
                    *dc = (u32::from(sc) + kept).min(255) as u8;
                }
            }
        }
    }
    Ok(())
}

/// Half-open pixel rectangle `[x0, x1) × [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelBounds {
    /// Left column.
    pub x0: u32,
    /// Top row.
    pub y0: u32,
    /// One past the right column.
    pub x1: u32,
    /// One past the bottom row.
    pub y1: u32,
}

impl PixelBounds {
    /// Columns covered.
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    /// Rows covered.
    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    /// Grow by `margin` on every side, clipped to a `width × height` frame.
    pub fn expand(self, margin: u32, width: u32, height: u32) -> Self {
        Self {
            x0: self.x0.saturating_sub(margin),
            y0: self.y0.saturating_sub(margin),
            x1: self.x1.saturating_add(margin).min(width),
            y1: self.y1.saturating_add(margin).min(height),
        }
    }

    /// Copy the covered pixels out of a `frame_width`-wide RGBA8 frame.
    pub fn crop(&self, frame: &[u8], frame_width: u32) -> Vec<u8> {
        let row = self.width() as usize * 4;
        let mut out = Vec::with_capacity(row * self.height() as usize);
        for y in self.y0..self.y1 {
            let start = (y as usize * frame_width as usize + self.x0 as usize) * 4;
            out.extend_from_slice(&frame[start..start + row]);
        }
        out
    }
}

/// Bounds of every pixel with non-zero alpha in a `width`-wide RGBA8 layer.
pub fn ink_bounds(layer: &[u8], width: u32) -> Option<PixelBounds> {
    let row_len = width as usize * 4;
    if row_len == 0 {
        return None;
    }
    let mut bounds: Option<PixelBounds> = None;
    for (y, row) in layer.chunks_exact(row_len).enumerate() {
        let mut inked = row
            .chunks_exact(4)
            .enumerate()
            .filter(|(_, px)| px[3] != 0)
            .map(|(x, _)| x as u32);
        let Some(first) = inked.next() else {
            continue;
        };
        let last = inked.last().unwrap_or(first);
        let y = y as u32;
        bounds = Some(match bounds {
            None => PixelBounds {
                x0: first,
                y0: y,
                x1: last + 1,
                y1: y + 1,
            },
            Some(b) => PixelBounds {
                x0: b.x0.min(first),
                y0: b.y0,
                x1: b.x1.max(last + 1),
                y1: y + 1,
            },
        });
    }
    bounds
}

/// Widths of three box filters whose composition approximates a Gaussian of `sigma`.
///
/// `[1, 1, 1]` is the identity. Sigma is clamped to [`MAX_SHADOW_SIGMA`].
pub fn box_widths(sigma: f32) -> [u32; 3] {
    if !sigma.is_finite() || sigma <= 0.0 {
        return [1; 3];
    }
    let variance12 = 12.0 * f64::from(sigma.min(MAX_SHADOW_SIGMA)).powi(2);
    let ideal = (variance12 / 3.0 + 1.0).sqrt();
    let mut lower = ideal.floor() as u32;
    if lower.is_multiple_of(2) {
        lower -= 1;
    }
    let l = f64::from(lower);
    // How many of the three boxes take the narrower width.
    let narrow = ((variance12 - 3.0 * l * l - 12.0 * l - 9.0) / (-4.0 * l - 4.0)).round();
    std::array::from_fn(|i| if (i as f64) < narrow { lower } else { lower + 2 })
}

/// How far the three boxes spread a single pixel.
pub fn blur_reach(widths: [u32; 3]) -> u32 {
    widths.iter().map(|w| w / 2).sum()
}

/// Blur a premultiplied RGBA8 buffer in place, one box pass per width along each axis.
///
/// Pixels outside the buffer count as transparent.
pub fn box_blur_rgba8_premul(
    buf: &mut [u8],
    width: u32,
    height: u32,
    widths: [u32; 3],
) -> StripResult<()> {
    let (w, h) = (width as usize, height as usize);
    let expected = w
        .checked_mul(h)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| StripError::resource("blur buffer size overflow"))?;
    if buf.len() != expected {
        return Err(StripError::resource(format!(
            "blur buffer holds {} bytes, expected {expected} for {width}x{height}",
            buf.len()
        )));
    }
    if expected == 0 {
        return Ok(());
    }

    let mut column = vec![0u8; h * 4];
    let mut out = vec![0u8; w.max(h) * 4];
    for radius in widths.iter().map(|&bw| (bw / 2) as usize) {
        if radius == 0 {
            continue;
        }
        for row in buf.chunks_exact_mut(w * 4) {
            box_line(row, &mut out[..w * 4], radius);
            row.copy_from_slice(&out[..w * 4]);
        }
        for x in 0..w {
            for y in 0..h {
                let at = (y * w + x) * 4;
                column[y * 4..y * 4 + 4].copy_from_slice(&buf[at..at + 4]);
            }
            box_line(&column, &mut out[..h * 4], radius);
            for y in 0..h {
                let at = (y * w + x) * 4;
                buf[at..at + 4].copy_from_slice(&out[y * 4..y * 4 + 4]);
            }
        }
    }
    Ok(())
}

/// Running-sum box filter of width `2 * radius + 1` over one line of RGBA8 pixels.
fn box_line(src: &[u8], dst: &mut [u8], radius: usize) {
    let n = src.len() / 4;
    let span = (2 * radius + 1) as u32;
    let mut sum = [0u32; 4];

    for i in 0..=radius.min(n - 1) {
        sum.iter_mut()
            .zip(&src[i * 4..i * 4 + 4])
            .for_each(|(acc, &v)| *acc += u32::from(v));
    }
    for i in 0..n {
        for (c, acc) in sum.iter().enumerate() {
            dst[i * 4 + c] = ((acc + span / 2) / span) as u8;
        }
        if i >= radius {
            sum.iter_mut()
                .zip(&src[(i - radius) * 4..(i - radius) * 4 + 4])
                .for_each(|(acc, &v)| *acc -= u32::from(v));
        }
        if i + radius + 1 < n {
            sum.iter_mut()
                .zip(&src[(i + radius + 1) * 4..(i + radius + 2) * 4])
                .for_each(|(acc, &v)| *acc += u32::from(v));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/blend.rs"]
mod tests;
