use std::collections::HashMap;

use crate::{
    assets::fonts::{FontBook, ResolvedFont, ShapedText, TextBrushRgba8, TextLayoutEngine},
    foundation::core::{Affine, Point, Rgba8},
    foundation::error::StripResult,
    layout::resolver::Geometry,
    model::text::{DEFAULT_FONT_FAMILY, TextAlign, TextElement, TextPosition, TextShadow},
    render::surface::{Surface, affine_to_cpu},
};

/// Size of text drawn inside text-region cells.
pub const CELL_TEXT_SIZE: f32 = 32.0;
/// Colour of text drawn inside text-region cells (`#333`).
pub const CELL_TEXT_COLOR: Rgba8 = Rgba8::new(0x33, 0x33, 0x33, 0xff);

/// A text element that was skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextWarning {
    /// Index into the request's text elements; `None` for cell text.
    pub element: Option<usize>,
    /// What went wrong.
    pub message: String,
}

impl std::fmt::Display for TextWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.element {
            Some(i) => write!(f, "text element {i} skipped: {}", self.message),
            None => write!(f, "cell text skipped: {}", self.message),
        }
    }
}

/// Anchor point of `element` on the canvas: `x` is the alignment reference, `y` the baseline.
pub fn place_text(element: &TextElement, geometry: &Geometry) -> Point {
    let width = f64::from(geometry.canvas.width);
    let height = f64::from(geometry.canvas.height);
    let padding = f64::from(geometry.padding);
    let top = f64::from(geometry.top_margin);
    let bottom = f64::from(geometry.bottom_margin);

    // Top presets treat a zero vertical offset as "one line down from the margin".
    let top_baseline = || {
        let drop = if element.offset_y != 0.0 {
            element.offset_y
        } else {
            f64::from(element.effective_font_size())
        };
        top + drop
    };

    match element.position {
        TextPosition::TopLeft => Point::new(padding + element.offset_x, top_baseline()),
        TextPosition::TopRight => Point::new(width - padding - element.offset_x, top_baseline()),
        TextPosition::Bottom => Point::new(
            width / 2.0 + element.offset_x,
            height - bottom / 2.0 + element.offset_y,
        ),
        TextPosition::Center => Point::new(
            width / 2.0 + element.offset_x,
            height / 2.0 + element.offset_y,
        ),
        TextPosition::Custom => Point::new(
            element.x.unwrap_or(width / 2.0),
            element.y.unwrap_or(height / 2.0),
        ),
    }
}

/// Horizontal distance from the anchor to the start of a run of `width`.
pub fn align_shift(align: TextAlign, width: f64) -> f64 {
    match align {
        TextAlign::Left => 0.0,
        TextAlign::Center => width / 2.0,
        TextAlign::Right => width,
    }
}

/// Draw cell text and every text element onto `surface`, in that order.
///
/// Elements whose font cannot be resolved or shaped are skipped with a warning. Shadows apply
/// to their own element only.
#[tracing::instrument(level = "debug", skip_all, fields(elements = elements.len()))]
pub fn render_text(
    surface: &mut Surface,
    geometry: &Geometry,
    elements: &[TextElement],
    cell_text: Option<&str>,
    fonts: &FontBook,
) -> StripResult<Vec<TextWarning>> {
    let mut warnings = Vec::new();
    let mut renderer = TextRenderer::new(fonts);

    if let Some(text) = cell_text
        && geometry.slots.iter().any(|s| s.cell.is_text())
    {
        if let Err(message) = renderer.draw_cell_text(surface, geometry, text) {
            let warning = TextWarning {
                element: None,
                message,
            };
            tracing::warn!(%warning, "skipping cell text");
            warnings.push(warning);
        }
    }

    for (i, element) in elements.iter().enumerate() {
        if element.content.is_empty() {
            continue;
        }
        if let Err(message) = renderer.draw_element(surface, geometry, element) {
            let warning = TextWarning {
                element: Some(i),
                message,
            };
            tracing::warn!(%warning, "skipping text element");
            warnings.push(warning);
        }
    }

    Ok(warnings)
}

struct TextRenderer<'a> {
    fonts: &'a FontBook,
    resolved: HashMap<String, Option<ResolvedFont>>,
    layout: TextLayoutEngine,
}

impl<'a> TextRenderer<'a> {
    fn new(fonts: &'a FontBook) -> Self {
        Self {
            fonts,
            resolved: HashMap::new(),
            layout: TextLayoutEngine::new(),
        }
    }

    fn font(&mut self, family: &str) -> Result<ResolvedFont, String> {
        let fonts = self.fonts;
        self.resolved
            .entry(family.to_owned())
            .or_insert_with(|| fonts.resolve(family))
            .clone()
            .ok_or_else(|| format!("no font available for family {family:?}"))
    }

    fn shape(
        &mut self,
        text: &str,
        family: &str,
        size: f32,
        color: Rgba8,
    ) -> Result<ShapedText, String> {
        let font = self.font(family)?;
        let brush = TextBrushRgba8 {
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        };
        self.layout
            .shape_line(text, &font, size, brush)
            .map_err(|e| e.public_message())
    }

    fn draw_cell_text(
        &mut self,
        surface: &mut Surface,
        geometry: &Geometry,
        text: &str,
    ) -> Result<(), String> {
        let shaped = self.shape(text, DEFAULT_FONT_FAMILY, CELL_TEXT_SIZE, CELL_TEXT_COLOR)?;
        let shift = align_shift(TextAlign::Center, f64::from(shaped.width));
        let baseline = f64::from(shaped.baseline);

        surface
            .paint_layer(|ctx| {
                for slot in geometry.slots.iter().filter(|s| s.cell.is_text()) {
                    let center = geometry.cell_rect(slot).center();
                    let origin = Point::new(center.x - shift, center.y - baseline);
                    fill_glyphs(ctx, &shaped, origin, CELL_TEXT_COLOR);
                }
                Ok(())
            })
            .map_err(|e| e.public_message())
    }

    fn draw_element(
        &mut self,
        surface: &mut Surface,
        geometry: &Geometry,
        element: &TextElement,
    ) -> Result<(), String> {
        let color = element.color.rgba();
        let shaped = self.shape(
            &element.content,
            &element.font_family,
            element.effective_font_size(),
            color,
        )?;

        let anchor = place_text(element, geometry);
        let origin = Point::new(
            anchor.x - align_shift(element.align, f64::from(shaped.width)),
            anchor.y - f64::from(shaped.baseline),
        );

        if let Some(shadow) = &element.shadow {
            draw_shadow(surface, &shaped, origin, shadow).map_err(|e| e.public_message())?;
        }
        if color.is_transparent() {
            return Ok(());
        }
        surface
            .paint_layer(|ctx| {
                fill_glyphs(ctx, &shaped, origin, color);
                Ok(())
            })
            .map_err(|e| e.public_message())
    }
}

fn draw_shadow(
    surface: &mut Surface,
    shaped: &ShapedText,
    origin: Point,
    shadow: &TextShadow,
) -> StripResult<()> {
    let color = shadow.color.rgba();
    if color.is_transparent() {
        return Ok(());
    }
    let (dx, dy) = shadow.effective_offset();
    let at = Point::new(origin.x + dx, origin.y + dy);
    let layer = surface.render_layer(|ctx| {
        fill_glyphs(ctx, shaped, at, color);
        Ok(())
    })?;
    surface.paint_blurred(&layer, shadow_sigma(shadow.effective_blur()))
}

/// Gaussian standard deviation for a shadow blur amount.
pub fn shadow_sigma(blur: f32) -> f32 {
    if blur.is_finite() && blur > 0.0 {
        blur / 2.0
    } else {
        0.0
    }
}

fn fill_glyphs(
    ctx: &mut vello_cpu::RenderContext,
    shaped: &ShapedText,
    origin: Point,
    color: Rgba8,
) {
    ctx.set_transform(affine_to_cpu(Affine::translate((origin.x, origin.y))));
    ctx.set_paint(color.to_cpu_color());

    for line in shaped.layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(&shaped.font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
