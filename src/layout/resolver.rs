use crate::{
    foundation::core::{Canvas, Rect},
    foundation::error::{StripError, StripResult},
    model::layout::{Cell, Layout},
    model::style::StripStyle,
};

/// Photo cells are always 16:9 landscape; the height is derived from the width.
const ASPECT_NUM: u64 = 9;
const ASPECT_DEN: u64 = 16;

/// Resolved pixel position of one defined layout cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellSlot {
    /// Row index in the layout.
    pub row: usize,
    /// Column index within the row.
    pub col: usize,
    /// Left edge of the cell.
    pub x: u32,
    /// Top edge of the cell.
    pub y: u32,
    /// Cell content, cloned from the layout.
    pub cell: Cell,
}

/// Canvas size and per-cell origins for one layout + sizing combination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Geometry {
    /// Full canvas size.
    pub canvas: Canvas,
    /// Width of every cell.
    pub photo_width: u32,
    /// Height of every cell, `round(photo_width * 9 / 16)`.
    pub photo_height: u32,
    /// Gap between cells and around the grid.
    pub padding: u32,
    /// Band above the grid.
    pub top_margin: u32,
    /// Band below the grid.
    pub bottom_margin: u32,
    /// Number of layout rows.
    pub rows: usize,
    /// Longest row length.
    pub max_cols: usize,
    /// Defined cells in row-major order.
    pub slots: Vec<CellSlot>,
}

impl Geometry {
    /// Slot at `(row, col)`, if the layout defines that cell.
    pub fn slot(&self, row: usize, col: usize) -> Option<&CellSlot> {
        self.slots.iter().find(|s| s.row == row && s.col == col)
    }

    /// Rectangle covered by a cell's photo.
    pub fn cell_rect(&self, slot: &CellSlot) -> Rect {
        let x0 = f64::from(slot.x);
        let y0 = f64::from(slot.y);
        Rect::new(
            x0,
            y0,
            x0 + f64::from(self.photo_width),
            y0 + f64::from(self.photo_height),
        )
    }
}

/// Photo cell height for a given width.
pub fn photo_height_for(photo_width: u32) -> u32 {
    // round-half-up of width * 9/16, in integers
    ((u64::from(photo_width) * ASPECT_NUM + ASPECT_DEN / 2) / ASPECT_DEN) as u32
}

/// Resolve canvas geometry using the sizing fields of `style`.
pub fn resolve_for_style(layout: &Layout, style: &StripStyle) -> StripResult<Geometry> {
    resolve(
        layout,
        style.photo_width,
        style.padding,
        style.top_margin,
        style.bottom_margin,
    )
}

/// Validate `layout` and compute the canvas size and every cell origin.
///
/// Pure: no IO, no allocation beyond the returned slot list.
#[tracing::instrument(level = "debug", skip(layout))]
pub fn resolve(
    layout: &Layout,
    photo_width: u32,
    padding: u32,
    top_margin: u32,
    bottom_margin: u32,
) -> StripResult<Geometry> {
    if layout.row_count() == 0 {
        return Err(StripError::validation("empty layout"));
    }
    if layout.cell_count() == 0 {
        return Err(StripError::validation("layout has no cells"));
    }
    if photo_width == 0 {
        return Err(StripError::validation("photoWidth must be > 0"));
    }

    let photo_height = photo_height_for(photo_width);
    let rows = layout.row_count();
    let max_cols = layout.max_cols();

    let width = span(photo_width, padding, max_cols, 0, 0)?;
    let height = span(photo_height, padding, rows, top_margin, bottom_margin)?;

    let step_x = u64::from(photo_width) + u64::from(padding);
    let step_y = u64::from(photo_height) + u64::from(padding);
    let slots = layout
        .cells()
        .map(|(row, col, cell)| {
            // Both origins are bounded by the canvas size checked above.
            let x = u64::from(padding) + col as u64 * step_x;
            let y = u64::from(top_margin) + u64::from(padding) + row as u64 * step_y;
            CellSlot {
                row,
                col,
                x: x as u32,
                y: y as u32,
                cell: cell.clone(),
            }
        })
        .collect();

    Ok(Geometry {
        canvas: Canvas { width, height },
        photo_width,
        photo_height,
        padding,
        top_margin,
        bottom_margin,
        rows,
        max_cols,
        slots,
    })
}

/// `cell*count + padding*(count+1) + lead + trail`, checked against `u32`.
fn span(cell: u32, padding: u32, count: usize, lead: u32, trail: u32) -> StripResult<u32> {
    let count = count as u128;
    let total = u128::from(cell) * count
        + u128::from(padding) * (count + 1)
        + u128::from(lead)
        + u128::from(trail);
    u32::try_from(total).map_err(|_| {
        StripError::resource(format!("canvas side of {total} px exceeds the addressable range"))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/layout/resolver.rs"]
mod tests;
