use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest row/column count offered by [`Layout::grid`].
pub const GRID_MAX_SIDE: u32 = 6;

/// One grid position of a strip layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    /// Zero-based index into the request's photo list.
    Photo(usize),
    /// Text region marker (conventionally the tag `"text"`).
    Text(String),
    /// A cell that can never hold a photo: `null`, negative or fractional numbers.
    Blank,
}

impl Cell {
    /// Photo index for photo cells.
    pub fn photo_index(&self) -> Option<usize> {
        match self {
            Self::Photo(i) => Some(*i),
            _ => None,
        }
    }

    /// `true` for text-region cells.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

impl Serialize for Cell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Photo(i) => serializer.serialize_u64(*i as u64),
            Self::Text(tag) => serializer.serialize_str(tag),
            Self::Blank => serializer.serialize_unit(),
        }
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct CellVisitor;

        impl<'de> serde::de::Visitor<'de> for CellVisitor {
            type Value = Cell;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a photo index, a text tag or null")
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Cell, E> {
                Ok(usize::try_from(v).map(Cell::Photo).unwrap_or(Cell::Blank))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Cell, E> {
                Ok(usize::try_from(v).map(Cell::Photo).unwrap_or(Cell::Blank))
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Cell, E> {
                if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= usize::MAX as f64 {
                    Ok(Cell::Photo(v as usize))
                } else {
                    Ok(Cell::Blank)
                }
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Cell, E> {
                Ok(Cell::Text(v.to_owned()))
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Cell, E> {
                Ok(Cell::Blank)
            }

            fn visit_none<E: serde::de::Error>(self) -> Result<Cell, E> {
                Ok(Cell::Blank)
            }
        }

        deserializer.deserialize_any(CellVisitor)
    }
}

/// Ordered rows of cells. Rows may differ in length.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout {
    rows: Vec<Vec<Cell>>,
}

impl Layout {
    /// Wrap explicit rows.
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Rectangular layout numbering photos row-major from zero.
    ///
    /// `rows` and `cols` are clamped to `1..=6`, the range the capture UI offers.
    pub fn grid(rows: u32, cols: u32) -> Self {
        let rows = rows.clamp(1, GRID_MAX_SIDE) as usize;
        let cols = cols.clamp(1, GRID_MAX_SIDE) as usize;
        let rows = (0..rows)
            .map(|r| (0..cols).map(|c| Cell::Photo(r * cols + c)).collect())
            .collect();
        Self { rows }
    }

    /// Rows in paint order.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Length of the longest row.
    pub fn max_cols(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Total number of defined cells across all rows.
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Number of photo cells, i.e. how many captures the layout asks for.
    pub fn photo_cell_count(&self) -> usize {
        self.cells().filter(|(_, _, c)| c.photo_index().is_some()).count()
    }

    /// Iterate `(row, col, cell)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &Cell)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, cell)| (r, c, cell)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/layout.rs"]
mod tests;
