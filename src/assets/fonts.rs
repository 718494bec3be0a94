use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use vello_cpu::peniko::{Blob, FontData};

use crate::foundation::error::{StripError, StripResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

/// Font selected for a requested family. Cloning shares the font bytes.
#[derive(Clone)]
pub struct ResolvedFont {
    /// Face identifier inside the [`FontBook`].
    pub id: usvg::fontdb::ID,
    /// Font file bytes and face index, shared with every other resolution of this face.
    pub data: FontData,
}

impl std::fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFont")
            .field("id", &self.id)
            .field("bytes_len", &self.data.data.len())
            .field("index", &self.data.index)
            .finish()
    }
}

/// Immutable font database shared by every run of an engine.
///
/// Families are matched by name first, then fall back through sans-serif, serif and
/// monospace, then to any loaded face.
pub struct FontBook {
    db: usvg::fontdb::Database,
    loaded: Mutex<HashMap<usvg::fontdb::ID, FontData>>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.db.len())
            .finish()
    }
}

impl FontBook {
    /// Book with no faces; every text draw is skipped.
    pub fn empty() -> Self {
        Self::from_db(usvg::fontdb::Database::new())
    }

    fn from_db(db: usvg::fontdb::Database) -> Self {
        Self {
            db,
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// Load system fonts (when `system` is set) plus every font file in `dirs`.
    pub fn load(dirs: &[PathBuf], system: bool) -> Self {
        let mut db = usvg::fontdb::Database::new();
        if system {
            db.load_system_fonts();
        }
        for dir in dirs {
            load_fonts_from_dir(&mut db, dir);
        }
        tracing::debug!(faces = db.len(), "font book loaded");
        Self::from_db(db)
    }

    /// Add a single font from memory.
    pub fn add_font_data(&mut self, bytes: Vec<u8>) {
        self.db.load_font_data(bytes);
    }

    /// Number of loaded faces.
    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Pick the best face for `family`. Each face's bytes are read once per book.
    pub fn resolve(&self, family: &str) -> Option<ResolvedFont> {
        let mut families = Vec::<usvg::fontdb::Family<'_>>::new();
        for name in family.split(',') {
            let name = name.trim().trim_matches(|c| c == '"' || c == '\'');
            if name.is_empty() {
                continue;
            }
            families.push(match name.to_ascii_lowercase().as_str() {
                "serif" => usvg::fontdb::Family::Serif,
                "sans-serif" => usvg::fontdb::Family::SansSerif,
                "cursive" => usvg::fontdb::Family::Cursive,
                "fantasy" => usvg::fontdb::Family::Fantasy,
                "monospace" => usvg::fontdb::Family::Monospace,
                _ => usvg::fontdb::Family::Name(name),
            });
        }
        families.push(usvg::fontdb::Family::SansSerif);
        families.push(usvg::fontdb::Family::Serif);
        families.push(usvg::fontdb::Family::Monospace);

        let query = usvg::fontdb::Query {
            families: &families,
            weight: usvg::fontdb::Weight::NORMAL,
            stretch: usvg::fontdb::Stretch::Normal,
            style: usvg::fontdb::Style::Normal,
        };

        let id = self
            .db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|f| f.id))?;

        let mut loaded = self.loaded.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(data) = loaded.get(&id) {
            return Some(ResolvedFont {
                id,
                data: data.clone(),
            });
        }
        let data = self.db.with_face_data(id, |bytes, index| {
            FontData::new(Blob::from(bytes.to_vec()), index)
        })?;
        loaded.insert(id, data.clone());
        Some(ResolvedFont { id, data })
    }
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory is not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font");
        }
    }
}

/// Shaped single-line text ready for drawing.
pub struct ShapedText {
    /// Parley layout with glyph positions relative to the layout origin.
    pub layout: parley::Layout<TextBrushRgba8>,
    /// Font used for every glyph run.
    pub font: FontData,
    /// Advance width of the widest line.
    pub width: f32,
    /// Distance from the layout top to the first baseline.
    pub baseline: f32,
}

/// Per-run helper for building Parley text layouts from [`FontBook`] faces.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    families: HashMap<usvg::fontdb::ID, String>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Construct a new layout engine with fresh Parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: HashMap::new(),
        }
    }

    /// Shape `text` as one unwrapped line in `font` at `size_px`.
    pub fn shape_line(
        &mut self,
        text: &str,
        font: &ResolvedFont,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> StripResult<ShapedText> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(StripError::validation(
                "text size must be finite and > 0",
            ));
        }

        let family_name = self.family_for(font)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        let width = layout.width();
        let baseline = layout
            .lines()
            .next()
            .map(|line| line.metrics().baseline)
            .unwrap_or(size_px);

        Ok(ShapedText {
            layout,
            font: font.data.clone(),
            width,
            baseline,
        })
    }

    fn family_for(&mut self, font: &ResolvedFont) -> StripResult<String> {
        if let Some(name) = self.families.get(&font.id) {
            return Ok(name.clone());
        }

        let families = self
            .font_ctx
            .collection
            .register_fonts(font.data.data.clone(), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            StripError::validation("no font families registered from font bytes")
        })?;

        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StripError::validation("registered font family has no name"))?
            .to_string();
        self.families.insert(font.id, family_name.clone());
        Ok(family_name)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
