use std::collections::HashMap;
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::color::Rgb8;
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::foundation::geom::Point;
use crate::text::face::{CaptionFace, FaceProvider};

/// RGBA8 brush color carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Rgb8> for TextBrushRgba8 {
    fn from(c: Rgb8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: 255,
        }
    }
}

/// A concrete font shaped with Parley and painted with `vello_cpu` glyph runs.
pub struct FontFace {
    family: String,
    font: vello_cpu::peniko::FontData,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.family)
            .finish()
    }
}

impl FontFace {
    /// Build a face from raw font file bytes (`index` selects a face inside a collection).
    pub fn from_bytes(font_bytes: Vec<u8>, index: u32) -> CaptionResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        // A collection registers several families; shape with the one owning face `index`.
        let family_id = families
            .iter()
            .find(|(_, fonts)| fonts.iter().any(|f| f.index() == index))
            .or_else(|| families.first())
            .map(|(id, _)| *id)
            .ok_or_else(|| CaptionError::font("no font families registered from font bytes"))?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CaptionError::font("registered font family has no name"))?
            .to_string();

        let font =
            vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), index);

        Ok(Self {
            family,
            font,
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
        })
    }

    fn layout_line(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> parley::Layout<TextBrushRgba8> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

impl CaptionFace for FontFace {
    fn family(&self) -> &str {
        &self.family
    }

    fn advance(&mut self, text: &str, size_px: f32) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        self.layout_line(text, size_px, TextBrushRgba8::default())
            .full_width()
    }

    fn fill_line(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        origin: Point,
        size_px: f32,
        color: Rgb8,
    ) -> CaptionResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let layout = self.layout_line(text, size_px, color.into());
        let Some(first) = layout.lines().next() else {
            return Ok(());
        };
        let baseline = f64::from(first.metrics().baseline);

        ctx.set_transform(vello_cpu::kurbo::Affine::translate((
            origin.x,
            origin.y - baseline,
        )));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }
}

/// Font database that resolves family names to shaped faces.
///
/// Lookups try the requested family, then the generic sans-serif family, then any face at all.
/// Each resolved face is built once and reused.
pub struct FontBook {
    db: usvg::fontdb::Database,
    resolved: HashMap<String, usvg::fontdb::ID>,
    faces: HashMap<usvg::fontdb::ID, FontFace>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces_available", &self.db.len())
            .field("faces_loaded", &self.faces.len())
            .finish()
    }
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

impl FontBook {
    /// An empty book; add fonts with [`FontBook::load_font_file`] or [`FontBook::load_font_data`].
    pub fn new() -> Self {
        Self {
            db: usvg::fontdb::Database::new(),
            resolved: HashMap::new(),
            faces: HashMap::new(),
        }
    }

    pub fn with_system_fonts() -> Self {
        let mut book = Self::new();
        book.db.load_system_fonts();
        tracing::debug!(faces = book.db.len(), "loaded system fonts");
        book
    }

    pub fn load_font_file(&mut self, path: &Path) -> CaptionResult<()> {
        self.db
            .load_font_file(path)
            .with_context(|| format!("load font file '{}'", path.display()))?;
        self.resolved.clear();
        Ok(())
    }

    pub fn load_font_data(&mut self, bytes: Vec<u8>) {
        self.db.load_font_data(bytes);
        self.resolved.clear();
    }

    /// Number of faces known to the underlying database.
    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.len() == 0
    }

    fn lookup(&self, family: &str) -> Option<usvg::fontdb::ID> {
        let families = [
            usvg::fontdb::Family::Name(family),
            usvg::fontdb::Family::SansSerif,
        ];
        let query = usvg::fontdb::Query {
            families: &families,
            weight: usvg::fontdb::Weight::NORMAL,
            stretch: usvg::fontdb::Stretch::Normal,
            style: usvg::fontdb::Style::Normal,
        };
        self.db
            .query(&query)
            .or_else(|| self.db.faces().next().map(|f| f.id))
    }
}

impl FaceProvider for FontBook {
    fn face(&mut self, family: &str) -> CaptionResult<&mut dyn CaptionFace> {
        let id = match self.resolved.get(family) {
            Some(id) => *id,
            None => {
                let id = self.lookup(family).ok_or_else(|| {
                    CaptionError::font(format!("no font available for family '{family}'"))
                })?;
                self.resolved.insert(family.to_string(), id);
                id
            }
        };

        if !self.faces.contains_key(&id) {
            let (bytes, index) = self
                .db
                .with_face_data(id, |data, index| (data.to_vec(), index))
                .ok_or_else(|| CaptionError::font(format!("font data for '{family}' is gone")))?;
            let face = FontFace::from_bytes(bytes, index)?;
            tracing::debug!(requested = family, resolved = face.family(), "resolved font");
            self.faces.insert(id, face);
        }

        let face = self
            .faces
            .get_mut(&id)
            .ok_or_else(|| CaptionError::font(format!("font for '{family}' was not cached")))?;
        Ok(face)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/fonts.rs"]
mod tests;
