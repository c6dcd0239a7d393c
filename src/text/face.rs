use crate::foundation::color::Rgb8;
use crate::foundation::error::CaptionResult;
use crate::foundation::geom::Point;
use crate::text::wrap::Measure;

/// A typeface the compositor can measure and paint with.
pub trait CaptionFace {
    /// Family name used for diagnostics.
    fn family(&self) -> &str;

    /// Advance width of `text` set on one line at `size_px`.
    fn advance(&mut self, text: &str, size_px: f32) -> f32;

    /// Paint `text` as a single line with its alphabetic baseline starting at `origin`.
    fn fill_line(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        origin: Point,
        size_px: f32,
        color: Rgb8,
    ) -> CaptionResult<()>;
}

/// Source of faces by family name.
pub trait FaceProvider {
    fn face(&mut self, family: &str) -> CaptionResult<&mut dyn CaptionFace>;
}

/// Adapts a face at a fixed size to the [`Measure`] interface used by line wrapping.
pub struct SizedFace<'a> {
    face: &'a mut dyn CaptionFace,
    size_px: f32,
}

impl<'a> SizedFace<'a> {
    pub fn new(face: &'a mut dyn CaptionFace, size_px: f32) -> Self {
        Self { face, size_px }
    }
}

impl Measure for SizedFace<'_> {
    fn width(&mut self, text: &str) -> f32 {
        self.face.advance(text, self.size_px)
    }
}

/// Font-less face that draws every non-space character as a solid box.
///
/// Every character advances by the same fraction of the font size, which makes layouts exact
/// and reproducible without any font files installed.
#[derive(Clone, Copy, Debug)]
pub struct BlockFace {
    advance_em: f32,
}

impl Default for BlockFace {
    fn default() -> Self {
        Self::new(0.6)
    }
}

impl BlockFace {
    const INK_HEIGHT_EM: f64 = 0.7;
    const INK_WIDTH: f64 = 0.8;

    pub fn new(advance_em: f32) -> Self {
        Self {
            advance_em: if advance_em.is_finite() && advance_em > 0.0 {
                advance_em
            } else {
                0.6
            },
        }
    }

    pub fn char_advance(&self, size_px: f32) -> f32 {
        self.advance_em * size_px
    }
}

impl CaptionFace for BlockFace {
    fn family(&self) -> &str {
        "block"
    }

    fn advance(&mut self, text: &str, size_px: f32) -> f32 {
        text.chars().count() as f32 * self.char_advance(size_px)
    }

    fn fill_line(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        origin: Point,
        size_px: f32,
        color: Rgb8,
    ) -> CaptionResult<()> {
        let adv = f64::from(self.char_advance(size_px));
        let ink_w = adv * Self::INK_WIDTH;
        let ink_h = f64::from(size_px) * Self::INK_HEIGHT_EM;

        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, 255,
        ));
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let x0 = origin.x + adv * i as f64 + (adv - ink_w) / 2.0;
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                x0,
                origin.y - ink_h,
                x0 + ink_w,
                origin.y,
            ));
        }
        Ok(())
    }
}

impl FaceProvider for BlockFace {
    fn face(&mut self, _family: &str) -> CaptionResult<&mut dyn CaptionFace> {
        Ok(self)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/face.rs"]
mod tests;
