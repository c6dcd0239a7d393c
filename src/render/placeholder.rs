use crate::foundation::color::Rgb8;
use crate::foundation::error::CaptionResult;
use crate::foundation::geom::Point;
use crate::render::surface::Surface;
use crate::style::config::DEFAULT_FONT_FAMILY;
use crate::text::face::FaceProvider;

pub const PLACEHOLDER_WIDTH: u32 = 1200;
pub const PLACEHOLDER_HEIGHT: u32 = 800;
pub const PLACEHOLDER_FILL: Rgb8 = Rgb8::new(0xf0, 0xf0, 0xf0);
pub const PROMPT_COLOR: Rgb8 = Rgb8::new(0x99, 0x99, 0x99);
pub const PROMPT_SIZE_PX: f32 = 20.0;
pub const PROMPT_TEXT: &str = "Upload an image to start editing";

/// Resize `surface` to the idle canvas and draw the upload prompt centered on it.
///
/// A missing font only drops the prompt; surface failures are returned.
pub fn draw_placeholder(surface: &mut Surface, fonts: &mut dyn FaceProvider) -> CaptionResult<()> {
    surface.resize(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT)?;
    surface.fill(PLACEHOLDER_FILL.premul_with_opacity(1.0));

    let face = match fonts.face(DEFAULT_FONT_FAMILY) {
        Ok(face) => face,
        Err(err) => {
            tracing::warn!(%err, "placeholder prompt skipped");
            return Ok(());
        }
    };
    let width = f64::from(face.advance(PROMPT_TEXT, PROMPT_SIZE_PX));
    let origin = Point::new(
        (f64::from(PLACEHOLDER_WIDTH) - width) / 2.0,
        f64::from(PLACEHOLDER_HEIGHT) / 2.0,
    );
    surface.paint_over(|ctx| face.fill_line(ctx, PROMPT_TEXT, origin, PROMPT_SIZE_PX, PROMPT_COLOR))
}

#[cfg(test)]
#[path = "../../tests/unit/render/placeholder.rs"]
mod tests;
