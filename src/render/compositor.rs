use crate::assets::decode::SourceImage;
use crate::foundation::color::Rgb8;
use crate::foundation::error::CaptionResult;
use crate::foundation::geom::{self, Point, Rect, Size};
use crate::render::surface::Surface;
use crate::style::config::{BackgroundMode, StyleConfig};
use crate::text::face::{CaptionFace, FaceProvider, SizedFace};
use crate::text::wrap::{Measure, wrap};

/// Baseline sits this fraction of the font size above the bottom of its band.
const BASELINE_DESCENT_EM: f64 = 0.2;

/// Geometry of one composited frame, derived from the image size, the style and font metrics.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptionLayout {
    /// Downscale applied to the source image.
    pub scale: f64,
    /// Scaled image width; also the canvas width.
    pub image_width: u32,
    /// Scaled image height; the first band ends here.
    pub image_height: u32,
    /// Equal to `image_width`.
    pub canvas_width: u32,
    /// Image height plus one line height per line past the first, rounded.
    pub canvas_height: u32,
    /// Wrapped caption lines, one band each. Empty lines keep their band.
    pub lines: Vec<String>,
    /// Font size in pixels used for measuring and drawing.
    pub font_size: f32,
    /// Per-line band height in pixels.
    pub line_height: f64,
    /// Width of the centered caption column.
    pub band_width: f64,
}

impl CaptionLayout {
    /// Number of wrapped lines, including empty ones.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Height added below the scaled image for lines past the first.
    pub fn extra_height(&self) -> f64 {
        self.lines.len().saturating_sub(1) as f64 * self.line_height
    }

    /// Left edge of every band; the column is centered whatever the text alignment.
    pub fn band_left(&self) -> f64 {
        (f64::from(self.canvas_width) - self.band_width) / 2.0
    }

    /// Top of the first band; its bottom edge meets the bottom of the scaled image.
    pub fn first_band_top(&self) -> f64 {
        f64::from(self.image_height) - self.line_height
    }

    /// Band `index`, counting down from the one that ends at the image bottom.
    pub fn band_rect(&self, index: usize) -> Rect {
        let top = self.first_band_top() + index as f64 * self.line_height;
        Rect::from_origin_size(
            (self.band_left(), top),
            (self.band_width, self.line_height),
        )
    }

    /// Alphabetic baseline of line `index`.
    pub fn baseline(&self, index: usize) -> f64 {
        self.band_rect(index).y1 - f64::from(self.font_size) * BASELINE_DESCENT_EM
    }
}

/// Lay out `style.caption_text` over an image of the given intrinsic size.
///
/// `measure` must report widths at `style.font_size`.
pub fn layout_caption<M>(
    image_width: u32,
    image_height: u32,
    style: &StyleConfig,
    measure: &mut M,
) -> CaptionLayout
where
    M: Measure + ?Sized,
{
    let scale = geom::display_scale(image_width, geom::MAX_DISPLAY_WIDTH);
    let (sw, sh) = geom::scaled_size(image_width, image_height, geom::MAX_DISPLAY_WIDTH);

    let band_width = f64::from(sw) * f64::from(style.caption_width);
    let lines = wrap(&style.caption_text, band_width as f32, measure);
    let line_height = style.line_height_px();
    let extra = lines.len().saturating_sub(1) as f64 * line_height;

    CaptionLayout {
        scale,
        image_width: sw,
        image_height: sh,
        canvas_width: sw,
        canvas_height: (f64::from(sh) + extra).round() as u32,
        lines,
        font_size: style.font_size as f32,
        line_height,
        band_width,
    }
}

/// A freshly composited frame.
#[derive(Debug)]
pub struct Rendered {
    /// Composited pixels sized to the layout's canvas.
    pub surface: Surface,
    /// Geometry the surface was drawn with.
    pub layout: CaptionLayout,
}

/// Composite `image` and its caption into a new surface.
pub fn render(
    image: &SourceImage,
    style: &StyleConfig,
    fonts: &mut dyn FaceProvider,
) -> CaptionResult<Rendered> {
    let mut surface = Surface::new(1, 1)?;
    let layout = render_into(&mut surface, image, style, fonts)?;
    Ok(Rendered { surface, layout })
}

/// Composite into an existing surface, which is resized (and cleared) to fit.
///
/// A font face is only resolved when the caption has visible text. Style and font errors are
/// returned before the surface is touched.
#[tracing::instrument(
    skip_all,
    fields(image_w = image.width(), image_h = image.height(), mode = ?style.background_mode)
)]
pub fn render_into(
    surface: &mut Surface,
    image: &SourceImage,
    style: &StyleConfig,
    fonts: &mut dyn FaceProvider,
) -> CaptionResult<CaptionLayout> {
    style.validate()?;
    if !style.has_caption() {
        // Blank paragraphs wrap to empty lines without being measured, so no face is needed.
        let mut unmeasured = |_: &str| 0.0_f32;
        let layout = layout_caption(image.width(), image.height(), style, &mut unmeasured);
        draw_image(surface, image, &layout)?;
        return Ok(layout);
    }

    let face = fonts.face(&style.font_family)?;
    let layout = {
        let mut measure = SizedFace::new(&mut *face, style.font_size as f32);
        layout_caption(image.width(), image.height(), style, &mut measure)
    };
    draw_image(surface, image, &layout)?;
    draw_bands(surface, &layout, style, face)?;
    Ok(layout)
}

fn draw_image(
    surface: &mut Surface,
    image: &SourceImage,
    layout: &CaptionLayout,
) -> CaptionResult<()> {
    surface.resize(layout.canvas_width, layout.canvas_height)?;
    let scaled = image.resized(layout.image_width, layout.image_height);
    surface.draw_rgba(&scaled, 0, 0, 1.0, None);
    tracing::debug!(
        lines = layout.line_count(),
        canvas_w = layout.canvas_width,
        canvas_h = layout.canvas_height,
        "composited image"
    );
    Ok(())
}

fn draw_bands(
    surface: &mut Surface,
    layout: &CaptionLayout,
    style: &StyleConfig,
    face: &mut dyn CaptionFace,
) -> CaptionResult<()> {
    if style.background_mode == BackgroundMode::SourceImage {
        // Every band reuses the strip behind the first line. Rows above the image read as
        // transparent, and the strip overwrites whatever it lands on.
        let first = layout.band_rect(0);
        let (x, y) = (first.x0.round() as i64, first.y0.round() as i64);
        let w = (first.x1.round() as i64 - x).max(0) as u32;
        let h = (first.y1.round() as i64 - y).max(0) as u32;
        let strip = surface.capture_region(x, y, w, h);
        for (i, line) in layout.lines.iter().enumerate() {
            let band = layout.band_rect(i);
            surface.put_region(&strip, band.x0.round() as i64, band.y0.round() as i64);
            surface.paint_over(|ctx| draw_text_line(ctx, &mut *face, layout, style, i, line))?;
        }
        return Ok(());
    }

    surface.paint_over(|ctx| {
        for (i, line) in layout.lines.iter().enumerate() {
            fill_band(
                ctx,
                layout.band_rect(i),
                style.background_color,
                style.background_opacity,
            );
            draw_text_line(ctx, &mut *face, layout, style, i, line)?;
        }
        Ok(())
    })
}

/// Paint a single background into `rect`, outside of a full caption render.
///
/// Source-image mode draws `image` cover-fitted to the rect at `opacity`. Without an image it
/// falls back to the solid color.
pub fn draw_background(
    surface: &mut Surface,
    rect: Rect,
    mode: BackgroundMode,
    image: Option<&SourceImage>,
    color: Rgb8,
    opacity: f32,
) -> CaptionResult<()> {
    match (mode, image) {
        (BackgroundMode::SourceImage, Some(image)) => {
            let Some(clip) = geom::pixel_bounds(rect, surface.width(), surface.height()) else {
                return Ok(());
            };
            let fit = geom::cover_fit(
                rect,
                Size::new(f64::from(image.width()), f64::from(image.height())),
            );
            let w = fit.width().round().max(1.0) as u32;
            let h = fit.height().round().max(1.0) as u32;
            let scaled = image.resized(w, h);
            surface.draw_rgba(
                &scaled,
                fit.x0.round() as i64,
                fit.y0.round() as i64,
                opacity,
                Some(clip),
            );
            Ok(())
        }
        _ => surface.paint_over(|ctx| {
            fill_band(ctx, rect, color, opacity);
            Ok(())
        }),
    }
}

fn fill_band(ctx: &mut vello_cpu::RenderContext, rect: Rect, color: Rgb8, opacity: f32) {
    let [r, g, b, a] = color.with_opacity(opacity);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
    ctx.fill_rect(&rect_to_cpu(rect));
}

fn draw_text_line(
    ctx: &mut vello_cpu::RenderContext,
    face: &mut dyn CaptionFace,
    layout: &CaptionLayout,
    style: &StyleConfig,
    index: usize,
    line: &str,
) -> CaptionResult<()> {
    if line.is_empty() {
        return Ok(());
    }
    let text_width = f64::from(face.advance(line, layout.font_size));
    let x = style
        .text_align
        .text_x(layout.band_left(), layout.band_width, text_width);
    face.fill_line(
        ctx,
        line,
        Point::new(x, layout.baseline(index)),
        layout.font_size,
        style.text_color,
    )
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
