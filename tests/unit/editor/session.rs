use std::io::Cursor;

use super::*;
use crate::foundation::color::Rgb8;
use crate::foundation::geom::Point;
use crate::style::config::{BackgroundMode, ExportFormat, TextAlign};
use crate::text::face::{BlockFace, CaptionFace};
use crate::text::fonts::FontBook;

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([40, 80, 120, 255]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn editor() -> Editor {
    Editor::new(Box::new(BlockFace::default())).unwrap()
}

#[test]
fn new_session_shows_placeholder() {
    let ed = editor();
    assert!(!ed.has_image());
    assert_eq!(ed.style(), &StyleConfig::default());
    assert_eq!((ed.surface().width(), ed.surface().height()), (1200, 800));
    assert_eq!(ed.surface().pixel(0, 0), Some([0xf0, 0xf0, 0xf0, 255]));
    assert_eq!(ed.render_count(), 0);
}

#[test]
fn upload_renders_exactly_once() {
    let mut ed = editor();
    ed.upload(&png_bytes(300, 200), "image/png").unwrap();
    assert!(ed.has_image());
    assert_eq!(ed.render_count(), 1);
    assert_eq!((ed.surface().width(), ed.surface().height()), (300, 200));
}

#[test]
fn rejected_upload_changes_nothing() {
    let mut ed = editor();
    ed.upload(&png_bytes(300, 200), "image/png").unwrap();
    let before = ed.surface().data().to_vec();

    let err = ed.upload(&png_bytes(10, 10), "image/bmp").unwrap_err();
    assert!(err.is_user_facing());
    assert!(err.to_string().starts_with("unsupported image type:"));

    let err = ed.upload(b"not an image", "image/png").unwrap_err();
    assert!(err.to_string().starts_with("decode error:"));

    assert_eq!(ed.image().map(|i| i.width()), Some(300));
    assert_eq!(ed.surface().data(), before.as_slice());
    assert_eq!(ed.render_count(), 1);
}

#[test]
fn discrete_updates_render_immediately() {
    let mut ed = editor();
    ed.upload(&png_bytes(200, 100), "image/png").unwrap();
    ed.update(StyleUpdate::FontSize(40)).unwrap();
    assert_eq!(ed.style().font_size, 40);
    assert_eq!(ed.render_count(), 2);

    let err = ed.update(StyleUpdate::BackgroundOpacity(3.0)).unwrap_err();
    assert!(err.to_string().starts_with("validation error:"));
    assert_eq!(ed.style().background_opacity, 0.75);
    assert_eq!(ed.render_count(), 2);
}

#[test]
fn caption_typing_is_debounced_last_write_wins() {
    let mut ed = editor();
    ed.upload(&png_bytes(200, 100), "image/png").unwrap();
    let t0 = Instant::now();

    ed.update_caption_debounced("H", t0);
    ed.update_caption_debounced("Hi", t0 + Duration::from_millis(50));
    assert!(!ed.tick(t0 + Duration::from_millis(120)).unwrap());
    assert_eq!(ed.style().caption_text, "");
    assert_eq!(ed.render_count(), 1);

    assert!(ed.tick(t0 + Duration::from_millis(150)).unwrap());
    assert_eq!(ed.style().caption_text, "Hi");
    assert_eq!(ed.render_count(), 2);
    assert!(!ed.caption_pending());
}

#[test]
fn flush_applies_pending_caption() {
    let mut ed = editor();
    ed.upload(&png_bytes(200, 100), "image/png").unwrap();
    ed.update_caption_debounced("late", Instant::now());
    assert!(ed.flush_pending().unwrap());
    assert_eq!(ed.style().caption_text, "late");
    assert!(!ed.flush_pending().unwrap());
}

#[test]
fn immediate_caption_update_drops_pending_text() {
    let mut ed = editor();
    let t0 = Instant::now();
    ed.update_caption_debounced("typed", t0);
    ed.update(StyleUpdate::CaptionText("final".into())).unwrap();
    assert!(!ed.caption_pending());
    assert!(!ed.tick(t0 + CAPTION_DEBOUNCE).unwrap());
    assert_eq!(ed.style().caption_text, "final");
}

#[test]
fn preset_applies_atomically() {
    let mut ed = editor();
    ed.upload(&png_bytes(200, 100), "image/png").unwrap();
    ed.apply_preset("BOLD").unwrap();
    let s = ed.style();
    assert_eq!(s.font_size, 36);
    assert_eq!(s.text_align, TextAlign::Left);
    assert_eq!(s.background_opacity, 0.9);
    assert_eq!(s.background_mode, BackgroundMode::Solid);
    assert_eq!(ed.render_count(), 2);

    assert!(ed.apply_preset("neon").is_err());
    assert_eq!(ed.style().font_size, 36);
}

#[test]
fn render_without_image_is_noop() {
    let mut ed = editor();
    ed.render().unwrap();
    ed.update(StyleUpdate::FontSize(50)).unwrap();
    assert_eq!(ed.render_count(), 0);
    assert!(ed.layout().is_none());
}

#[test]
fn download_requires_image() {
    let mut ed = editor();
    let err = ed.download().unwrap_err();
    assert!(matches!(err, CaptionError::NoImage));
    assert!(err.is_user_facing());

    ed.upload(&png_bytes(64, 64), "image/png").unwrap();
    ed.update(StyleUpdate::ExportFormat(ExportFormat::Jpeg)).unwrap();
    let dl = ed.download().unwrap();
    assert_eq!(dl.file_name, "captioned_image.jpg");
    assert_eq!(&dl.bytes[..2], &[0xff, 0xd8]);
}

#[test]
fn reset_restores_defaults_and_placeholder() {
    let mut ed = editor();
    ed.upload(&png_bytes(200, 100), "image/png").unwrap();
    ed.apply_preset("light").unwrap();
    ed.update(StyleUpdate::CaptionText("hello".into())).unwrap();
    ed.update_caption_debounced("pending", Instant::now());

    ed.reset();
    assert_eq!(ed.style(), &StyleConfig::default());
    assert!(!ed.has_image());
    assert!(!ed.caption_pending());
    assert!(ed.layout().is_none());
    assert_eq!((ed.surface().width(), ed.surface().height()), (1200, 800));

    let before = ed.surface().data().to_vec();
    let renders = ed.render_count();
    ed.render().unwrap();
    assert_eq!(ed.surface().data(), before.as_slice());
    assert_eq!(ed.render_count(), renders);
}

/// Block face whose draws fail when their 1-based call number falls in `failing`.
struct FlakyFace {
    inner: BlockFace,
    draws: u32,
    failing: std::ops::Range<u32>,
}

impl FlakyFace {
    fn failing(failing: std::ops::Range<u32>) -> Self {
        Self {
            inner: BlockFace::default(),
            draws: 0,
            failing,
        }
    }
}

impl CaptionFace for FlakyFace {
    fn family(&self) -> &str {
        "flaky"
    }

    fn advance(&mut self, text: &str, size_px: f32) -> f32 {
        self.inner.advance(text, size_px)
    }

    fn fill_line(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        text: &str,
        origin: Point,
        size_px: f32,
        color: Rgb8,
    ) -> CaptionResult<()> {
        self.draws += 1;
        if self.failing.contains(&self.draws) {
            return Err(CaptionError::render(format!("draw {} failed", self.draws)));
        }
        self.inner.fill_line(ctx, text, origin, size_px, color)
    }
}

impl FaceProvider for FlakyFace {
    fn face(&mut self, _family: &str) -> CaptionResult<&mut dyn CaptionFace> {
        Ok(self)
    }
}

fn prompt_pixels(surface: &Surface) -> usize {
    (0..surface.width())
        .filter(|x| surface.pixel(*x, 395) == Some([0x99, 0x99, 0x99, 255]))
        .count()
}

#[test]
fn reset_recovers_when_the_first_placeholder_redraw_fails() {
    // Draw 1 is the initial placeholder, draw 2 the first redraw on reset.
    let mut ed = Editor::new(Box::new(FlakyFace::failing(2..3))).unwrap();
    ed.upload(&png_bytes(40, 30), "image/png").unwrap();

    ed.reset();
    assert!(!ed.has_image());
    assert_eq!((ed.surface().width(), ed.surface().height()), (1200, 800));
    assert_eq!(ed.surface().pixel(0, 0), Some([0xf0, 0xf0, 0xf0, 255]));
    assert!(prompt_pixels(ed.surface()) > 0);
}

#[test]
fn reset_survives_repeated_placeholder_failures() {
    let mut ed = Editor::new(Box::new(FlakyFace::failing(2..u32::MAX))).unwrap();
    ed.upload(&png_bytes(40, 30), "image/png").unwrap();

    ed.reset();
    assert!(!ed.has_image());
    assert!(ed.layout().is_none());
    assert_eq!(ed.style(), &StyleConfig::default());
    assert_eq!((ed.surface().width(), ed.surface().height()), (1200, 800));
    assert_eq!(ed.surface().pixel(0, 0), Some([240, 240, 240, 255]));
    assert_eq!(prompt_pixels(ed.surface()), 0);
}

#[test]
fn upload_with_blank_caption_needs_no_font() {
    let mut ed = Editor::new(Box::new(FontBook::new())).unwrap();
    ed.upload(&png_bytes(40, 30), "image/png").unwrap();
    assert!(ed.has_image());
    assert_eq!(ed.render_count(), 1);
    assert_eq!((ed.surface().width(), ed.surface().height()), (40, 30));
}

#[test]
fn failed_render_keeps_the_previous_image_and_style() {
    let mut ed = Editor::new(Box::new(FontBook::new())).unwrap();
    ed.upload(&png_bytes(40, 30), "image/png").unwrap();
    let shown = ed.surface().data().to_vec();
    let layout = ed.layout().cloned();

    let err = ed.update(StyleUpdate::CaptionText("hello".into())).unwrap_err();
    assert!(err.to_string().starts_with("font error:"));
    assert_eq!(ed.style().caption_text, "");

    ed.style.caption_text = "hello".into();
    let err = ed.upload(&png_bytes(20, 10), "image/png").unwrap_err();
    assert!(err.to_string().starts_with("font error:"));
    assert_eq!(ed.image().map(|i| (i.width(), i.height())), Some((40, 30)));
    assert_eq!(ed.surface().data(), shown.as_slice());
    assert_eq!(ed.layout().cloned(), layout);
    assert_eq!(ed.render_count(), 1);
}
