use super::*;
use crate::style::config::TextAlign;
use crate::text::face::BlockFace;
use crate::text::fonts::FontBook;

fn solid_image(w: u32, h: u32, px: [u8; 4]) -> SourceImage {
    SourceImage::from_rgba(image::RgbaImage::from_pixel(w, h, image::Rgba(px))).unwrap()
}

fn gradient_image(w: u32, h: u32) -> SourceImage {
    let img = image::RgbaImage::from_fn(w, h, |x, y| {
        image::Rgba([(x % 256) as u8, (y * 2 % 256) as u8, 90, 255])
    });
    SourceImage::from_rgba(img).unwrap()
}

fn style_with(caption: &str, font_size: u32) -> StyleConfig {
    StyleConfig {
        caption_text: caption.to_string(),
        font_size,
        ..StyleConfig::default()
    }
}

fn block_measure(size: f32) -> impl FnMut(&str) -> f32 {
    let face = BlockFace::default();
    move |s: &str| s.chars().count() as f32 * face.char_advance(size)
}

#[test]
fn reference_scenario_geometry() {
    let style = StyleConfig {
        line_height: 1.4,
        ..style_with("Hello\nWorld", 40)
    };
    let layout = layout_caption(2000, 1000, &style, &mut block_measure(40.0));
    assert_eq!(layout.lines, vec!["Hello".to_string(), "World".to_string()]);
    assert_eq!((layout.canvas_width, layout.canvas_height), (1200, 656));
    assert!((layout.scale - 0.6).abs() < 1e-9);
    assert!((layout.band_rect(0).y1 - 600.0).abs() < 1e-9);
    assert!((layout.band_rect(1).y0 - 600.0).abs() < 1e-9);
    assert!((layout.baseline(0) - (600.0 - 8.0)).abs() < 1e-9);
}

#[test]
fn small_images_are_not_upscaled() {
    let layout = layout_caption(300, 200, &style_with("", 32), &mut block_measure(32.0));
    assert_eq!((layout.canvas_width, layout.canvas_height), (300, 200));
    assert_eq!(layout.lines, vec![String::new()]);
    assert_eq!(layout.extra_height(), 0.0);
}

#[test]
fn canvas_grows_by_one_line_height_per_extra_line() {
    let style = StyleConfig {
        caption_width: 0.5,
        ..style_with("the quick brown fox jumps over the lazy dog", 20)
    };
    let layout = layout_caption(400, 300, &style, &mut block_measure(20.0));
    let k = layout.line_count();
    assert!(k > 1);
    let expected = (k - 1) as f64 * 20.0 * f64::from(style.line_height);
    assert_eq!(
        layout.canvas_height,
        (300.0 + expected).round() as u32,
        "lines: {:?}",
        layout.lines
    );
    for line in &layout.lines {
        assert!(line.chars().count() as f64 * 12.0 <= layout.band_width || line.chars().count() == 1);
    }
}

#[test]
fn band_is_centered_regardless_of_alignment() {
    for align in [TextAlign::Left, TextAlign::Center, TextAlign::Right] {
        let style = StyleConfig {
            text_align: align,
            ..style_with("hi", 20)
        };
        let layout = layout_caption(500, 100, &style, &mut block_measure(20.0));
        assert!((layout.band_left() - 25.0).abs() < 1e-3);
        assert!((layout.band_width - 450.0).abs() < 1e-3);
    }
}

#[test]
fn centered_text_has_equal_side_gaps() {
    let style = style_with("centered", 24);
    let layout = layout_caption(640, 480, &style, &mut block_measure(24.0));
    let text_w = 8.0 * 24.0 * 0.6;
    let x = style
        .text_align
        .text_x(layout.band_left(), layout.band_width, text_w);
    let left_gap = x - layout.band_left();
    let right_gap = layout.band_left() + layout.band_width - (x + text_w);
    assert!((left_gap - right_gap).abs() <= 1.0);
}

#[test]
fn solid_band_blends_over_image() {
    let image = solid_image(400, 200, [255, 255, 255, 255]);
    let style = style_with("ab", 20);
    let out = render(&image, &style, &mut BlockFace::default()).unwrap();
    let s = &out.surface;
    assert_eq!((s.width(), s.height()), (400, 200));

    // band spans x 20..380, y 172..200; black at 0.75 over white
    let band = s.pixel(22, 186).unwrap();
    assert_eq!(band[3], 255);
    assert!((i32::from(band[0]) - 64).abs() <= 2, "{band:?}");
    assert_eq!(s.pixel(5, 186), Some([255, 255, 255, 255]));
    assert_eq!(s.pixel(22, 160), Some([255, 255, 255, 255]));

    // text ink is white, drawn above the baseline near the band center
    let ink = s.pixel(194, 190).unwrap();
    assert_eq!(ink, [255, 255, 255, 255]);
}

#[test]
fn whitespace_caption_draws_no_bands() {
    let image = gradient_image(120, 80);
    let style = style_with("   \n  ", 16);
    let out = render(&image, &style, &mut BlockFace::default()).unwrap();
    assert_eq!(out.layout.line_count(), 2);
    for y in 0..80 {
        for x in 0..120 {
            assert_eq!(
                out.surface.pixel(x, y).unwrap(),
                image.pixels().get_pixel(x, y).0
            );
        }
    }
    for y in 80..out.surface.height() {
        assert_eq!(out.surface.pixel(0, y), Some([0, 0, 0, 0]));
    }
}

#[test]
fn source_image_mode_repeats_the_first_strip() {
    let image = gradient_image(300, 100);
    let style = StyleConfig {
        background_mode: BackgroundMode::SourceImage,
        ..style_with("a\nb\nc", 10)
    };
    let out = render(&image, &style, &mut BlockFace::default()).unwrap();
    let s = &out.surface;
    assert_eq!(out.layout.line_count(), 3);
    assert_eq!(s.height(), 128);

    let x = 16;
    for dy in 0..14 {
        let original = image.pixels().get_pixel(x, 86 + dy).0;
        assert_eq!(s.pixel(x, 86 + dy).unwrap(), original);
        assert_eq!(s.pixel(x, 100 + dy).unwrap(), original);
        assert_eq!(s.pixel(x, 114 + dy).unwrap(), original);
    }
}

#[test]
fn source_image_mode_above_the_image_pastes_a_partly_empty_strip() {
    let image = solid_image(50, 10, [0, 0, 255, 255]);
    let style = StyleConfig {
        background_mode: BackgroundMode::SourceImage,
        background_opacity: 0.3,
        ..style_with("x\ny", 20)
    };
    let out = render(&image, &style, &mut BlockFace::default()).unwrap();
    let s = &out.surface;
    assert_eq!(s.height(), 38);
    assert!(out.layout.first_band_top() < 0.0);

    // Strip rows above the image are transparent; the rest are copied as is, not blended.
    assert_eq!(s.pixel(4, 5), Some([0, 0, 255, 255]));
    assert_eq!(s.pixel(4, 15), Some([0, 0, 0, 0]));
    assert_eq!(s.pixel(4, 27), Some([0, 0, 0, 0]));
    assert_eq!(s.pixel(4, 30), Some([0, 0, 255, 255]));
    assert_eq!(s.pixel(4, 37), Some([0, 0, 255, 255]));
    assert_eq!(s.pixel(1, 30), Some([0, 0, 0, 0]));
}

#[test]
fn blank_caption_renders_without_any_font() {
    let image = gradient_image(60, 40);
    let out = render(&image, &style_with("  \n ", 16), &mut FontBook::new()).unwrap();
    assert_eq!(out.layout.line_count(), 2);
    assert_eq!(out.surface.width(), 60);
    assert_eq!(out.surface.pixel(5, 5), Some(image.pixels().get_pixel(5, 5).0));
}

#[test]
fn missing_font_fails_before_the_surface_changes() {
    let image = gradient_image(60, 40);
    let mut surface = Surface::new(4, 4).unwrap();
    surface.fill([9, 9, 9, 255]);
    let before = surface.data().to_vec();

    let err = render_into(&mut surface, &image, &style_with("hi", 16), &mut FontBook::new())
        .unwrap_err();
    assert!(err.to_string().starts_with("font error:"));
    assert_eq!((surface.width(), surface.height()), (4, 4));
    assert_eq!(surface.data(), before.as_slice());
}

#[test]
fn draw_background_without_image_falls_back_to_solid() {
    let mut surface = Surface::new(10, 10).unwrap();
    surface.fill([255, 255, 255, 255]);
    draw_background(
        &mut surface,
        Rect::new(0.0, 0.0, 10.0, 5.0),
        BackgroundMode::SourceImage,
        None,
        Rgb8::new(255, 0, 0),
        1.0,
    )
    .unwrap();
    assert_eq!(surface.pixel(3, 2), Some([255, 0, 0, 255]));
    assert_eq!(surface.pixel(3, 7), Some([255, 255, 255, 255]));
}

#[test]
fn invalid_style_is_rejected_before_drawing() {
    let image = solid_image(10, 10, [0, 0, 0, 255]);
    let style = style_with("x", 0);
    let err = render(&image, &style, &mut BlockFace::default()).unwrap_err();
    assert!(err.to_string().starts_with("validation error:"));
}
