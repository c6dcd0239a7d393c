use super::*;

#[test]
fn defaults_match_documented_values() {
    let s = StyleConfig::default();
    assert_eq!(s.caption_text, "");
    assert_eq!(s.font_size, 32);
    assert_eq!(s.font_family, DEFAULT_FONT_FAMILY);
    assert_eq!(s.text_color, Rgb8::WHITE);
    assert_eq!(s.background_mode, BackgroundMode::Solid);
    assert_eq!(s.background_color, Rgb8::BLACK);
    assert_eq!(s.background_opacity, 0.75);
    assert_eq!(s.caption_width, 0.9);
    assert_eq!(s.bottom_padding, 0);
    assert_eq!(s.line_height, 1.4);
    assert_eq!(s.text_align, TextAlign::Center);
    assert_eq!(s.export_format, ExportFormat::Png);
    assert_eq!(s.export_quality, 0.9);
    s.validate().unwrap();
}

#[test]
fn validate_rejects_out_of_range_fields() {
    let bad = [
        StyleUpdate::FontSize(0),
        StyleUpdate::FontFamily("  ".to_string()),
        StyleUpdate::BackgroundOpacity(1.5),
        StyleUpdate::ExportQuality(-0.1),
        StyleUpdate::CaptionWidth(0.0),
        StyleUpdate::CaptionWidth(1.01),
        StyleUpdate::LineHeight(1.0),
        StyleUpdate::LineHeight(f32::NAN),
    ];
    for update in bad {
        let mut s = StyleConfig::default();
        let err = s.apply(update.clone()).unwrap_err();
        assert!(err.is_user_facing(), "{update:?}");
        assert_eq!(s, StyleConfig::default(), "{update:?} must not stick");
    }
}

#[test]
fn apply_patch_is_all_or_nothing() {
    let mut s = StyleConfig::default();
    let patch = StylePatch {
        font_size: Some(40),
        line_height: Some(0.5),
        ..StylePatch::default()
    };
    assert!(s.apply_patch(&patch).is_err());
    assert_eq!(s.font_size, 32);

    let patch = StylePatch {
        font_size: Some(40),
        text_align: Some(TextAlign::Right),
        ..StylePatch::default()
    };
    s.apply_patch(&patch).unwrap();
    assert_eq!(s.font_size, 40);
    assert_eq!(s.text_align, TextAlign::Right);
}

#[test]
fn patch_json_is_snake_case_and_partial() {
    let patch: StylePatch = serde_json::from_str(
        r##"{"font_size": 36, "background_mode": "source_image", "text_color": "#333"}"##,
    )
    .unwrap();
    assert_eq!(patch.font_size, Some(36));
    assert_eq!(patch.background_mode, Some(BackgroundMode::SourceImage));
    assert_eq!(patch.text_color, Some(Rgb8::new(0x33, 0x33, 0x33)));
    assert_eq!(patch.updates().count(), 3);

    assert!(serde_json::from_str::<StylePatch>(r#"{"font_sz": 3}"#).is_err());
    assert!(StylePatch::default().is_empty());
}

#[test]
fn parse_accepts_control_encodings() {
    assert_eq!(
        StyleUpdate::parse("font-size", "40px").unwrap(),
        StyleUpdate::FontSize(40)
    );
    assert_eq!(
        StyleUpdate::parse("bg_opacity", "80%").unwrap(),
        StyleUpdate::BackgroundOpacity(0.8)
    );
    assert_eq!(
        StyleUpdate::parse("line_height", "1.6").unwrap(),
        StyleUpdate::LineHeight(1.6)
    );
    assert_eq!(
        StyleUpdate::parse("bg_type", "image").unwrap(),
        StyleUpdate::BackgroundMode(BackgroundMode::SourceImage)
    );
    assert_eq!(
        StyleUpdate::parse("format", "jpg").unwrap(),
        StyleUpdate::ExportFormat(ExportFormat::Jpeg)
    );
    assert_eq!(
        StyleUpdate::parse("align", "Right").unwrap(),
        StyleUpdate::TextAlign(TextAlign::Right)
    );
    assert_eq!(
        StyleUpdate::parse("caption", "Hello\\nWorld").unwrap(),
        StyleUpdate::CaptionText("Hello\nWorld".to_string())
    );
    assert!(StyleUpdate::parse("align", "justify").is_err());
    assert!(StyleUpdate::parse("colour", "#fff").is_err());
    assert!(StyleUpdate::parse("font_size", "big").is_err());
}

#[test]
fn only_caption_text_is_free_text() {
    assert!(StyleUpdate::CaptionText(String::new()).is_free_text());
    assert!(!StyleUpdate::FontSize(10).is_free_text());
}

#[test]
fn text_x_follows_alignment() {
    assert_eq!(TextAlign::Left.text_x(60.0, 1080.0, 100.0), 60.0);
    assert_eq!(TextAlign::Center.text_x(60.0, 1080.0, 100.0), 550.0);
    assert_eq!(TextAlign::Right.text_x(60.0, 1080.0, 100.0), 1040.0);
}

#[test]
fn export_format_names() {
    assert_eq!(ExportFormat::Png.file_name(), "captioned_image.png");
    assert_eq!(ExportFormat::Jpeg.file_name(), "captioned_image.jpg");
    assert_eq!(ExportFormat::Jpeg.mime_type(), "image/jpeg");
}
