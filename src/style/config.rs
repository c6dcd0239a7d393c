use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::color::Rgb8;
use crate::foundation::error::{CaptionError, CaptionResult};

/// Family requested when a style does not name one.
pub const DEFAULT_FONT_FAMILY: &str = "Microsoft YaHei";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundMode {
    /// Band filled with `background_color` at `background_opacity`.
    #[default]
    Solid,
    /// Band filled with a clean strip sampled from the scaled source image.
    SourceImage,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    /// Left edge of a `text_width` run placed inside a band starting at `band_left`.
    pub fn text_x(self, band_left: f64, band_width: f64, text_width: f64) -> f64 {
        match self {
            Self::Left => band_left,
            Self::Center => band_left + (band_width - text_width) / 2.0,
            Self::Right => band_left + band_width - text_width,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Download name offered for a surface exported in this format.
    pub fn file_name(self) -> String {
        format!("captioned_image.{}", self.extension())
    }
}

/// Every user-adjustable rendering parameter.
///
/// A `StyleConfig` is a plain value: each render call receives one by reference and never
/// mutates it. Session code changes it only through [`StyleConfig::apply`] and
/// [`StyleConfig::apply_patch`], both of which validate before committing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Caption text; `\n` forces a line break.
    pub caption_text: String,
    /// Font size in pixels.
    pub font_size: u32,
    pub font_family: String,
    pub text_color: Rgb8,
    pub background_mode: BackgroundMode,
    pub background_color: Rgb8,
    /// Band opacity in `[0, 1]`.
    pub background_opacity: f32,
    /// Band width as a fraction of the scaled image width, in `(0, 1]`.
    pub caption_width: f32,
    /// Kept with the style but not used by the layout.
    pub bottom_padding: u32,
    /// Line height as a multiple of the font size, `> 1`.
    pub line_height: f32,
    pub text_align: TextAlign,
    pub export_format: ExportFormat,
    /// JPEG quality in `[0, 1]`; ignored for PNG.
    pub export_quality: f32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            caption_text: String::new(),
            font_size: 32,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            text_color: Rgb8::WHITE,
            background_mode: BackgroundMode::Solid,
            background_color: Rgb8::BLACK,
            background_opacity: 0.75,
            caption_width: 0.9,
            bottom_padding: 0,
            line_height: 1.4,
            text_align: TextAlign::Center,
            export_format: ExportFormat::Png,
            export_quality: 0.9,
        }
    }
}

impl StyleConfig {
    pub fn validate(&self) -> CaptionResult<()> {
        if self.font_size == 0 {
            return Err(CaptionError::validation("font_size must be > 0"));
        }
        if self.font_family.trim().is_empty() {
            return Err(CaptionError::validation("font_family must be non-empty"));
        }
        unit_interval("background_opacity", self.background_opacity)?;
        unit_interval("export_quality", self.export_quality)?;
        if !self.caption_width.is_finite() || self.caption_width <= 0.0 || self.caption_width > 1.0
        {
            return Err(CaptionError::validation("caption_width must be in (0, 1]"));
        }
        if !self.line_height.is_finite() || self.line_height <= 1.0 {
            return Err(CaptionError::validation("line_height must be > 1"));
        }
        Ok(())
    }

    /// Pixel height of one caption band.
    pub fn line_height_px(&self) -> f64 {
        f64::from(self.font_size) * f64::from(self.line_height)
    }

    /// Whether the caption has anything besides whitespace to draw.
    pub fn has_caption(&self) -> bool {
        !self.caption_text.trim().is_empty()
    }

    /// Apply a single-field update. The style is left untouched if the result would be invalid.
    pub fn apply(&mut self, update: StyleUpdate) -> CaptionResult<()> {
        let mut next = self.clone();
        next.set(update);
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Apply every field of `patch` at once. Either all fields land or none do.
    pub fn apply_patch(&mut self, patch: &StylePatch) -> CaptionResult<()> {
        let mut next = self.clone();
        for update in patch.updates() {
            next.set(update);
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    fn set(&mut self, update: StyleUpdate) {
        match update {
            StyleUpdate::CaptionText(v) => self.caption_text = v,
            StyleUpdate::FontSize(v) => self.font_size = v,
            StyleUpdate::FontFamily(v) => self.font_family = v,
            StyleUpdate::TextColor(v) => self.text_color = v,
            StyleUpdate::BackgroundMode(v) => self.background_mode = v,
            StyleUpdate::BackgroundColor(v) => self.background_color = v,
            StyleUpdate::BackgroundOpacity(v) => self.background_opacity = v,
            StyleUpdate::CaptionWidth(v) => self.caption_width = v,
            StyleUpdate::BottomPadding(v) => self.bottom_padding = v,
            StyleUpdate::LineHeight(v) => self.line_height = v,
            StyleUpdate::TextAlign(v) => self.text_align = v,
            StyleUpdate::ExportFormat(v) => self.export_format = v,
            StyleUpdate::ExportQuality(v) => self.export_quality = v,
        }
    }
}

fn unit_interval(name: &str, v: f32) -> CaptionResult<()> {
    if !v.is_finite() || !(0.0..=1.0).contains(&v) {
        return Err(CaptionError::validation(format!("{name} must be in [0, 1]")));
    }
    Ok(())
}

/// One control's worth of change to a [`StyleConfig`].
#[derive(Clone, Debug, PartialEq)]
pub enum StyleUpdate {
    CaptionText(String),
    FontSize(u32),
    FontFamily(String),
    TextColor(Rgb8),
    BackgroundMode(BackgroundMode),
    BackgroundColor(Rgb8),
    BackgroundOpacity(f32),
    CaptionWidth(f32),
    BottomPadding(u32),
    LineHeight(f32),
    TextAlign(TextAlign),
    ExportFormat(ExportFormat),
    ExportQuality(f32),
}

impl StyleUpdate {
    /// Parse a `key value` pair as typed into a control.
    ///
    /// Fractions accept either `0.75` or `75%`. Pixel sizes accept an optional `px` suffix.
    pub fn parse(key: &str, value: &str) -> CaptionResult<Self> {
        let value = value.trim();
        let update = match normalize_key(key).as_str() {
            "caption_text" | "caption" | "text" => Self::CaptionText(value.replace("\\n", "\n")),
            "font_size" => Self::FontSize(parse_px(key, value)?),
            "font_family" | "font" => Self::FontFamily(value.to_string()),
            "text_color" => Self::TextColor(Rgb8::parse_hex(value)?),
            "background_mode" | "bg_mode" | "bg_type" => Self::BackgroundMode(parse_enum(key, value)?),
            "background_color" | "bg_color" => Self::BackgroundColor(Rgb8::parse_hex(value)?),
            "background_opacity" | "bg_opacity" => {
                Self::BackgroundOpacity(parse_fraction(key, value)?)
            }
            "caption_width" => Self::CaptionWidth(parse_fraction(key, value)?),
            "bottom_padding" => Self::BottomPadding(parse_px(key, value)?),
            "line_height" => Self::LineHeight(parse_fraction(key, value)?),
            "text_align" | "align" => Self::TextAlign(parse_enum(key, value)?),
            "export_format" | "format" => Self::ExportFormat(parse_enum(key, value)?),
            "export_quality" | "quality" => Self::ExportQuality(parse_fraction(key, value)?),
            _ => {
                return Err(CaptionError::validation(format!(
                    "unknown style field '{key}'"
                )));
            }
        };
        Ok(update)
    }

    /// Free-text controls are coalesced before rendering; everything else renders at once.
    pub fn is_free_text(&self) -> bool {
        matches!(self, Self::CaptionText(_))
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase().replace('-', "_")
}

fn parse_px(key: &str, value: &str) -> CaptionResult<u32> {
    let digits = value.strip_suffix("px").unwrap_or(value).trim();
    digits
        .parse::<u32>()
        .map_err(|_| CaptionError::validation(format!("{key}: expected whole pixels, got '{value}'")))
}

fn parse_fraction(key: &str, value: &str) -> CaptionResult<f32> {
    let parsed = match value.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f32>().map(|p| p / 100.0),
        None => value.parse::<f32>(),
    };
    parsed.map_err(|_| CaptionError::validation(format!("{key}: expected a number, got '{value}'")))
}

fn parse_enum<T: serde::de::DeserializeOwned>(key: &str, value: &str) -> CaptionResult<T> {
    let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
    let normalized = match normalized.as_str() {
        "color" => "solid".to_string(),
        "image" => "source_image".to_string(),
        "jpg" => "jpeg".to_string(),
        _ => normalized,
    };
    serde_json::from_value(serde_json::Value::String(normalized))
        .map_err(|_| CaptionError::validation(format!("{key}: unsupported value '{value}'")))
}

/// A partial [`StyleConfig`]; every present field is applied together.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StylePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<Rgb8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_mode: Option<BackgroundMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Rgb8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_opacity: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom_padding: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_format: Option<ExportFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_quality: Option<f32>,
}

impl StylePatch {
    /// Read a JSON style file.
    pub fn from_path(path: &Path) -> CaptionResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read style file '{}'", path.display()))?;
        let patch: Self = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse style file '{}'", path.display()))?;
        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.updates().next().is_none()
    }

    /// Present fields as individual updates, in declaration order.
    pub fn updates(&self) -> impl Iterator<Item = StyleUpdate> + '_ {
        [
            self.caption_text.clone().map(StyleUpdate::CaptionText),
            self.font_size.map(StyleUpdate::FontSize),
            self.font_family.clone().map(StyleUpdate::FontFamily),
            self.text_color.map(StyleUpdate::TextColor),
            self.background_mode.map(StyleUpdate::BackgroundMode),
            self.background_color.map(StyleUpdate::BackgroundColor),
            self.background_opacity.map(StyleUpdate::BackgroundOpacity),
            self.caption_width.map(StyleUpdate::CaptionWidth),
            self.bottom_padding.map(StyleUpdate::BottomPadding),
            self.line_height.map(StyleUpdate::LineHeight),
            self.text_align.map(StyleUpdate::TextAlign),
            self.export_format.map(StyleUpdate::ExportFormat),
            self.export_quality.map(StyleUpdate::ExportQuality),
        ]
        .into_iter()
        .flatten()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/config.rs"]
mod tests;
