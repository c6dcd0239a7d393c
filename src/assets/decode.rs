use std::path::Path;
use std::sync::Arc;

use crate::foundation::error::{CaptionError, CaptionResult};

/// Upload formats the editor accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageMime {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageMime {
    pub const ALL: [Self; 4] = [Self::Jpeg, Self::Png, Self::Gif, Self::Webp];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }

    /// Validate a declared MIME type such as a browser would attach to a file.
    pub fn from_mime(mime: &str) -> CaptionResult<Self> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == essence)
            .ok_or_else(|| {
                CaptionError::unsupported_image(format!(
                    "'{mime}' (supported: JPG, PNG, GIF, WebP)"
                ))
            })
    }

    /// MIME type implied by a file name's extension.
    pub fn from_path(path: &Path) -> CaptionResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "gif" => Ok(Self::Gif),
            "webp" => Ok(Self::Webp),
            _ => Err(CaptionError::unsupported_image(format!(
                "'{}' (supported: JPG, PNG, GIF, WebP)",
                path.display()
            ))),
        }
    }

    /// MIME type sniffed from the leading bytes of an encoded image.
    pub fn sniff(bytes: &[u8]) -> CaptionResult<Self> {
        let format = image::guess_format(bytes)
            .map_err(|_| CaptionError::unsupported_image("unrecognized image data"))?;
        match format {
            image::ImageFormat::Jpeg => Ok(Self::Jpeg),
            image::ImageFormat::Png => Ok(Self::Png),
            image::ImageFormat::Gif => Ok(Self::Gif),
            image::ImageFormat::WebP => Ok(Self::Webp),
            other => Err(CaptionError::unsupported_image(format!(
                "'{}' (supported: JPG, PNG, GIF, WebP)",
                other.to_mime_type()
            ))),
        }
    }
}

/// Decoded upload: straight-alpha RGBA8 pixels plus intrinsic size.
///
/// Cloning is cheap; the pixel buffer is shared and never mutated.
#[derive(Clone, Debug)]
pub struct SourceImage {
    pixels: Arc<image::RgbaImage>,
}

impl SourceImage {
    pub fn from_rgba(pixels: image::RgbaImage) -> CaptionResult<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(CaptionError::decode("image has zero width or height"));
        }
        Ok(Self {
            pixels: Arc::new(pixels),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &image::RgbaImage {
        &self.pixels
    }

    /// Resample to exactly `width` x `height`. Returns the original buffer when the size matches.
    pub fn resized(&self, width: u32, height: u32) -> image::RgbaImage {
        if width == self.width() && height == self.height() {
            return self.pixels.as_ref().clone();
        }
        image::imageops::resize(
            self.pixels.as_ref(),
            width.max(1),
            height.max(1),
            image::imageops::FilterType::Triangle,
        )
    }
}

/// Decode encoded image bytes (first frame for animated formats).
pub fn decode_image(bytes: &[u8]) -> CaptionResult<SourceImage> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| CaptionError::decode(format!("decode image from memory: {e}")))?;
    SourceImage::from_rgba(dyn_img.to_rgba8())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
