use std::io::Cursor;

use image::ImageEncoder as _;

use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::surface::Surface;
use crate::style::config::ExportFormat;

/// Encoded image ready to hand to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Map a `[0, 1]` quality to the encoder's `1..=100` scale.
pub fn jpeg_quality(quality: f32) -> u8 {
    let q = if quality.is_finite() { quality } else { 0.9 };
    (q.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Encode `surface`. `quality` only affects JPEG.
#[tracing::instrument(skip(surface), fields(w = surface.width(), h = surface.height()))]
pub fn export(surface: &Surface, format: ExportFormat, quality: f32) -> CaptionResult<Vec<u8>> {
    let mut buf = Vec::new();
    match format {
        ExportFormat::Png => {
            let rgba = surface.to_rgba_image()?;
            image::codecs::png::PngEncoder::new(Cursor::new(&mut buf))
                .write_image(
                    rgba.as_raw(),
                    rgba.width(),
                    rgba.height(),
                    image::ExtendedColorType::Rgba8,
                )
                .map_err(|e| CaptionError::export(format!("png encode: {e}")))?;
        }
        ExportFormat::Jpeg => {
            // JPEG has no alpha; premultiplied channels are the image flattened over black.
            let rgb: Vec<u8> = surface
                .data()
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            image::codecs::jpeg::JpegEncoder::new_with_quality(
                Cursor::new(&mut buf),
                jpeg_quality(quality),
            )
            .write_image(
                &rgb,
                surface.width(),
                surface.height(),
                image::ExtendedColorType::Rgb8,
            )
            .map_err(|e| CaptionError::export(format!("jpeg encode: {e}")))?;
        }
    }
    tracing::debug!(bytes = buf.len(), ?format, "exported surface");
    Ok(buf)
}

/// Encode `surface` and name it `captioned_image.<ext>`.
pub fn download(surface: &Surface, format: ExportFormat, quality: f32) -> CaptionResult<Download> {
    Ok(Download {
        file_name: format.file_name(),
        mime_type: format.mime_type(),
        bytes: export(surface, format, quality)?,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/export/mod.rs"]
mod tests;
