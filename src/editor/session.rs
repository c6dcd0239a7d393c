use std::time::{Duration, Instant};

use crate::assets::decode::{ImageMime, SourceImage, decode_image};
use crate::editor::debounce::Debouncer;
use crate::export::{self, Download};
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::compositor::{CaptionLayout, Rendered, render};
use crate::render::placeholder::{PLACEHOLDER_HEIGHT, PLACEHOLDER_WIDTH, draw_placeholder};
use crate::render::surface::Surface;
use crate::style::config::{StylePatch, StyleConfig, StyleUpdate};
use crate::style::presets;
use crate::text::face::FaceProvider;

/// Quiet period before a typed caption is rendered.
pub const CAPTION_DEBOUNCE: Duration = Duration::from_millis(100);

/// One editing session: the current style, the loaded image and the surface showing them.
///
/// Discrete controls re-render immediately. Caption typing goes through a debouncer and only
/// renders once input has been quiet for [`CAPTION_DEBOUNCE`]; drive it with [`Editor::tick`].
pub struct Editor {
    style: StyleConfig,
    image: Option<SourceImage>,
    surface: Surface,
    layout: Option<CaptionLayout>,
    fonts: Box<dyn FaceProvider>,
    caption: Debouncer<String>,
    renders: u64,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("style", &self.style)
            .field("has_image", &self.image.is_some())
            .field("surface", &self.surface)
            .field("caption_pending", &self.caption.is_pending())
            .field("renders", &self.renders)
            .finish()
    }
}

impl Editor {
    /// Start an empty session showing the placeholder.
    pub fn new(fonts: Box<dyn FaceProvider>) -> CaptionResult<Self> {
        let mut editor = Self {
            style: StyleConfig::default(),
            image: None,
            surface: Surface::new(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT)?,
            layout: None,
            fonts,
            caption: Debouncer::new(CAPTION_DEBOUNCE),
            renders: 0,
        };
        draw_placeholder(&mut editor.surface, editor.fonts.as_mut())?;
        Ok(editor)
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn image(&self) -> Option<&SourceImage> {
        self.image.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Layout of the last successful render; cleared on reset.
    pub fn layout(&self) -> Option<&CaptionLayout> {
        self.layout.as_ref()
    }

    pub fn caption_pending(&self) -> bool {
        self.caption.is_pending()
    }

    /// Number of composites performed so far.
    pub fn render_count(&self) -> u64 {
        self.renders
    }

    /// Accept an uploaded file. The declared MIME type is checked before any decoding.
    ///
    /// On error nothing about the session changes.
    pub fn upload(&mut self, bytes: &[u8], mime: &str) -> CaptionResult<()> {
        let mime = ImageMime::from_mime(mime)?;
        let image = decode_image(bytes)?;
        tracing::info!(
            mime = mime.as_str(),
            width = image.width(),
            height = image.height(),
            "image uploaded"
        );
        self.on_decoded(image)
    }

    /// Render a decoded image once and make it the current image.
    ///
    /// If the render fails the previous image and surface stay in place.
    pub fn on_decoded(&mut self, image: SourceImage) -> CaptionResult<()> {
        self.composite(&image)?;
        self.image = Some(image);
        Ok(())
    }

    /// Apply one control change and re-render.
    pub fn update(&mut self, update: StyleUpdate) -> CaptionResult<()> {
        if update.is_free_text() {
            self.caption.clear();
        }
        self.restyle(|style| style.apply(update))
    }

    /// Record typed caption text; it is applied by [`Editor::tick`] after the quiet period.
    pub fn update_caption_debounced(&mut self, text: impl Into<String>, now: Instant) {
        self.caption.schedule(text.into(), now);
    }

    /// Apply a settled caption, if any. Returns whether a render happened.
    pub fn tick(&mut self, now: Instant) -> CaptionResult<bool> {
        match self.caption.ready(now) {
            Some(text) => self.commit_caption(text),
            None => Ok(false),
        }
    }

    /// Apply a pending caption immediately.
    pub fn flush_pending(&mut self) -> CaptionResult<bool> {
        match self.caption.flush() {
            Some(text) => self.commit_caption(text),
            None => Ok(false),
        }
    }

    fn commit_caption(&mut self, text: String) -> CaptionResult<bool> {
        self.restyle(|style| style.apply(StyleUpdate::CaptionText(text)))?;
        Ok(true)
    }

    /// Apply a built-in preset atomically, then render.
    pub fn apply_preset(&mut self, name: &str) -> CaptionResult<()> {
        let preset = presets::preset(name)?;
        tracing::debug!(preset = preset.name, "applying preset");
        self.apply_patch(&preset.patch)
    }

    pub fn apply_patch(&mut self, patch: &StylePatch) -> CaptionResult<()> {
        self.restyle(|style| style.apply_patch(patch))
    }

    /// Recomposite the loaded image. Does nothing when no image is loaded.
    pub fn render(&mut self) -> CaptionResult<()> {
        let Some(image) = self.image.clone() else {
            return Ok(());
        };
        self.composite(&image)
    }

    /// Change the style and re-render, restoring the previous style if the render fails.
    fn restyle<F>(&mut self, change: F) -> CaptionResult<()>
    where
        F: FnOnce(&mut StyleConfig) -> CaptionResult<()>,
    {
        let previous = self.style.clone();
        change(&mut self.style)?;
        if let Err(err) = self.render() {
            self.style = previous;
            return Err(err);
        }
        Ok(())
    }

    // A failed render leaves the shown surface and layout untouched.
    fn composite(&mut self, image: &SourceImage) -> CaptionResult<()> {
        let Rendered { surface, layout } = render(image, &self.style, self.fonts.as_mut())?;
        self.surface = surface;
        self.layout = Some(layout);
        self.renders += 1;
        Ok(())
    }

    /// Encode the current surface with the configured export settings.
    pub fn download(&self) -> CaptionResult<Download> {
        if self.image.is_none() {
            return Err(CaptionError::NoImage);
        }
        export::download(
            &self.surface,
            self.style.export_format,
            self.style.export_quality,
        )
    }

    /// Return to defaults: no image, default style, placeholder surface. Never fails.
    pub fn reset(&mut self) {
        self.style = StyleConfig::default();
        self.image = None;
        self.layout = None;
        self.caption.clear();

        let Err(err) = draw_placeholder(&mut self.surface, self.fonts.as_mut()) else {
            tracing::info!("session reset");
            return;
        };
        tracing::warn!(%err, "placeholder redraw failed, reacquiring surface");
        let fresh = Surface::new(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT).and_then(|mut surface| {
            draw_placeholder(&mut surface, self.fonts.as_mut())?;
            Ok(surface)
        });
        match fresh {
            Ok(surface) => self.surface = surface,
            Err(err) => tracing::error!(%err, "surface reinitialization failed"),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/session.rs"]
mod tests;
