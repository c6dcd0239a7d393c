//! Captionate composites caption bands onto still images.
//!
//! A caption is wrapped to a centered column, and the canvas is extended downward so that every
//! line past the first gets its own band below the image. Bands are filled either with a solid
//! color or with a clean strip sampled from the image itself, and the result is exported as PNG
//! or JPEG.
//!
//! # Pipeline overview
//!
//! 1. **Decode**: encoded bytes -> [`SourceImage`] (straight RGBA8)
//! 2. **Layout**: [`StyleConfig`] + image size + font metrics -> [`CaptionLayout`]
//! 3. **Composite**: scaled image, bands and text into a premultiplied [`Surface`]
//! 4. **Export**: [`Surface`] -> PNG/JPEG bytes
//!
//! [`Editor`] wraps these steps in an interactive session with debounced caption input,
//! presets and reset. [`serve`] is a small static file server for hosting a front end.
//!
//! Pixels are premultiplied RGBA8 from compositing until export.
#![forbid(unsafe_code)]

mod assets;
mod editor;
mod export;
mod foundation;
mod render;
mod style;
mod text;

/// Tracing subscriber setup for binaries.
pub mod logging;
/// Static file delivery over HTTP.
pub mod serve;

pub use assets::decode::{ImageMime, SourceImage, decode_image};
pub use editor::debounce::Debouncer;
pub use editor::{CAPTION_DEBOUNCE, Editor};
pub use export::{Download, download, export, jpeg_quality};
pub use foundation::color::Rgb8;
pub use foundation::error::{CaptionError, CaptionResult};
pub use foundation::geom::{
    MAX_DISPLAY_WIDTH, Point, Rect, Size, cover_fit, display_scale, pixel_bounds, scaled_size,
};
pub use render::composite::{PremulRgba8, over, over_in_place, premultiply, unpremultiply};
pub use render::compositor::{CaptionLayout, Rendered, draw_background, layout_caption, render, render_into};
pub use render::placeholder::{
    PLACEHOLDER_FILL, PLACEHOLDER_HEIGHT, PLACEHOLDER_WIDTH, PROMPT_COLOR, PROMPT_SIZE_PX,
    PROMPT_TEXT, draw_placeholder,
};
pub use render::surface::{MAX_SURFACE_DIM, Region, Surface};
pub use style::config::{
    BackgroundMode, DEFAULT_FONT_FAMILY, ExportFormat, StyleConfig, StylePatch, StyleUpdate,
    TextAlign,
};
pub use style::presets::{Preset, preset, presets};
pub use text::face::{BlockFace, CaptionFace, FaceProvider, SizedFace};
pub use text::fonts::{FontBook, FontFace, TextBrushRgba8};
pub use text::wrap::{Measure, wrap};
