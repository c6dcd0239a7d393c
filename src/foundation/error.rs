/// Result type used across captionate.
pub type CaptionResult<T> = Result<T, CaptionError>;

/// Error taxonomy shared by the compositor, editor and exporters.
#[derive(thiserror::Error, Debug)]
pub enum CaptionError {
    /// A style value or control input outside its allowed range.
    #[error("validation error: {0}")]
    Validation(String),

    /// An upload whose MIME type is not one of the accepted image types.
    #[error("unsupported image type: {0}")]
    UnsupportedImage(String),

    /// Image bytes that could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// No usable font face, or font data that could not be loaded.
    #[error("font error: {0}")]
    Font(String),

    /// Surface allocation or drawing failures.
    #[error("render error: {0}")]
    Render(String),

    /// PNG or JPEG encoding failures.
    #[error("export error: {0}")]
    Export(String),

    /// An operation that needs an image was called before one was loaded.
    #[error("no image loaded")]
    NoImage,

    /// Wrapped lower-level error, usually IO with context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CaptionError {
    /// Build a [`CaptionError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CaptionError::UnsupportedImage`] value.
    pub fn unsupported_image(msg: impl Into<String>) -> Self {
        Self::UnsupportedImage(msg.into())
    }

    /// Build a [`CaptionError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`CaptionError::Font`] value.
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`CaptionError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`CaptionError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Whether the error is a user-facing rejection that leaves session state untouched.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::UnsupportedImage(_) | Self::NoImage
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
