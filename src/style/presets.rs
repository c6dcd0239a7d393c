use crate::foundation::color::Rgb8;
use crate::foundation::error::{CaptionError, CaptionResult};
use crate::style::config::{StylePatch, TextAlign};

/// A named bundle of style overrides applied in one step.
#[derive(Clone, Debug, PartialEq)]
pub struct Preset {
    pub name: &'static str,
    pub patch: StylePatch,
}

/// Built-in presets, in display order.
pub fn presets() -> Vec<Preset> {
    vec![
        Preset {
            name: "classic",
            patch: banner(28, Rgb8::WHITE, Rgb8::BLACK, 0.8, TextAlign::Center),
        },
        Preset {
            name: "bold",
            patch: banner(
                36,
                Rgb8::WHITE,
                Rgb8::new(0x33, 0x33, 0x33),
                0.9,
                TextAlign::Left,
            ),
        },
        Preset {
            name: "light",
            patch: banner(24, Rgb8::BLACK, Rgb8::WHITE, 0.95, TextAlign::Center),
        },
    ]
}

/// Look up a built-in preset by name, ignoring case.
pub fn preset(name: &str) -> CaptionResult<Preset> {
    let wanted = name.trim();
    presets()
        .into_iter()
        .find(|p| p.name.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| {
            let known: Vec<&str> = presets().iter().map(|p| p.name).collect();
            CaptionError::validation(format!(
                "unknown preset '{wanted}' (known: {})",
                known.join(", ")
            ))
        })
}

fn banner(
    font_size: u32,
    text_color: Rgb8,
    background_color: Rgb8,
    background_opacity: f32,
    text_align: TextAlign,
) -> StylePatch {
    StylePatch {
        font_size: Some(font_size),
        text_color: Some(text_color),
        background_color: Some(background_color),
        background_opacity: Some(background_opacity),
        text_align: Some(text_align),
        ..StylePatch::default()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/presets.rs"]
mod tests;
