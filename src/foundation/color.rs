use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{CaptionError, CaptionResult};

/// Opaque sRGB color as written in style files (`#RRGGBB` or `#RGB`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff);
    pub const BLACK: Self = Self::new(0x00, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a CSS-style hex color. The leading `#` is optional.
    pub fn parse_hex(s: &str) -> CaptionResult<Self> {
        let s = s.trim();
        let digits = s.strip_prefix('#').unwrap_or(s);

        fn hex_byte(pair: &str) -> CaptionResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| CaptionError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        if !digits.is_ascii() {
            return Err(CaptionError::validation(format!(
                "hex color \"{s}\" must be ASCII"
            )));
        }

        match digits.len() {
            6 => Ok(Self::new(
                hex_byte(&digits[0..2])?,
                hex_byte(&digits[2..4])?,
                hex_byte(&digits[4..6])?,
            )),
            3 => {
                let nibble = |i: usize| -> CaptionResult<u8> {
                    let v = hex_byte(&digits[i..i + 1])?;
                    Ok(v * 17)
                };
                Ok(Self::new(nibble(0)?, nibble(1)?, nibble(2)?))
            }
            _ => Err(CaptionError::validation(format!(
                "hex color \"{s}\" must be #RRGGBB or #RGB"
            ))),
        }
    }

    /// Straight-alpha RGBA with `opacity` in `[0, 1]` mapped to the alpha channel.
    pub fn with_opacity(self, opacity: f32) -> [u8; 4] {
        [self.r, self.g, self.b, opacity_to_u8(opacity)]
    }

    /// Premultiplied RGBA for direct writes into a surface.
    pub fn premul_with_opacity(self, opacity: f32) -> [u8; 4] {
        let a = opacity_to_u8(opacity);
        let a16 = u16::from(a);
        let premul = |c: u8| -> u8 { ((u16::from(c) * a16 + 127) / 255) as u8 };
        [premul(self.r), premul(self.g), premul(self.b), a]
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

fn opacity_to_u8(opacity: f32) -> u8 {
    if !opacity.is_finite() {
        return 255;
    }
    (opacity.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb8 {
    type Err = CaptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl Serialize for Rgb8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
