//! Layer definitions for the template canvas.
//!
//! These are the persisted vocabulary every other component mutates:
//! text fields, the optional photo mask, and animation layers. All
//! coordinates are expressed in logical canvas units (see
//! [`crate::document::BASE_CANVAS`]), never in screen pixels.

mod animation;
mod field;
mod photo;

pub use animation::{AnimationLayer, AnimationPatch, LottieLayer};
pub use field::{with_field_updated, Align, Field, FieldLock, FieldPatch, FontStyle, Weight};
pub use photo::{photo_from_legacy, PhotoLayer, PhotoShape};

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable RGBA color, persisted as a CSS hex string (`#rrggbb` or
/// `#rrggbbaa`) to stay wire-compatible with historical documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    /// Parse a CSS hex color. Unknown or malformed input degrades to
    /// black rather than erroring, so normalization never fails on a
    /// hand-edited legacy document.
    pub fn from_hex(color: &str) -> Self {
        if let Some(hex) = color.trim().strip_prefix('#') {
            match hex.len() {
                3 => {
                    let r = u8::from_str_radix(&hex[0..1], 16).unwrap_or(0) * 17;
                    let g = u8::from_str_radix(&hex[1..2], 16).unwrap_or(0) * 17;
                    let b = u8::from_str_radix(&hex[2..3], 16).unwrap_or(0) * 17;
                    return Self::new(r, g, b, 255);
                }
                6 | 8 => {
                    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
                    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
                    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
                    let a = if hex.len() == 8 {
                        u8::from_str_radix(&hex[6..8], 16).unwrap_or(255)
                    } else {
                        255
                    };
                    return Self::new(r, g, b, a);
                }
                _ => {}
            }
        }
        Self::black()
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Rgba {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_hex(&s))
    }
}

impl From<Color> for Rgba {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<Rgba> for Color {
    fn from(color: Rgba) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let c = Rgba::from_hex("#48435c");
        assert_eq!(c, Rgba::new(0x48, 0x43, 0x5c, 255));
        assert_eq!(c.to_hex(), "#48435c");
    }

    #[test]
    fn test_short_hex() {
        assert_eq!(Rgba::from_hex("#fff"), Rgba::new(255, 255, 255, 255));
    }

    #[test]
    fn test_hex_with_alpha() {
        let c = Rgba::from_hex("#00000010");
        assert_eq!(c.a, 0x10);
        assert_eq!(c.to_hex(), "#00000010");
    }

    #[test]
    fn test_malformed_hex_degrades_to_black() {
        assert_eq!(Rgba::from_hex("tomato"), Rgba::black());
        assert_eq!(Rgba::from_hex("#zzzz"), Rgba::black());
    }

    #[test]
    fn test_peniko_conversion() {
        let c: Color = Rgba::new(10, 20, 30, 255).into();
        let back: Rgba = c.into();
        assert_eq!(back, Rgba::new(10, 20, 30, 255));
    }
}
