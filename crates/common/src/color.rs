use serde::{Deserialize, Serialize};

/// Errors from parsing color strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("invalid hex color: {0:?}")]
    InvalidHex(String),
    #[error("unknown color name: {0:?}")]
    UnknownName(String),
}

/// CSS named colors the scene config accepts, as sRGB hex.
const NAMED: &[(&str, u32)] = &[
    ("black", 0x000000),
    ("white", 0xffffff),
    ("red", 0xff0000),
    ("green", 0x008000),
    ("lime", 0x00ff00),
    ("blue", 0x0000ff),
    ("royalblue", 0x4169e1),
    ("skyblue", 0x87ceeb),
    ("gray", 0x808080),
    ("grey", 0x808080),
    ("orange", 0xffa500),
    ("yellow", 0xffff00),
    ("hotpink", 0xff69b4),
];

/// Linear-space RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::linear(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::linear(0.0, 0.0, 0.0);

    pub const fn linear(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Build from a packed sRGB value such as `0x4169e1`, converting to linear.
    pub fn from_hex(hex: u32) -> Self {
        let [_, r, g, b] = hex.to_be_bytes();
        Self {
            r: srgb_to_linear(r),
            g: srgb_to_linear(g),
            b: srgb_to_linear(b),
            a: 1.0,
        }
    }

    /// Parse `#rrggbb`, `0xrrggbb` or a CSS color name (case-insensitive).
    pub fn parse(s: &str) -> Result<Self, ColorError> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"));
        if let Some(digits) = digits {
            if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(ColorError::InvalidHex(s.to_string()));
            }
            return u32::from_str_radix(digits, 16)
                .map(Self::from_hex)
                .map_err(|_| ColorError::InvalidHex(s.to_string()));
        }

        let lower = trimmed.to_ascii_lowercase();
        NAMED
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, hex)| Self::from_hex(*hex))
            .ok_or_else(|| ColorError::UnknownName(s.to_string()))
    }

    /// Multiply the RGB channels by `k`, keeping alpha.
    pub fn scaled(self, k: f32) -> Self {
        Self {
            r: self.r * k,
            g: self.g * k,
            b: self.b * k,
            a: self.a,
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Gamma-encoded 8-bit channels, for UI swatches.
    pub fn to_srgb_bytes(self) -> [u8; 3] {
        [
            linear_to_srgb(self.r),
            linear_to_srgb(self.g),
            linear_to_srgb(self.b),
        ]
    }
}

fn srgb_to_linear(c: u8) -> f32 {
    let c = c as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> u8 {
    let c = c.clamp(0.0, 1.0);
    let s = if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    (s * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_and_hex_agree() {
        let named = Color::parse("RoyalBlue").unwrap();
        let hex = Color::parse("#4169e1").unwrap();
        let prefixed = Color::parse("0x4169E1").unwrap();
        assert_eq!(named, hex);
        assert_eq!(hex, prefixed);
    }

    #[test]
    fn extremes_survive_conversion() {
        assert_eq!(Color::from_hex(0xffffff), Color::WHITE);
        assert_eq!(Color::from_hex(0x000000), Color::BLACK);
    }

    #[test]
    fn srgb_round_trip_for_royalblue() {
        let c = Color::from_hex(0x4169e1);
        assert_eq!(c.to_srgb_bytes(), [0x41, 0x69, 0xe1]);
        // Linear values sit below the gamma-encoded ones.
        assert!(c.r < 0x41 as f32 / 255.0);
    }

    #[test]
    fn bad_inputs_are_rejected() {
        assert_eq!(
            Color::parse("#12345"),
            Err(ColorError::InvalidHex("#12345".into()))
        );
        assert!(matches!(
            Color::parse("#zzzzzz"),
            Err(ColorError::InvalidHex(_))
        ));
        assert_eq!(
            Color::parse("#+12345"),
            Err(ColorError::InvalidHex("#+12345".into()))
        );
        assert!(Color::parse("0x-12345").is_err());
        assert_eq!(
            Color::parse("chartreuse"),
            Err(ColorError::UnknownName("chartreuse".into()))
        );
    }

    #[test]
    fn scaled_keeps_alpha() {
        let c = Color::WHITE.scaled(0.5);
        assert_eq!(c.to_array(), [0.5, 0.5, 0.5, 1.0]);
    }
}
