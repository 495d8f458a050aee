//! Color helpers for snake skins
//!
//! Colors travel as `#rrggbb` strings on the wire (token colors) and are
//! parsed into [`Rgb`] for luminosity shifts.

use std::fmt;

use rand::Rng;

use crate::error::{ClientError, Result};

/// Palette snake main colors are drawn from
pub const PALETTE: [Rgb; 14] = [
    Rgb::new(0xC0, 0x39, 0x2B),
    Rgb::new(0xE7, 0x4C, 0x3C),
    Rgb::new(0x9B, 0x59, 0xB6),
    Rgb::new(0x8E, 0x44, 0xAD),
    Rgb::new(0x29, 0x80, 0xB9),
    Rgb::new(0x34, 0x98, 0xDB),
    Rgb::new(0x17, 0xA5, 0x89),
    Rgb::new(0x13, 0x8D, 0x75),
    Rgb::new(0x22, 0x99, 0x54),
    Rgb::new(0x28, 0xB4, 0x63),
    Rgb::new(0xD4, 0xAC, 0x0D),
    Rgb::new(0xD6, 0x89, 0x10),
    Rgb::new(0xCA, 0x6F, 0x1E),
    Rgb::new(0xBA, 0x4A, 0x00),
];

/// Luminosity shift applied main -> mid and mid -> support
const SKIN_LUMINOSITY: f32 = 0.33;

/// An opaque sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const WHITESMOKE: Rgb = Rgb::new(0xF5, 0xF5, 0xF5);
    pub const GRASS: Rgb = Rgb::new(0x90, 0xC5, 0x42);
    pub const BORDER: Rgb = Rgb::new(0x33, 0x33, 0x33);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb` / `#rrggbb` (the leading `#` is optional)
    pub fn from_hex(s: &str) -> Result<Self> {
        let digits: String = s.chars().filter(|c| c.is_ascii_hexdigit()).collect();
        let expanded = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
            6 => digits,
            _ => return Err(ClientError::InvalidColor(s.to_string())),
        };
        let channel = |i: usize| {
            u8::from_str_radix(&expanded[i * 2..i * 2 + 2], 16)
                .map_err(|_| ClientError::InvalidColor(s.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(1)?, channel(2)?))
    }

    /// Scale each channel by `1 + lum`, clamped to 0..=255
    pub fn adjust_luminosity(self, lum: f32) -> Self {
        let shift = |c: u8| {
            let c = c as f32;
            (c + c * lum).clamp(0.0, 255.0).round() as u8
        };
        Self::new(shift(self.r), shift(self.g), shift(self.b))
    }

    pub fn to_hex(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Pick a palette color
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Rgb {
    PALETTE[rng.random_range(0..PALETTE.len())]
}

/// Three derived display colors of a snake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnakeColors {
    /// Outline ring
    pub main: Rgb,
    /// Gradient edge
    pub mid: Rgb,
    /// Gradient highlight
    pub support: Rgb,
}

impl SnakeColors {
    pub fn from_main(main: Rgb) -> Self {
        let mid = main.adjust_luminosity(SKIN_LUMINOSITY);
        let support = mid.adjust_luminosity(SKIN_LUMINOSITY);
        Self { main, mid, support }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_main(random_color(rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_hex_round_trip_and_shorthand() {
        assert_eq!(Rgb::from_hex("#C0392B").unwrap(), Rgb::new(0xC0, 0x39, 0x2B));
        assert_eq!(Rgb::from_hex("fa0").unwrap(), Rgb::new(0xFF, 0xAA, 0x00));
        assert_eq!(Rgb::new(0x0A, 0xB0, 0xFF).to_hex(), "#0ab0ff");
        assert!(Rgb::from_hex("#12").is_err());
    }

    #[test]
    fn test_adjust_luminosity_clamps() {
        let c = Rgb::from_hex("#C0392B").unwrap().adjust_luminosity(0.33);
        // 192 * 1.33 saturates, 57 -> 76, 43 -> 57
        assert_eq!(c, Rgb::new(255, 76, 57));
        assert_eq!(Rgb::WHITE.adjust_luminosity(-1.0), Rgb::BLACK);
    }

    #[test]
    fn test_snake_colors_derived_from_palette() {
        let mut rng = Pcg32::seed_from_u64(7);
        let colors = SnakeColors::random(&mut rng);
        assert!(PALETTE.contains(&colors.main));
        assert_eq!(colors.mid, colors.main.adjust_luminosity(0.33));
        assert_eq!(colors.support, colors.mid.adjust_luminosity(0.33));
    }
}
