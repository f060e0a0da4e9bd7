use std::fmt::Display;

use ratatui::style::Color;

/// A 24-bit color as stored in the `pencolor` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Names understood in addition to `#rgb` / `#rrggbb`.
const NAMED: [(&str, Rgb); 18] = [
    ("black", Rgb::new(0x00, 0x00, 0x00)),
    ("white", Rgb::new(0xff, 0xff, 0xff)),
    ("red", Rgb::new(0xff, 0x00, 0x00)),
    ("darkred", Rgb::new(0x8b, 0x00, 0x00)),
    ("green", Rgb::new(0x00, 0x80, 0x00)),
    ("darkgreen", Rgb::new(0x00, 0x64, 0x00)),
    ("lime", Rgb::new(0x00, 0xff, 0x00)),
    ("blue", Rgb::new(0x00, 0x00, 0xff)),
    ("darkblue", Rgb::new(0x00, 0x00, 0x8b)),
    ("yellow", Rgb::new(0xff, 0xff, 0x00)),
    ("cyan", Rgb::new(0x00, 0xff, 0xff)),
    ("magenta", Rgb::new(0xff, 0x00, 0xff)),
    ("gray", Rgb::new(0x80, 0x80, 0x80)),
    ("grey", Rgb::new(0x80, 0x80, 0x80)),
    ("lightgray", Rgb::new(0xd3, 0xd3, 0xd3)),
    ("orange", Rgb::new(0xff, 0xa5, 0x00)),
    ("purple", Rgb::new(0x80, 0x00, 0x80)),
    ("brown", Rgb::new(0xa5, 0x2a, 0x2a)),
];

/// Swatches offered by the color dialog.
pub const BASIC_COLORS: [Rgb; 16] = [
    Rgb::new(0x00, 0x00, 0x00),
    Rgb::new(0x80, 0x80, 0x80),
    Rgb::new(0xc0, 0xc0, 0xc0),
    Rgb::new(0xff, 0xff, 0xff),
    Rgb::new(0x80, 0x00, 0x00),
    Rgb::new(0xff, 0x00, 0x00),
    Rgb::new(0xff, 0xa5, 0x00),
    Rgb::new(0xff, 0xff, 0x00),
    Rgb::new(0x00, 0x80, 0x00),
    Rgb::new(0x00, 0xff, 0x00),
    Rgb::new(0x00, 0x80, 0x80),
    Rgb::new(0x00, 0xff, 0xff),
    Rgb::new(0x00, 0x00, 0x80),
    Rgb::new(0x00, 0x00, 0xff),
    Rgb::new(0x80, 0x00, 0x80),
    Rgb::new(0xff, 0x00, 0xff),
];

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb`, `#rrggbb` or a color name. Surrounding whitespace and
    /// case are ignored.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(hex) = text.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        let lower = text.to_ascii_lowercase();
        NAMED
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, rgb)| *rgb)
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            3 => {
                let mut digits = hex.chars().filter_map(|c| c.to_digit(16));
                let mut next = || {
                    digits
                        .next()
                        .and_then(|d| u8::try_from(d * 17).ok())
                };
                Some(Self::new(next()?, next()?, next()?))
            }
            6 => {
                let channel = |range: std::ops::Range<usize>| {
                    hex.get(range).and_then(|s| u8::from_str_radix(s, 16).ok())
                };
                Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
            }
            _ => None,
        }
    }

    /// Lowercase `#rrggbb`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Black or white, whichever reads better on top of this color.
    #[must_use]
    pub fn contrast(self) -> Color {
        let luma = 299 * u32::from(self.r) + 587 * u32::from(self.g) + 114 * u32::from(self.b);
        if luma > 128_000 {
            Color::Black
        } else {
            Color::White
        }
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Self::Rgb(rgb.r, rgb.g, rgb.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(Rgb::parse("#ff8000"), Some(Rgb::new(255, 128, 0)));
        assert_eq!(Rgb::parse("  #FF8000 "), Some(Rgb::new(255, 128, 0)));
        assert_eq!(Rgb::parse("#f80"), Some(Rgb::new(255, 136, 0)));
        assert_eq!(Rgb::parse("#ff80"), None);
        assert_eq!(Rgb::parse("#gg0000"), None);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(Rgb::parse("red"), Some(Rgb::new(255, 0, 0)));
        assert_eq!(Rgb::parse("Green"), Some(Rgb::new(0, 128, 0)));
        assert_eq!(Rgb::parse("not-a-color"), None);
        assert_eq!(Rgb::parse(""), None);
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Rgb::new(0, 15, 255).to_hex(), "#000fff");
        assert_eq!(Rgb::parse("#ABCDEF").unwrap().to_string(), "#abcdef");
    }

    #[test]
    fn test_contrast() {
        assert_eq!(Rgb::new(255, 255, 0).contrast(), Color::Black);
        assert_eq!(Rgb::new(0, 0, 128).contrast(), Color::White);
    }
}
