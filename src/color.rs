//! Color values exchanged with color selection dialogs.
//!
//! Helpers speak the zenity/GTK notation: `rgb(r,g,b)`, `rgba(r,g,b,a)` with
//! a fractional alpha, and `#rgb` / `#rrggbb` / `#rrggbbaa` hex forms.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::DialogError;

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channels scaled to `0.0..=1.0`, the form AppleScript's `choose color` takes.
    pub fn to_unit_rgb(self) -> [f64; 3] {
        [self.r, self.g, self.b].map(|c| f64::from(c) / 255.0)
    }

    /// Win32 `COLORREF` layout (`0x00bbggrr`).
    pub fn to_colorref(self) -> u32 {
        u32::from(self.r) | (u32::from(self.g) << 8) | (u32::from(self.b) << 16)
    }

    pub fn from_colorref(value: u32) -> Self {
        Self::rgb(
            (value & 0xff) as u8,
            ((value >> 8) & 0xff) as u8,
            ((value >> 16) & 0xff) as u8,
        )
    }
}

fn functional_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*([0-9]*\.?[0-9]+)\s*)?\)$",
        )
        .expect("color pattern is valid")
    })
}

fn hex_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").expect("hex pattern is valid")
    })
}

fn channel(text: &str) -> Option<u8> {
    text.parse::<u16>().ok().and_then(|v| u8::try_from(v).ok())
}

fn parse_hex(digits: &str) -> Option<Color> {
    let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    match digits.len() {
        3 => {
            let nibble = |i: usize| u8::from_str_radix(&digits[i..=i], 16).ok().map(|n| n * 17);
            Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
        }
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

impl FromStr for Color {
    type Err = DialogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let malformed = || DialogError::MalformedOutput(format!("not a color: {:?}", s));

        if let Some(caps) = hex_pattern().captures(s) {
            return parse_hex(&caps[1]).ok_or_else(malformed);
        }

        let caps = functional_pattern().captures(s).ok_or_else(malformed)?;
        let r = channel(&caps[1]).ok_or_else(malformed)?;
        let g = channel(&caps[2]).ok_or_else(malformed)?;
        let b = channel(&caps[3]).ok_or_else(malformed)?;
        let a = match caps.get(4) {
            Some(alpha) => {
                let alpha: f64 = alpha.as_str().parse().map_err(|_| malformed())?;
                if !(0.0..=1.0).contains(&alpha) {
                    return Err(malformed());
                }
                (alpha * 255.0).round() as u8
            }
            None => 255,
        };
        Ok(Color::rgba(r, g, b, a))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "rgb({},{},{})", self.r, self.g, self.b)
        } else {
            let alpha = f64::from(self.a) / 255.0;
            write!(f, "rgba({},{},{},{:.3})", self.r, self.g, self.b, alpha)
        }
    }
}
