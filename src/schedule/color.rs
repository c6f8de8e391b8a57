//! Color values flowing through the color schedule.
//!
//! Keyframe colors are decoded once at the boundary into [`Color`]. Text that
//! is not a `#rrggbb` hex triplet is kept verbatim as [`Color::Unparsed`] so
//! that interpolation can hand it back untouched.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Serialize, Serializer};

/// An RGB triplet with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase `#rrggbb`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channel-wise linear interpolation.
    #[must_use]
    pub fn lerp(self, other: Self, amount: f64) -> Self {
        Self::new(
            lerp_channel(self.r, other.r, amount),
            lerp_channel(self.g, other.g, amount),
            lerp_channel(self.b, other.b, amount),
        )
    }
}

/// A keyframe color, either decoded or kept as the raw input text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Color {
    Rgb(Rgb),
    Unparsed(String),
}

impl Color {
    /// Decode a `#rrggbb` or `rrggbb` string (case-insensitive). Anything else
    /// is preserved as [`Color::Unparsed`].
    #[must_use]
    pub fn parse(text: &str) -> Self {
        parse_hex(text).map_or_else(|| Self::Unparsed(text.to_owned()), Self::Rgb)
    }

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Rgb(Rgb::new(r, g, b))
    }

    /// Encoded form: `#rrggbb` for decoded colors, the original text otherwise.
    #[must_use]
    pub fn to_hex(&self) -> String {
        match self {
            Self::Rgb(rgb) => rgb.to_hex(),
            Self::Unparsed(text) => text.clone(),
        }
    }

    /// Interpolate towards `other`. If either side could not be decoded the
    /// first operand is returned unchanged.
    #[must_use]
    pub fn lerp(&self, other: &Self, amount: f64) -> Self {
        match (self, other) {
            (Self::Rgb(a), Self::Rgb(b)) => Self::Rgb(a.lerp(*b, amount)),
            _ => self.clone(),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::Rgb(Rgb::BLACK)
    }
}

impl From<Rgb> for Color {
    fn from(rgb: Rgb) -> Self {
        Self::Rgb(rgb)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

fn hex_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^#?([0-9a-f]{2})([0-9a-f]{2})([0-9a-f]{2})$")
            .expect("hex color pattern is a valid regex")
    })
}

fn parse_hex(text: &str) -> Option<Rgb> {
    let captures = hex_pattern().captures(text)?;
    let channel = |idx: usize| u8::from_str_radix(captures.get(idx)?.as_str(), 16).ok();
    Some(Rgb::new(channel(1)?, channel(2)?, channel(3)?))
}

/// Interpolated channel, rounded to nearest with exact halves rounded down.
fn lerp_channel(a: u8, b: u8, amount: f64) -> u8 {
    let (a, b) = (f64::from(a), f64::from(b));
    let value = a + (b - a) * amount;
    let rounded = (value - 0.5).ceil();
    rounded.clamp(0.0, 255.0) as u8
}
