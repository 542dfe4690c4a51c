use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{OverlayError, OverlayResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const BLACK: Self = Self::rgb8(0, 0, 0);
    pub const CRIMSON: Self = Self::rgb8(220, 20, 60);
    pub const LIME_GREEN: Self = Self::rgb8(50, 205, 50);
    pub const RED: Self = Self::rgb8(255, 0, 0);

    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    #[must_use]
    pub const fn rgb8(red: u8, green: u8, blue: u8) -> Self {
        Self::rgb(red as f64 / 255.0, green as f64 / 255.0, blue as f64 / 255.0)
    }

    pub fn validate(self) -> OverlayResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(OverlayError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }

    /// SVG paint value: `#rrggbb`, or `rgba(..)` when translucent.
    #[must_use]
    pub fn to_svg(self) -> String {
        let channel = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        let (r, g, b) = (channel(self.red), channel(self.green), channel(self.blue));
        if self.alpha >= 1.0 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("rgba({r},{g},{b},{:.3})", self.alpha.clamp(0.0, 1.0))
        }
    }
}

impl FromStr for Color {
    type Err = OverlayError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "black" => return Ok(Self::BLACK),
            "crimson" => return Ok(Self::CRIMSON),
            "limegreen" => return Ok(Self::LIME_GREEN),
            "red" => return Ok(Self::RED),
            _ => {}
        }

        let hex = trimmed
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| OverlayError::InvalidData(format!("unsupported color `{input}`")))?;
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|e| OverlayError::InvalidData(format!("invalid color `{input}`: {e}")))
        };
        Ok(Self::rgb8(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Color {
    type Error = OverlayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_svg()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_svg())
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn named_and_hex_colors_agree() {
        let named: Color = "crimson".parse().expect("named");
        let hex: Color = "#DC143C".parse().expect("hex");
        assert_eq!(named, hex);
        assert_eq!(named.to_svg(), "#dc143c");
    }

    #[test]
    fn unknown_color_is_rejected() {
        assert!("teal-ish".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
    }
}
