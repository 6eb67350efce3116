//! Module colors

use crate::error::{Error, Result};
use image::Rgb;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An opaque 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbColor(pub [u8; 3]);

impl RgbColor {
    /// Black
    pub const BLACK: Self = Self([0x00, 0x00, 0x00]);
    /// White
    pub const WHITE: Self = Self([0xff, 0xff, 0xff]);

    /// Parse a named color or a `#RRGGBB` hex triplet.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        let named = match value.to_ascii_lowercase().as_str() {
            "black" => Some(Self::BLACK),
            "white" => Some(Self::WHITE),
            "red" => Some(Self([0xff, 0x00, 0x00])),
            "green" => Some(Self([0x00, 0x80, 0x00])),
            "blue" => Some(Self([0x00, 0x00, 0xff])),
            "gray" | "grey" => Some(Self([0x80, 0x80, 0x80])),
            _ => None,
        };
        if let Some(color) = named {
            return Ok(color);
        }

        let digits = value.strip_prefix('#').ok_or_else(|| {
            Error::Config(format!(
                "Unknown color '{value}'. Use a color name or #RRGGBB"
            ))
        })?;
        let mut rgb = [0u8; 3];
        hex::decode_to_slice(digits, &mut rgb)?;
        Ok(Self(rgb))
    }

    /// Pixel value for the image crate
    pub fn to_pixel(self) -> Rgb<u8> {
        Rgb(self.0)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", hex::encode(self.0))
    }
}

impl FromStr for RgbColor {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl Serialize for RgbColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RgbColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
