//! QR code encoding and decoding
//!
//! Encoding sits behind the [`SymbolEncoder`] capability so the batch logic can be
//! exercised without a real encoder. [`QrEncoder`] is the production implementation
//! and [`QrDecoder`] reads artifacts back for verification.

mod color;
mod decoder;
mod encoder;

pub use color::RgbColor;
pub use decoder::QrDecoder;
pub use encoder::{MAX_IMAGE_PIXELS, QrEncoder, rendered_side};

use crate::error::Result;
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Encoding capability: turn a text payload into a rendered raster symbol.
pub trait SymbolEncoder: Send + Sync {
    /// Encode `text` and render it according to `options`.
    fn encode(&self, text: &str, options: &EncodeOptions) -> Result<RgbImage>;
}

/// QR error correction level
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EcLevel {
    /// ~7% recovery
    #[serde(alias = "l")]
    Low,
    /// ~15% recovery
    #[serde(alias = "m")]
    Medium,
    /// ~25% recovery
    #[serde(alias = "q")]
    Quartile,
    /// ~30% recovery
    #[default]
    #[serde(alias = "h")]
    High,
}

impl EcLevel {
    /// Parse an error correction level (case-insensitive, long or single-letter form).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "l" | "low" => Some(Self::Low),
            "m" | "medium" => Some(Self::Medium),
            "q" | "quartile" => Some(Self::Quartile),
            "h" | "high" => Some(Self::High),
            _ => None,
        }
    }

    pub(crate) fn to_qrcode(self) -> qrcode::EcLevel {
        match self {
            Self::Low => qrcode::EcLevel::L,
            Self::Medium => qrcode::EcLevel::M,
            Self::Quartile => qrcode::EcLevel::Q,
            Self::High => qrcode::EcLevel::H,
        }
    }
}

impl std::str::FromStr for EcLevel {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| {
            format!("Unsupported error correction level '{value}', expected low, medium, quartile or high")
        })
    }
}

/// Symbol and rendering parameters handed to the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Error correction level
    pub ec_level: EcLevel,
    /// Pixel width of one module
    pub module_size: u32,
    /// Light border width, in modules
    pub border: u32,
    /// Dark module color
    pub fill: RgbColor,
    /// Light module and border color
    pub background: RgbColor,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            ec_level: EcLevel::High,
            module_size: 10,
            border: 4,
            fill: RgbColor::BLACK,
            background: RgbColor::WHITE,
        }
    }
}
