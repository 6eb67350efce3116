//! QR code encoder

use crate::error::{Error, Result};
use crate::qr::{EncodeOptions, SymbolEncoder};
use image::{ImageBuffer, RgbImage};
use qrcode::{Color, QrCode};

/// Upper bound on rendered pixels per image (8192 x 8192)
pub const MAX_IMAGE_PIXELS: u64 = 1 << 26;

/// Side length in pixels of a `width`-module symbol with `border` and `module_size`.
///
/// `None` when the arithmetic overflows or the image would exceed [`MAX_IMAGE_PIXELS`].
pub fn rendered_side(width: u32, border: u32, module_size: u32) -> Option<u32> {
    let side = border
        .checked_mul(2)
        .and_then(|b| b.checked_add(width))
        .and_then(|modules| modules.checked_mul(module_size))?;
    (u64::from(side) * u64::from(side) <= MAX_IMAGE_PIXELS).then_some(side)
}

/// QR code encoder backed by the `qrcode` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct QrEncoder;

impl QrEncoder {
    /// Create a new QR encoder
    pub fn new() -> Self {
        Self
    }

    /// Build the symbol for `text`, using the smallest version that fits the EC level.
    pub fn symbol(&self, text: &str, options: &EncodeOptions) -> Result<QrCode> {
        QrCode::with_error_correction_level(text.as_bytes(), options.ec_level.to_qrcode()).map_err(
            |e| {
                Error::Encoding(format!(
                    "{} ({} bytes at {:?} error correction)",
                    e,
                    text.len(),
                    options.ec_level
                ))
            },
        )
    }
}

impl SymbolEncoder for QrEncoder {
    fn encode(&self, text: &str, options: &EncodeOptions) -> Result<RgbImage> {
        if options.module_size == 0 {
            return Err(Error::Config("module_size must be at least 1".to_string()));
        }

        let code = self.symbol(text, options)?;
        let modules = code.to_colors();
        let width = code.width() as u32;
        let border = options.border;
        let scale = options.module_size;
        let side = rendered_side(width, border, scale).ok_or_else(|| {
            Error::Image(format!(
                "{width}-module symbol with border {border} at module size {scale} exceeds {MAX_IMAGE_PIXELS} pixels"
            ))
        })?;

        let fill = options.fill.to_pixel();
        let background = options.background.to_pixel();

        let image = ImageBuffer::from_fn(side, side, |x, y| {
            let mx = (x / scale).checked_sub(border);
            let my = (y / scale).checked_sub(border);
            match (mx, my) {
                (Some(mx), Some(my)) if mx < width && my < width => {
                    match modules[(my * width + mx) as usize] {
                        Color::Dark => fill,
                        Color::Light => background,
                    }
                }
                _ => background,
            }
        });

        tracing::trace!(
            version = ?code.version(),
            modules = width,
            pixels = side,
            "Rendered QR symbol"
        );

        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::{EcLevel, RgbColor};

    #[test]
    fn test_encode_dimensions() {
        let encoder = QrEncoder::new();
        let options = EncodeOptions::default();
        let text = "https://example.com/trivia/trivia-001.html";

        let width = encoder.symbol(text, &options).unwrap().width() as u32;
        let image = encoder.encode(text, &options).unwrap();

        assert_eq!(image.width(), (width + 8) * 10);
        assert_eq!(image.height(), image.width());
    }

    #[test]
    fn test_border_uses_background() {
        let encoder = QrEncoder::new();
        let options = EncodeOptions {
            background: RgbColor([0x10, 0x20, 0x30]),
            fill: RgbColor([0xaa, 0x00, 0x00]),
            ..EncodeOptions::default()
        };
        let image = encoder.encode("Hello", &options).unwrap();

        assert_eq!(image.get_pixel(0, 0).0, [0x10, 0x20, 0x30]);
        // Top-left finder pattern corner is always dark.
        assert_eq!(image.get_pixel(40, 40).0, [0xaa, 0x00, 0x00]);
    }

    #[test]
    fn test_zero_border() {
        let encoder = QrEncoder::new();
        let options = EncodeOptions {
            border: 0,
            module_size: 1,
            ..EncodeOptions::default()
        };
        let image = encoder.encode("Hello", &options).unwrap();
        assert_eq!(image.get_pixel(0, 0).0, RgbColor::BLACK.0);
    }

    #[test]
    fn test_rendered_side_limits() {
        assert_eq!(rendered_side(21, 4, 10), Some(290));
        assert_eq!(rendered_side(21, u32::MAX / 2 + 1, 1), None);
        assert_eq!(rendered_side(21, 4, u32::MAX), None);
        assert_eq!(rendered_side(21, 4, 200_000), None);
        assert_eq!(rendered_side(8192, 0, 1), Some(8192));
        assert_eq!(rendered_side(8193, 0, 1), None);
    }

    #[test]
    fn test_huge_border_is_image_error() {
        let encoder = QrEncoder::new();
        let options = EncodeOptions {
            border: u32::MAX / 2 + 1,
            ..EncodeOptions::default()
        };
        assert!(matches!(encoder.encode("Hello", &options), Err(Error::Image(_))));
    }

    #[test]
    fn test_huge_module_size_is_image_error() {
        let encoder = QrEncoder::new();
        let options = EncodeOptions {
            module_size: 200_000,
            ..EncodeOptions::default()
        };
        assert!(matches!(encoder.encode("Hello", &options), Err(Error::Image(_))));
    }

    #[test]
    fn test_too_long_is_encoding_error() {
        let encoder = QrEncoder::new();
        let text = "a".repeat(4000);
        let result = encoder.encode(&text, &EncodeOptions::default());
        assert!(matches!(result, Err(Error::Encoding(_))));
    }

    #[test]
    fn test_lower_ec_level_fits_more() {
        let encoder = QrEncoder::new();
        // 1500 bytes exceeds version 40 at H (1273) but fits at L (2953).
        let text = "b".repeat(1500);
        let high = EncodeOptions::default();
        let low = EncodeOptions {
            ec_level: EcLevel::Low,
            module_size: 1,
            ..EncodeOptions::default()
        };
        assert!(encoder.encode(&text, &high).is_err());
        assert!(encoder.encode(&text, &low).is_ok());
    }

    #[test]
    fn test_round_trip() {
        use crate::qr::QrDecoder;

        let encoder = QrEncoder::new();
        let decoder = QrDecoder::new();

        let original = "https://example.com/trivia/trivia-007.html";
        let image = encoder.encode(original, &EncodeOptions::default()).unwrap();
        let decoded = decoder.decode_rgb(&image).unwrap();

        assert_eq!(decoded, original);
    }
}
