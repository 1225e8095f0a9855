//! Sticker normalization and tray icon generation.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbaImage};
use thiserror::Error;
use tracing::debug;

/// Side of the square sticker canvas
pub const STICKER_SIZE_PX: u32 = 512;

/// Side of the square tray icon
pub const TRAY_SIZE_PX: u32 = 96;

/// Maximum encoded size of a sticker asset (100 KiB)
pub const STICKER_BYTE_BUDGET: usize = 100 * 1024;

/// First quality level tried
pub const START_QUALITY: u8 = 100;

/// Last quality level tried
pub const MIN_QUALITY: u8 = 30;

/// Quality decrement between attempts
pub const QUALITY_STEP: u8 = 5;

/// Errors that can occur while transcoding
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("Unable to decode image: {0}")]
    Decode(String),

    #[error("Could not compress image below {budget} bytes (smallest attempt: {smallest} bytes at quality {quality})")]
    CompressionBudget {
        budget: usize,
        smallest: usize,
        quality: u8,
    },

    #[error("Image encoding failed: {0}")]
    Encode(String),
}

impl From<image::ImageError> for TranscodeError {
    fn from(e: image::ImageError) -> Self {
        TranscodeError::Decode(e.to_string())
    }
}

/// Tunables for the transcoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeSettings {
    pub canvas_size: u32,
    pub tray_size: u32,
    pub byte_budget: usize,
    pub start_quality: u8,
    pub min_quality: u8,
    pub quality_step: u8,
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        Self {
            canvas_size: STICKER_SIZE_PX,
            tray_size: TRAY_SIZE_PX,
            byte_budget: STICKER_BYTE_BUDGET,
            start_quality: START_QUALITY,
            min_quality: MIN_QUALITY,
            quality_step: QUALITY_STEP,
        }
    }
}

impl TranscodeSettings {
    /// Quality levels in the order they are tried
    pub fn quality_levels(&self) -> impl Iterator<Item = u8> {
        (self.min_quality..=self.start_quality)
            .rev()
            .step_by(self.quality_step.max(1) as usize)
    }
}

/// Largest centered square inside a `width` x `height` image
///
/// Returns `(x, y, side)`. Offsets use floor division, so odd margins leave
/// the extra pixel on the right/bottom.
pub fn square_crop(width: u32, height: u32) -> (u32, u32, u32) {
    let side = width.min(height);
    ((width - side) / 2, (height - side) / 2, side)
}

/// Turns arbitrary images into sticker assets and tray icons
#[derive(Debug, Clone, Default)]
pub struct Transcoder {
    settings: TranscodeSettings,
}

impl Transcoder {
    /// Create a transcoder with the standard sticker settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transcoder with custom settings
    pub fn with_settings(settings: TranscodeSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &TranscodeSettings {
        &self.settings
    }

    /// Normalize a source image into a budgeted WebP sticker
    pub fn normalize(&self, source: &[u8]) -> Result<Vec<u8>, TranscodeError> {
        let decoded = image::load_from_memory(source)?;
        let canvas = self.square_canvas(&decoded)?;
        self.compress_to_budget(&canvas)
    }

    /// Crop to the centered square and resample to the canvas size
    pub fn square_canvas(&self, image: &DynamicImage) -> Result<RgbaImage, TranscodeError> {
        let (x, y, side) = square_crop(image.width(), image.height());
        if side == 0 {
            return Err(TranscodeError::Decode("image has no pixels".to_string()));
        }

        let size = self.settings.canvas_size;
        Ok(image
            .crop_imm(x, y, side, side)
            .resize_exact(size, size, FilterType::Lanczos3)
            .to_rgba8())
    }

    /// Encode `canvas` at descending quality until it fits the budget
    pub fn compress_to_budget(&self, canvas: &RgbaImage) -> Result<Vec<u8>, TranscodeError> {
        let budget = self.settings.byte_budget;
        let encoder = webp::Encoder::from_rgba(canvas.as_raw(), canvas.width(), canvas.height());
        let mut smallest = (usize::MAX, self.settings.start_quality);

        for quality in self.settings.quality_levels() {
            let encoded = encoder
                .encode_simple(false, quality as f32)
                .map_err(|e| TranscodeError::Encode(format!("{:?}", e)))?;

            debug!(quality, bytes = encoded.len(), budget, "Encoded sticker candidate");

            if encoded.len() <= budget {
                return Ok(encoded.to_vec());
            }
            if encoded.len() < smallest.0 {
                smallest = (encoded.len(), quality);
            }
        }

        Err(TranscodeError::CompressionBudget {
            budget,
            smallest: smallest.0,
            quality: smallest.1,
        })
    }

    /// Produce a PNG tray icon
    ///
    /// `None` yields a fully transparent icon. Otherwise the asset is
    /// decoded and scaled (not cropped) to the tray size.
    pub fn derive_thumbnail(&self, asset: Option<&[u8]>) -> Result<Vec<u8>, TranscodeError> {
        let size = self.settings.tray_size;
        let tray = match asset {
            None => RgbaImage::new(size, size),
            Some(bytes) => image::load_from_memory(bytes)?
                .resize_exact(size, size, FilterType::Lanczos3)
                .to_rgba8(),
        };

        let mut out = Vec::new();
        DynamicImage::ImageRgba8(tray)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .map_err(|e| TranscodeError::Encode(e.to_string()))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        });
        let mut out = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn test_quality_levels() {
        let levels: Vec<u8> = TranscodeSettings::default().quality_levels().collect();
        assert_eq!(levels.first(), Some(&100));
        assert_eq!(levels.last(), Some(&30));
        assert_eq!(levels.len(), 15);
        assert!(levels.windows(2).all(|w| w[0] - w[1] == 5));
    }

    #[test]
    fn test_square_crop() {
        assert_eq!(square_crop(300, 200), (50, 0, 200));
        assert_eq!(square_crop(200, 300), (0, 50, 200));
        assert_eq!(square_crop(101, 100), (0, 0, 100));
        assert_eq!(square_crop(64, 64), (0, 0, 64));
    }

    #[test]
    fn test_normalize_produces_square_canvas_within_budget() {
        let transcoder = Transcoder::new();
        let bytes = transcoder.normalize(&png(300, 200)).unwrap();

        assert!(bytes.len() <= STICKER_BYTE_BUDGET);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (STICKER_SIZE_PX, STICKER_SIZE_PX));
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        let err = Transcoder::new().normalize(b"definitely not an image").unwrap_err();
        assert!(matches!(err, TranscodeError::Decode(_)));
    }

    #[test]
    fn test_budget_exhaustion_fails() {
        let transcoder = Transcoder::with_settings(TranscodeSettings {
            byte_budget: 16,
            ..TranscodeSettings::default()
        });

        let err = transcoder.normalize(&png(64, 64)).unwrap_err();
        match err {
            TranscodeError::CompressionBudget { budget, smallest, .. } => {
                assert_eq!(budget, 16);
                assert!(smallest > 16);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_blank_thumbnail_is_transparent() {
        let bytes = Transcoder::new().derive_thumbnail(None).unwrap();
        let tray = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
            .unwrap()
            .to_rgba8();

        assert_eq!(tray.dimensions(), (TRAY_SIZE_PX, TRAY_SIZE_PX));
        assert!(tray.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_thumbnail_from_asset() {
        let transcoder = Transcoder::new();
        let sticker = transcoder.normalize(&png(128, 128)).unwrap();
        let bytes = transcoder.derive_thumbnail(Some(&sticker)).unwrap();
        let tray = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();

        assert_eq!(tray.dimensions(), (TRAY_SIZE_PX, TRAY_SIZE_PX));
    }
}
