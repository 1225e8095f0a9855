//! Image transcoding for sticker assets.
//!
//! Every source image is cropped to a centered square, resampled to a fixed
//! canvas and compressed to lossy WebP under a byte budget. Tray icons are
//! small lossless PNGs derived from a blank canvas or a finished sticker.

pub mod processor;

pub use processor::{
    square_crop, TranscodeError, TranscodeSettings, Transcoder, MIN_QUALITY, START_QUALITY,
    QUALITY_STEP, STICKER_BYTE_BUDGET, STICKER_SIZE_PX, TRAY_SIZE_PX,
};
