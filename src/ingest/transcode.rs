// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image transcoding: decode, bound to a square box, re-encode as JPEG

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use super::errors::{IngestError, IngestErrorKind};

/// Content type of every transcoded image
pub const TRANSCODED_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscodeConfig {
    /// Longest allowed edge in pixels (default: 512)
    pub max_dimension: u32,
    /// JPEG quality, 1-100 (default: 80)
    pub jpeg_quality: u8,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            max_dimension: 512,
            jpeg_quality: 80,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranscodedImage {
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
    pub source_width: u32,
    pub source_height: u32,
}

/// Dimensions that fit `width`×`height` inside a `max`×`max` box with the
/// aspect ratio kept. Images already inside the box are left alone.
pub fn bounded_dimensions(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width <= max && height <= max {
        return (width, height);
    }
    let (w, h, m) = (width as u64, height as u64, max as u64);
    if w >= h {
        let scaled = ((h * m + w / 2) / w).max(1);
        (max, scaled as u32)
    } else {
        let scaled = ((w * m + h / 2) / h).max(1);
        (scaled as u32, max)
    }
}

/// Decode `bytes`, shrink into the configured box and encode as JPEG.
///
/// CPU bound; call from a blocking context.
pub fn transcode(bytes: &[u8], config: &TranscodeConfig) -> Result<TranscodedImage, IngestError> {
    debug!("Processing image of size: {} bytes", bytes.len());
    let img = image::load_from_memory(bytes)
        .map_err(|e| IngestError::new(IngestErrorKind::Decode, e.to_string()))?;

    let (source_width, source_height) = img.dimensions();
    debug!("Image metadata: {}x{}", source_width, source_height);

    let (width, height) = bounded_dimensions(source_width, source_height, config.max_dimension);
    let resized = if (width, height) == (source_width, source_height) {
        img
    } else {
        img.resize_exact(width, height, FilterType::Lanczos3)
    };

    let bytes = encode_jpeg(&resized, config.jpeg_quality)?;
    info!(
        "Image processed: {}x{} -> {}x{}, {} bytes",
        source_width,
        source_height,
        width,
        height,
        bytes.len()
    );

    Ok(TranscodedImage {
        bytes,
        width,
        height,
        source_width,
        source_height,
    })
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Bytes, IngestError> {
    // JPEG has no alpha channel
    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| IngestError::new(IngestErrorKind::Encode, e.to_string()))?;
    Ok(Bytes::from(out))
}
