// SPDX-License-Identifier: GPL-3.0-only

//! Photo encoding and saving
//!
//! Encodes processed images to JPEG or PNG and writes them to the photo
//! directory with a timestamped filename. Both steps run on blocking
//! workers; a failed write is reported and never retried automatically.

use super::processing::ProcessedImage;
use crate::constants::PHOTO_TIMESTAMP_FORMAT;
use crate::errors::PhotoError;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// JPEG (lossy, quality-controlled)
    #[default]
    Jpeg,
    /// PNG (lossless)
    Png,
}

impl OutputFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }
}

/// Encoded image data ready for saving
pub struct EncodedPhoto {
    pub data: Vec<u8>,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

/// Photo encoder
pub struct PhotoEncoder {
    format: OutputFormat,
    jpeg_quality: u8,
}

impl PhotoEncoder {
    pub fn new(format: OutputFormat, jpeg_quality: u8) -> Self {
        Self {
            format,
            jpeg_quality,
        }
    }

    /// Encode a processed image asynchronously
    pub async fn encode(&self, processed: ProcessedImage) -> Result<EncodedPhoto, PhotoError> {
        info!(
            width = processed.width,
            height = processed.height,
            format = ?self.format,
            "Encoding photo"
        );

        let format = self.format;
        let quality = self.jpeg_quality;

        tokio::task::spawn_blocking(move || {
            let data = match format {
                OutputFormat::Jpeg => encode_jpeg(&processed.image, quality)?,
                OutputFormat::Png => encode_png(&processed.image)?,
            };

            debug!(size = data.len(), "Encoding complete");

            Ok(EncodedPhoto {
                data,
                format,
                width: processed.width,
                height: processed.height,
            })
        })
        .await
        .map_err(|e| PhotoError::TaskFailed(e.to_string()))?
    }

    /// Save an encoded photo under `output_dir` with a timestamped name
    pub async fn save(
        &self,
        encoded: EncodedPhoto,
        output_dir: PathBuf,
    ) -> Result<PathBuf, PhotoError> {
        let timestamp = chrono::Local::now().format(PHOTO_TIMESTAMP_FORMAT);
        let filename = format!("IMG_{}.{}", timestamp, encoded.format.extension());
        let filepath = output_dir.join(&filename);

        info!(path = %filepath.display(), "Saving photo");

        let filepath_clone = filepath.clone();
        tokio::task::spawn_blocking(move || {
            std::fs::create_dir_all(&output_dir)
                .map_err(|e| PhotoError::SaveFailed(e.to_string()))?;
            std::fs::write(&filepath_clone, &encoded.data)
                .map_err(|e| PhotoError::SaveFailed(e.to_string()))
        })
        .await
        .map_err(|e| PhotoError::TaskFailed(e.to_string()))??;

        info!(path = %filepath.display(), "Photo saved");
        Ok(filepath)
    }
}

fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, PhotoError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);

    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality);
    encoder
        .encode(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| PhotoError::EncodingFailed(e.to_string()))?;

    Ok(buffer)
}

fn encode_png(image: &RgbImage) -> Result<Vec<u8>, PhotoError> {
    let mut buffer = Vec::new();

    image
        .write_to(
            &mut std::io::Cursor::new(&mut buffer),
            image::ImageFormat::Png,
        )
        .map_err(|e| PhotoError::EncodingFailed(e.to_string()))?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_extensions() {
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::Png.extension(), "png");
    }

    #[tokio::test]
    async fn encodes_png_roundtrippable() {
        let image = RgbImage::from_pixel(8, 8, image::Rgb([200, 100, 50]));
        let encoder = PhotoEncoder::new(OutputFormat::Png, 92);
        let encoded = encoder
            .encode(ProcessedImage {
                image,
                width: 8,
                height: 8,
            })
            .await
            .unwrap();

        let decoded = image::load_from_memory(&encoded.data).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (8, 8));
        assert_eq!(decoded.get_pixel(0, 0).0, [200, 100, 50]);
    }

    #[tokio::test]
    async fn save_reports_unwritable_directory() {
        let image = RgbImage::new(4, 4);
        let encoder = PhotoEncoder::new(OutputFormat::Jpeg, 92);
        let encoded = encoder
            .encode(ProcessedImage {
                image,
                width: 4,
                height: 4,
            })
            .await
            .unwrap();

        let err = encoder
            .save(encoded, PathBuf::from("/proc/no-such-dir/photos"))
            .await
            .unwrap_err();
        assert!(matches!(err, PhotoError::SaveFailed(_)));
    }
}
