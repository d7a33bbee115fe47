// SPDX-License-Identifier: GPL-3.0-only

//! Post-processing for captured frames
//!
//! Turns a raw RGBA camera frame into the image that gets persisted:
//! aspect-fill crop to the target viewport, then RGBA to RGB conversion
//! (drop the alpha channel). The save flow only ever persists the cropped
//! image; the caller keeps the full frame in memory for retries.

use crate::backends::camera::CameraFrame;
use crate::crop::{self, ViewportSpec};
use crate::errors::PhotoError;
use image::{RgbImage, RgbaImage};
use std::sync::Arc;
use tracing::{debug, info};

/// Post-processor for captured frames
pub struct PhotoProcessor {
    /// Viewport the photo is cropped to fill. `None` keeps the full frame.
    viewport: Option<ViewportSpec>,
}

/// Processed image ready for encoding
pub struct ProcessedImage {
    pub image: RgbImage,
    pub width: u32,
    pub height: u32,
}

impl PhotoProcessor {
    pub fn new(viewport: Option<ViewportSpec>) -> Self {
        Self { viewport }
    }

    /// Process a captured frame asynchronously.
    ///
    /// CPU-bound work runs on a blocking worker.
    pub async fn process(&self, frame: Arc<CameraFrame>) -> Result<ProcessedImage, PhotoError> {
        info!(
            width = frame.width,
            height = frame.height,
            "Starting post-processing"
        );

        let viewport = self.viewport;

        let image = tokio::task::spawn_blocking(move || {
            let rgba = frame_to_rgba(&frame)?;

            let rgba = match viewport {
                Some(viewport) => crop::crop_to_fill(&rgba, &viewport)?,
                None => rgba,
            };

            Ok::<RgbaImage, PhotoError>(rgba)
        })
        .await
        .map_err(|e| PhotoError::TaskFailed(e.to_string()))??;

        let (width, height) = image.dimensions();
        let rgb = convert_rgba_to_rgb(&image)?;

        debug!(width, height, "Post-processing complete");

        Ok(ProcessedImage {
            image: rgb,
            width,
            height,
        })
    }
}

/// Build an `RgbaImage` from a camera frame, honoring its row stride
fn frame_to_rgba(frame: &CameraFrame) -> Result<RgbaImage, PhotoError> {
    let row_bytes = (frame.width * 4) as usize;
    let stride = frame.stride as usize;

    if stride < row_bytes {
        return Err(PhotoError::InvalidFrame(format!(
            "stride {} shorter than row of {} bytes",
            stride, row_bytes
        )));
    }

    let needed = stride * frame.height as usize;
    if frame.data.len() < needed {
        return Err(PhotoError::InvalidFrame(format!(
            "frame data is {} bytes, expected at least {}",
            frame.data.len(),
            needed
        )));
    }

    let pixels = if stride == row_bytes {
        frame.data[..needed].to_vec()
    } else {
        // Strip row padding
        let mut pixels = Vec::with_capacity(row_bytes * frame.height as usize);
        for row in frame.data.chunks_exact(stride).take(frame.height as usize) {
            pixels.extend_from_slice(&row[..row_bytes]);
        }
        pixels
    };

    RgbaImage::from_raw(frame.width, frame.height, pixels)
        .ok_or_else(|| PhotoError::InvalidFrame("dimensions do not match data".to_string()))
}

/// Drop the alpha channel
fn convert_rgba_to_rgb(image: &RgbaImage) -> Result<RgbImage, PhotoError> {
    let (width, height) = image.dimensions();
    let rgb: Vec<u8> = image
        .as_raw()
        .chunks_exact(4)
        .flat_map(|rgba| [rgba[0], rgba[1], rgba[2]])
        .collect();

    RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| PhotoError::InvalidFrame("rgb buffer does not match dimensions".to_string()))
}
