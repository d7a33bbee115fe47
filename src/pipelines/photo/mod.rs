// SPDX-License-Identifier: GPL-3.0-only

//! Photo pipeline
//!
//! ```text
//! Captured frame → Crop (aspect-fill) → RGB → Encode → Disk I/O
//! ```
//!
//! Every stage is asynchronous; CPU- and I/O-bound work runs on blocking
//! workers so the session and preview stay responsive. Frames travel by
//! `Arc`, so nothing here copies pixel data until the crop extraction.

pub mod encoding;
pub mod processing;

pub use encoding::{EncodedPhoto, OutputFormat, PhotoEncoder};
pub use processing::{PhotoProcessor, ProcessedImage};

use crate::backends::camera::CameraFrame;
use crate::crop::ViewportSpec;
use crate::errors::PhotoError;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

/// Complete photo pipeline: process → encode → save
pub struct PhotoPipeline {
    processor: PhotoProcessor,
    encoder: PhotoEncoder,
}

impl PhotoPipeline {
    /// Pipeline that crops captures to fill `viewport` before saving
    pub fn new(viewport: Option<ViewportSpec>, format: OutputFormat, jpeg_quality: u8) -> Self {
        Self {
            processor: PhotoProcessor::new(viewport),
            encoder: PhotoEncoder::new(format, jpeg_quality),
        }
    }

    /// Run the full pipeline on a captured frame.
    ///
    /// A save failure is logged and returned; the caller still holds the
    /// frame and may try again.
    pub async fn process_and_save(
        &self,
        frame: Arc<CameraFrame>,
        output_dir: PathBuf,
    ) -> Result<PathBuf, PhotoError> {
        let processed = self.processor.process(frame).await?;
        let encoded = self.encoder.encode(processed).await?;

        match self.encoder.save(encoded, output_dir).await {
            Ok(path) => Ok(path),
            Err(e) => {
                error!(error = %e, "Failed to persist photo");
                Err(e)
            }
        }
    }
}
