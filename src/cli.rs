// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for camera operations

use snapcam::backends::camera::{CameraBackend, SyntheticBackend};
use snapcam::config::Config;
use snapcam::crop::ViewportSpec;
use snapcam::pipelines::photo::{OutputFormat, PhotoPipeline};
use snapcam::session::CaptureSession;
use snapcam::storage;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the `photo` subcommand
pub struct PhotoArgs {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub viewport_width: Option<f64>,
    pub viewport_height: Option<f64>,
    pub timeout: Option<u64>,
    pub png: bool,
}

fn make_backend(input: Option<PathBuf>) -> Result<SyntheticBackend, Box<dyn std::error::Error>> {
    match input {
        Some(path) => Ok(SyntheticBackend::from_image(&path)?),
        None => Ok(SyntheticBackend::test_pattern()),
    }
}

/// List all available cameras
pub fn list_cameras(input: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let backend = make_backend(input)?;
    let cameras = backend.enumerate_cameras();

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {}", index, camera);
    }

    Ok(())
}

/// Take a photo: configure, start, capture, crop to the viewport, save
pub fn take_photo(args: PhotoArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();

    let viewport = ViewportSpec::new(
        args.viewport_width.unwrap_or(config.viewport_width),
        args.viewport_height.unwrap_or(config.viewport_height),
    );
    let timeout = args
        .timeout
        .map(std::time::Duration::from_secs)
        .unwrap_or_else(|| config.capture_timeout());
    let format = if args.png {
        OutputFormat::Png
    } else {
        config.output_format
    };
    let output_dir = args
        .output
        .unwrap_or_else(|| storage::default_photo_dir(&config.save_folder));

    let session = CaptureSession::new(Box::new(make_backend(args.input)?));
    let device = session.configure()?;
    println!("Using camera: {}", device.name);

    let pipeline = PhotoPipeline::new(Some(viewport), format, config.jpeg_quality);

    let rt = tokio::runtime::Runtime::new()?;
    let saved = rt.block_on(async {
        session.start().await?;

        println!("Capturing...");
        let frame = session.capture_photo_timeout(timeout).await?;

        let path = pipeline
            .process_and_save(Arc::new(frame), output_dir)
            .await
            .map_err(snapcam::AppError::from)?;

        session.shutdown().await?;
        Ok::<_, snapcam::AppError>(path)
    })?;

    println!("Photo saved: {}", saved.display());
    Ok(())
}
