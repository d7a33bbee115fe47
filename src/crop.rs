// SPDX-License-Identifier: GPL-3.0-only

//! Aspect-fill crop geometry
//!
//! Computes the centered crop rectangle that makes a source image fill a
//! target viewport without distortion: the crop matches the viewport's
//! aspect ratio and discards the excess along exactly one axis. This is
//! "fill" scaling, as opposed to "fit" which would letterbox.

use image::RgbaImage;

/// Target display region, in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSpec {
    pub width: f64,
    pub height: f64,
}

impl ViewportSpec {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width / height. Meaningless for degenerate viewports; callers go
    /// through [`compute_crop`] which rejects those first.
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }
}

/// Crop rectangle in source-image pixel coordinates
///
/// Coordinates are kept as floats so the aspect ratio is exact; use
/// [`CropRect::pixel_bounds`] for the integer rectangle to extract.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CropRect {
    /// Integer pixel rectangle `(x, y, width, height)`, rounded and clamped
    /// so it never exceeds the source image.
    pub fn pixel_bounds(&self, image_width: u32, image_height: u32) -> (u32, u32, u32, u32) {
        let x = (self.x.round().max(0.0) as u32).min(image_width);
        let y = (self.y.round().max(0.0) as u32).min(image_height);
        let width = (self.width.round() as u32).min(image_width - x);
        let height = (self.height.round() as u32).min(image_height - y);
        (x, y, width, height)
    }
}

/// Error type for crop computations
#[derive(Debug, Clone, PartialEq)]
pub enum CropError {
    /// Zero or non-finite dimensions make the aspect ratio undefined
    DegenerateInput(String),
}

impl std::fmt::Display for CropError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CropError::DegenerateInput(msg) => write!(f, "Degenerate input: {}", msg),
        }
    }
}

impl std::error::Error for CropError {}

/// Compute the aspect-fill crop of a source image for a viewport.
///
/// If the image is relatively wider than the viewport, the crop keeps the
/// full source height and trims the width to `height * viewport_aspect`;
/// otherwise it keeps the full width and trims the height to
/// `width / viewport_aspect`. The crop is centered. Equal aspect ratios
/// yield the full image.
pub fn compute_crop(
    image_width: u32,
    image_height: u32,
    viewport: &ViewportSpec,
) -> Result<CropRect, CropError> {
    if image_width == 0 || image_height == 0 {
        return Err(CropError::DegenerateInput(format!(
            "source image is {}x{}",
            image_width, image_height
        )));
    }
    if !(viewport.width > 0.0) || !(viewport.height > 0.0) {
        return Err(CropError::DegenerateInput(format!(
            "viewport is {}x{}",
            viewport.width, viewport.height
        )));
    }

    let viewport_aspect = viewport.aspect_ratio();
    let image_aspect = image_width as f64 / image_height as f64;

    let (crop_width, crop_height) = if image_aspect > viewport_aspect {
        // Image is relatively wider: keep full height, trim width
        let height = image_height as f64;
        (height * viewport_aspect, height)
    } else {
        // Image is relatively taller (or equal): keep full width, trim height
        let width = image_width as f64;
        (width, width / viewport_aspect)
    };

    Ok(CropRect {
        x: (image_width as f64 - crop_width) / 2.0,
        y: (image_height as f64 - crop_height) / 2.0,
        width: crop_width,
        height: crop_height,
    })
}

/// Extract the aspect-fill crop of `image` for `viewport` at 1:1 scale.
///
/// No resampling happens beyond the extraction itself.
pub fn crop_to_fill(image: &RgbaImage, viewport: &ViewportSpec) -> Result<RgbaImage, CropError> {
    let (image_width, image_height) = image.dimensions();
    let rect = compute_crop(image_width, image_height, viewport)?;
    let (x, y, width, height) = rect.pixel_bounds(image_width, image_height);

    Ok(image::imageops::crop_imm(image, x, y, width, height).to_image())
}
