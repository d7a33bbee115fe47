// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Folder name for saved photos under the user's Pictures directory
pub const DEFAULT_SAVE_FOLDER: &str = "Snapcam";

/// Default JPEG encoding quality (0-100)
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// Default viewport the saved photo is cropped to fill.
///
/// Matches a portrait phone display; the capture surface is fixed portrait.
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 1080.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 1920.0;

/// Default deadline for a one-shot capture before the caller gives up.
///
/// The hardware request itself is not cancelled; the session returns to
/// Running whenever the backend eventually completes.
pub const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(5);

/// Preview channel capacity. Frames are dropped, not queued, when the
/// consumer falls behind.
pub const PREVIEW_CHANNEL_CAPACITY: usize = 4;

/// Frame pacing for the synthetic backend's preview stream (~30fps)
pub const SYNTHETIC_FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Resolution of the synthetic test pattern source
pub const SYNTHETIC_PATTERN_WIDTH: u32 = 1280;
pub const SYNTHETIC_PATTERN_HEIGHT: u32 = 720;

/// Timestamp format used in saved photo filenames
pub const PHOTO_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
