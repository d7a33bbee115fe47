// SPDX-License-Identifier: GPL-3.0-only

//! snapcam - minimal still-photo capture with aspect-fill framing
//!
//! The crate is organized into several modules:
//!
//! - [`backends`]: Camera backend abstraction and the synthetic backend
//! - [`session`]: Capture session lifecycle state machine
//! - [`crop`]: Aspect-fill crop geometry
//! - [`pipelines`]: Photo processing, encoding, and saving
//! - [`config`]: User configuration handling
//! - [`storage`]: Photo directory management

pub mod backends;
pub mod config;
pub mod constants;
pub mod crop;
pub mod errors;
pub mod pipelines;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use crop::{CropRect, ViewportSpec, compute_crop, crop_to_fill};
pub use errors::{AppError, AppResult};
pub use session::{CaptureSession, SessionError, SessionState};
