// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the application

use crate::backends::camera::BackendError;
use crate::crop::CropError;
use crate::session::SessionError;
use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Capture session errors
    Session(SessionError),
    /// Crop geometry errors
    Crop(CropError),
    /// Photo pipeline errors
    Photo(PhotoError),
    /// Configuration errors
    Config(String),
    /// Generic error with message
    Other(String),
}

/// Photo pipeline errors
#[derive(Debug, Clone)]
pub enum PhotoError {
    /// Frame data did not match its declared dimensions
    InvalidFrame(String),
    /// Crop geometry was rejected
    Crop(CropError),
    /// Encoding to the output format failed
    EncodingFailed(String),
    /// Writing to the photo directory failed. Non-fatal; the in-memory
    /// image stays available and the user may save again.
    SaveFailed(String),
    /// A background pipeline task panicked or was cancelled
    TaskFailed(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Session(e) => write!(f, "Session error: {}", e),
            AppError::Crop(e) => write!(f, "Crop error: {}", e),
            AppError::Photo(e) => write!(f, "Photo error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for PhotoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoError::InvalidFrame(msg) => write!(f, "Invalid frame: {}", msg),
            PhotoError::Crop(e) => write!(f, "{}", e),
            PhotoError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            PhotoError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
            PhotoError::TaskFailed(msg) => write!(f, "Pipeline task failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for PhotoError {}

// Conversions from sub-errors to AppError
impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::Session(err)
    }
}

impl From<CropError> for AppError {
    fn from(err: CropError) -> Self {
        AppError::Crop(err)
    }
}

impl From<PhotoError> for AppError {
    fn from(err: PhotoError) -> Self {
        AppError::Photo(err)
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        AppError::Other(err.to_string())
    }
}

impl From<CropError> for PhotoError {
    fn from(err: CropError) -> Self {
        PhotoError::Crop(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Other(err.to_string())
    }
}

impl From<std::io::Error> for PhotoError {
    fn from(err: std::io::Error) -> Self {
        PhotoError::SaveFailed(err.to_string())
    }
}
