// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! The capture session talks to hardware only through the [`CameraBackend`]
//! trait: enumerate devices, attach one as an input/output pair, stream
//! preview frames, and grab one-shot photo frames. The synthetic backend
//! implements the same trait without hardware, which is what the CLI and
//! the test suite run against.

pub mod synthetic;
pub mod types;

pub use synthetic::SyntheticBackend;
pub use types::*;

/// Camera backend trait
///
/// Backends own the device handle and the preview stream. All methods are
/// synchronous from the backend's point of view; the session controller is
/// responsible for dispatching them off the caller's thread.
pub trait CameraBackend: Send {
    /// Enumerate available camera devices
    fn enumerate_cameras(&self) -> Vec<CameraDevice>;

    /// Attach a device as the streaming input and photo output
    ///
    /// Must succeed before any streaming or capture operation. Opening an
    /// already-open backend replaces the previous device.
    fn open(&mut self, device: &CameraDevice) -> BackendResult<()>;

    /// Release the device and all streaming resources
    fn close(&mut self) -> BackendResult<()>;

    /// Check whether a device is attached
    fn is_open(&self) -> bool;

    /// Begin producing preview frames
    fn start_stream(&mut self) -> BackendResult<()>;

    /// Stop producing preview frames
    fn stop_stream(&mut self) -> BackendResult<()>;

    /// Check whether the preview stream is live
    fn is_streaming(&self) -> bool;

    /// Capture a single photo frame
    ///
    /// Blocks until the frame is available or the capture fails. The frame
    /// is RGBA and ready for the photo pipeline; the preview stream is not
    /// interrupted.
    fn capture_photo(&self) -> BackendResult<CameraFrame>;

    /// Take the receiver for preview frames
    ///
    /// Returns `None` if the backend is not open or the receiver was
    /// already taken. Pure passthrough: the session hands this to whatever
    /// renders the live preview.
    fn preview_receiver(&mut self) -> Option<FrameReceiver>;

    /// Get the currently attached device, if any
    fn current_device(&self) -> Option<&CameraDevice>;
}
