// SPDX-License-Identifier: GPL-3.0-only

//! Capture session lifecycle
//!
//! [`CaptureSession`] owns the state machine governing whether the backend
//! is streaming and brokers one-shot photo captures:
//!
//! ```text
//! Unconfigured ──configure()──▶ Configured ──start()──▶ Running
//!                                   ▲                      │ ▲
//!                                   └───────stop()─────────┘ │
//!                                            capture_photo() │
//!                                                  ▼         │
//!                                           CapturePending ──┘
//! ```
//!
//! A capture is valid only while Running. At most one capture is in flight;
//! a second request observes CapturePending and is rejected with
//! [`SessionError::Busy`] synchronously, so mutual exclusion lives in the
//! state machine rather than a lock held across an await. Hardware start,
//! stop, and capture calls run on blocking workers so the caller's thread
//! stays responsive; the capture result is delivered exactly once through
//! a oneshot channel.

use crate::backends::camera::{
    BackendError, CameraBackend, CameraDevice, CameraFrame, Facing, FrameReceiver,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Capture session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No device attached; configure() has not run or has failed
    Unconfigured,
    /// Device attached, not streaming
    Configured,
    /// Streaming; captures are accepted
    Running,
    /// A one-shot capture is in flight; further captures are rejected
    CapturePending,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Unconfigured => write!(f, "unconfigured"),
            SessionState::Configured => write!(f, "configured"),
            SessionState::Running => write!(f, "running"),
            SessionState::CapturePending => write!(f, "capture pending"),
        }
    }
}

/// Error types for session operations
#[derive(Debug, Clone)]
pub enum SessionError {
    /// No suitable device, or the device could not be attached. Terminal
    /// for this session instance; not retried.
    Configuration(String),
    /// Operation issued in a state that does not allow it
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
    /// A capture is already in flight
    Busy,
    /// The hardware or codec layer failed during a capture
    Capture(String),
    /// The caller-supplied capture deadline elapsed
    Timeout,
    /// Streaming start/stop failed in the backend
    Stream(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Configuration(msg) => write!(f, "Configuration failed: {}", msg),
            SessionError::InvalidState { operation, state } => {
                write!(f, "Cannot {} while session is {}", operation, state)
            }
            SessionError::Busy => write!(f, "A capture is already in flight"),
            SessionError::Capture(msg) => write!(f, "Capture failed: {}", msg),
            SessionError::Timeout => write!(f, "Capture timed out"),
            SessionError::Stream(msg) => write!(f, "Streaming error: {}", msg),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<BackendError> for SessionError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::DeviceNotFound(msg) => SessionError::Configuration(msg),
            BackendError::OpenFailed(msg) => SessionError::Configuration(msg),
            BackendError::NotOpen => SessionError::Configuration("backend is not open".to_string()),
            BackendError::CaptureFailed(msg) => SessionError::Capture(msg),
            BackendError::Other(msg) => SessionError::Capture(msg),
        }
    }
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Capture session controller
///
/// Clone-cheap handle; clones share the same state machine and backend.
#[derive(Clone)]
pub struct CaptureSession {
    state: Arc<Mutex<SessionState>>,
    backend: Arc<Mutex<Box<dyn CameraBackend>>>,
}

impl CaptureSession {
    /// Create a session over a backend. The session starts Unconfigured.
    pub fn new(backend: Box<dyn CameraBackend>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::Unconfigured)),
            backend: Arc::new(Mutex::new(backend)),
        }
    }

    /// Current state of the session
    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap()
    }

    /// Select a rear-facing camera and attach it as the session's input
    /// and output.
    ///
    /// Valid only while Unconfigured. On failure the session stays
    /// Unconfigured and no preview is available; the error is returned to
    /// the caller, not retried.
    pub fn configure(&self) -> SessionResult<CameraDevice> {
        {
            let state = self.state.lock().unwrap();
            if *state != SessionState::Unconfigured {
                return Err(SessionError::InvalidState {
                    operation: "configure",
                    state: *state,
                });
            }
        }

        let mut backend = self.backend.lock().unwrap();

        let device = backend
            .enumerate_cameras()
            .into_iter()
            .find(|d| d.facing == Facing::Back)
            .ok_or_else(|| {
                SessionError::Configuration("no rear-facing camera available".to_string())
            })?;

        backend
            .open(&device)
            .map_err(|e| SessionError::Configuration(e.to_string()))?;

        info!(device = %device, "Session configured");
        *self.state.lock().unwrap() = SessionState::Configured;
        Ok(device)
    }

    /// Start streaming. Idempotent; a second start on a Running session is
    /// a no-op and issues no hardware call.
    ///
    /// The hardware start runs on a blocking worker so the caller's thread
    /// is never blocked on the device.
    pub async fn start(&self) -> SessionResult<()> {
        {
            let mut state = self.state.lock().unwrap();
            match *state {
                SessionState::Running | SessionState::CapturePending => return Ok(()),
                SessionState::Unconfigured => {
                    return Err(SessionError::InvalidState {
                        operation: "start",
                        state: *state,
                    });
                }
                // Claim Running before the hardware call so a concurrent
                // start observes it and no-ops.
                SessionState::Configured => *state = SessionState::Running,
            }
        }

        let backend = Arc::clone(&self.backend);
        let result = tokio::task::spawn_blocking(move || backend.lock().unwrap().start_stream())
            .await
            .map_err(|e| SessionError::Stream(format!("start task failed: {}", e)))?;

        match result {
            Ok(()) => {
                debug!("Session running");
                Ok(())
            }
            Err(e) => {
                *self.state.lock().unwrap() = SessionState::Configured;
                Err(SessionError::Stream(e.to_string()))
            }
        }
    }

    /// Stop streaming. Idempotent; only meaningful while Running.
    ///
    /// A stop issued while a capture is pending is ignored: the in-flight
    /// capture completes back to Running first.
    pub async fn stop(&self) -> SessionResult<()> {
        {
            let mut state = self.state.lock().unwrap();
            match *state {
                SessionState::Running => *state = SessionState::Configured,
                SessionState::CapturePending => {
                    warn!("Stop requested while a capture is pending; ignoring");
                    return Ok(());
                }
                _ => return Ok(()),
            }
        }

        let backend = Arc::clone(&self.backend);
        let result = tokio::task::spawn_blocking(move || backend.lock().unwrap().stop_stream())
            .await
            .map_err(|e| SessionError::Stream(format!("stop task failed: {}", e)))?;

        match result {
            Ok(()) => {
                debug!("Session stopped");
                Ok(())
            }
            Err(e) => Err(SessionError::Stream(e.to_string())),
        }
    }

    /// Capture a single photo.
    ///
    /// Valid only while Running; returns [`SessionError::Busy`] without
    /// touching hardware if a capture is already pending, and an
    /// invalid-state error in any other state. Completes exactly once,
    /// with decoded frame bytes or an error, after which the session is
    /// Running again.
    pub async fn capture_photo(&self) -> SessionResult<CameraFrame> {
        {
            let mut state = self.state.lock().unwrap();
            match *state {
                SessionState::CapturePending => return Err(SessionError::Busy),
                SessionState::Running => *state = SessionState::CapturePending,
                other => {
                    return Err(SessionError::InvalidState {
                        operation: "capture",
                        state: other,
                    });
                }
            }
        }

        info!("Capture requested");

        let (tx, rx) = oneshot::channel();
        let backend = Arc::clone(&self.backend);
        let state = Arc::clone(&self.state);

        tokio::task::spawn_blocking(move || {
            let result = backend.lock().unwrap().capture_photo();

            // Return to Running whether the capture succeeded or failed
            {
                let mut state = state.lock().unwrap();
                if *state == SessionState::CapturePending {
                    *state = SessionState::Running;
                }
            }

            let _ = tx.send(result);
        });

        match rx.await {
            Ok(Ok(frame)) => {
                debug!(
                    width = frame.width,
                    height = frame.height,
                    "Capture completed"
                );
                Ok(frame)
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Capture failed");
                Err(SessionError::Capture(e.to_string()))
            }
            Err(_) => Err(SessionError::Capture(
                "capture worker exited without a result".to_string(),
            )),
        }
    }

    /// Capture a single photo with a caller-supplied deadline.
    ///
    /// On timeout the caller gets [`SessionError::Timeout`]; the hardware
    /// request is not cancelled, and the session returns to Running when
    /// the backend eventually completes. Until then further captures are
    /// rejected as Busy.
    pub async fn capture_photo_timeout(&self, deadline: Duration) -> SessionResult<CameraFrame> {
        match tokio::time::timeout(deadline, self.capture_photo()).await {
            Ok(result) => result,
            Err(_) => {
                warn!(?deadline, "Capture deadline elapsed");
                Err(SessionError::Timeout)
            }
        }
    }

    /// Take the preview frame receiver from the backend.
    ///
    /// Pure passthrough for whatever renders the live preview; frames flow
    /// while the session is Running.
    pub fn preview_receiver(&self) -> Option<FrameReceiver> {
        self.backend.lock().unwrap().preview_receiver()
    }

    /// Stop streaming and release the device. The session returns to
    /// Unconfigured and must be reconfigured before reuse.
    pub async fn shutdown(&self) -> SessionResult<()> {
        self.stop().await?;

        let backend = Arc::clone(&self.backend);
        tokio::task::spawn_blocking(move || backend.lock().unwrap().close())
            .await
            .map_err(|e| SessionError::Stream(format!("close task failed: {}", e)))?
            .map_err(|e| SessionError::Stream(e.to_string()))?;

        *self.state.lock().unwrap() = SessionState::Unconfigured;
        info!("Session shut down");
        Ok(())
    }
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::SyntheticBackend;

    fn configured_session() -> CaptureSession {
        let session = CaptureSession::new(Box::new(SyntheticBackend::test_pattern()));
        session.configure().unwrap();
        session
    }

    #[test]
    fn configure_selects_rear_camera() {
        let session = CaptureSession::new(Box::new(SyntheticBackend::test_pattern()));
        let device = session.configure().unwrap();
        assert_eq!(device.facing, Facing::Back);
        assert_eq!(session.state(), SessionState::Configured);
    }

    #[test]
    fn configure_fails_without_rear_camera() {
        let session = CaptureSession::new(Box::new(SyntheticBackend::test_pattern_facing(
            Facing::Front,
        )));
        let err = session.configure().unwrap_err();
        assert!(matches!(err, SessionError::Configuration(_)));
        // Failure is terminal for this instance: still unconfigured
        assert_eq!(session.state(), SessionState::Unconfigured);
    }

    #[test]
    fn configure_twice_is_rejected() {
        let session = configured_session();
        assert!(matches!(
            session.configure(),
            Err(SessionError::InvalidState { .. })
        ));
    }

    #[tokio::test]
    async fn start_is_idempotent() {
        let session = configured_session();
        session.start().await.unwrap();
        assert_eq!(session.state(), SessionState::Running);
        session.start().await.unwrap();
        assert_eq!(session.state(), SessionState::Running);
        session.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn start_before_configure_is_rejected() {
        let session = CaptureSession::new(Box::new(SyntheticBackend::test_pattern()));
        assert!(matches!(
            session.start().await,
            Err(SessionError::InvalidState { .. })
        ));
    }

    #[tokio::test]
    async fn stop_before_start_is_a_noop() {
        let session = configured_session();
        session.stop().await.unwrap();
        assert_eq!(session.state(), SessionState::Configured);
    }

    #[tokio::test]
    async fn capture_requires_running() {
        let session = configured_session();
        let err = session.capture_photo().await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidState {
                operation: "capture",
                state: SessionState::Configured,
            }
        ));
    }

    #[tokio::test]
    async fn capture_returns_frame_and_restores_running() {
        let session = configured_session();
        session.start().await.unwrap();

        let frame = session.capture_photo().await.unwrap();
        assert!(frame.width > 0 && frame.height > 0);
        assert_eq!(session.state(), SessionState::Running);

        session.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn preview_receiver_delivers_frames_while_running() {
        use futures::StreamExt;

        let session = configured_session();
        let mut receiver = session.preview_receiver().expect("preview receiver");
        session.start().await.unwrap();

        let frame = tokio::time::timeout(Duration::from_secs(2), receiver.next())
            .await
            .expect("frame within deadline")
            .expect("stream open");
        assert!(frame.width > 0);

        session.shutdown().await.unwrap();
    }
}
