// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the capture session state machine

use snapcam::backends::camera::{
    BackendError, BackendResult, CameraBackend, CameraDevice, CameraFrame, Facing, FrameReceiver,
};
use snapcam::session::{CaptureSession, SessionError, SessionState};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Observable hardware call counts for a mock backend
#[derive(Clone, Default)]
struct CallCounters {
    start: Arc<AtomicUsize>,
    stop: Arc<AtomicUsize>,
    capture: Arc<AtomicUsize>,
}

/// Scriptable camera backend for state machine tests
struct MockBackend {
    device: Option<CameraDevice>,
    counters: CallCounters,
    /// When set, capture_photo blocks until the test sends on the channel
    capture_gate: Option<Mutex<mpsc::Receiver<()>>>,
    /// When set, capture_photo fails with this message
    capture_error: Option<String>,
}

impl MockBackend {
    fn new() -> (Self, CallCounters) {
        let counters = CallCounters::default();
        (
            Self {
                device: None,
                counters: counters.clone(),
                capture_gate: None,
                capture_error: None,
            },
            counters,
        )
    }

    fn gated() -> (Self, CallCounters, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let (mut backend, counters) = Self::new();
        backend.capture_gate = Some(Mutex::new(rx));
        (backend, counters, tx)
    }

    fn failing(message: &str) -> (Self, CallCounters) {
        let (mut backend, counters) = Self::new();
        backend.capture_error = Some(message.to_string());
        (backend, counters)
    }

    fn frame() -> CameraFrame {
        CameraFrame {
            width: 16,
            height: 16,
            data: Arc::from(vec![0u8; 16 * 16 * 4].into_boxed_slice()),
            stride: 16 * 4,
            captured_at: Instant::now(),
        }
    }
}

impl CameraBackend for MockBackend {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        vec![CameraDevice {
            name: "Mock rear camera".to_string(),
            facing: Facing::Back,
            width: 16,
            height: 16,
        }]
    }

    fn open(&mut self, device: &CameraDevice) -> BackendResult<()> {
        self.device = Some(device.clone());
        Ok(())
    }

    fn close(&mut self) -> BackendResult<()> {
        self.device = None;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.device.is_some()
    }

    fn start_stream(&mut self) -> BackendResult<()> {
        self.counters.start.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop_stream(&mut self) -> BackendResult<()> {
        self.counters.stop.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_streaming(&self) -> bool {
        false
    }

    fn capture_photo(&self) -> BackendResult<CameraFrame> {
        self.counters.capture.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.capture_gate {
            gate.lock()
                .unwrap()
                .recv_timeout(Duration::from_secs(10))
                .map_err(|_| BackendError::CaptureFailed("gate never released".to_string()))?;
        }

        if let Some(message) = &self.capture_error {
            return Err(BackendError::CaptureFailed(message.clone()));
        }

        Ok(Self::frame())
    }

    fn preview_receiver(&mut self) -> Option<FrameReceiver> {
        None
    }

    fn current_device(&self) -> Option<&CameraDevice> {
        self.device.as_ref()
    }
}

async fn wait_for_state(session: &CaptureSession, state: SessionState) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while session.state() != state {
        assert!(
            Instant::now() < deadline,
            "session did not reach {:?} in time",
            state
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn double_start_issues_one_hardware_call() {
    let (backend, counters) = MockBackend::new();
    let session = CaptureSession::new(Box::new(backend));
    session.configure().unwrap();

    session.start().await.unwrap();
    session.start().await.unwrap();

    assert_eq!(counters.start.load(Ordering::SeqCst), 1);
    assert_eq!(session.state(), SessionState::Running);
}

#[tokio::test]
async fn capture_in_configured_state_never_touches_hardware() {
    let (backend, counters) = MockBackend::new();
    let session = CaptureSession::new(Box::new(backend));
    session.configure().unwrap();

    let err = session.capture_photo().await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidState { .. }));
    assert_eq!(counters.capture.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn second_capture_while_pending_is_busy() {
    let (backend, counters, gate) = MockBackend::gated();
    let session = CaptureSession::new(Box::new(backend));
    session.configure().unwrap();
    session.start().await.unwrap();

    let first = {
        let session = session.clone();
        tokio::spawn(async move { session.capture_photo().await })
    };

    wait_for_state(&session, SessionState::CapturePending).await;

    // Second request observes the pending capture and is rejected
    // without reaching the backend.
    let err = session.capture_photo().await.unwrap_err();
    assert!(matches!(err, SessionError::Busy));
    assert_eq!(counters.capture.load(Ordering::SeqCst), 1);

    gate.send(()).unwrap();
    let frame = first.await.unwrap().unwrap();
    assert_eq!(frame.width, 16);
    assert_eq!(session.state(), SessionState::Running);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn capture_timeout_reports_and_session_recovers() {
    let (backend, _counters, gate) = MockBackend::gated();
    let session = CaptureSession::new(Box::new(backend));
    session.configure().unwrap();
    session.start().await.unwrap();

    let err = session
        .capture_photo_timeout(Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Timeout));

    // The hardware request is not cancelled; until it completes the
    // session stays busy.
    assert_eq!(session.state(), SessionState::CapturePending);
    assert!(matches!(
        session.capture_photo().await.unwrap_err(),
        SessionError::Busy
    ));

    gate.send(()).unwrap();
    wait_for_state(&session, SessionState::Running).await;

    // Queue a release for the next capture, then verify the session is
    // usable again.
    gate.send(()).unwrap();
    let frame = session.capture_photo().await.unwrap();
    assert_eq!(frame.height, 16);
}

#[tokio::test]
async fn capture_failure_returns_session_to_running() {
    let (backend, _counters) = MockBackend::failing("sensor fault");
    let session = CaptureSession::new(Box::new(backend));
    session.configure().unwrap();
    session.start().await.unwrap();

    let err = session.capture_photo().await.unwrap_err();
    match err {
        SessionError::Capture(message) => assert!(message.contains("sensor fault")),
        other => panic!("expected capture error, got {:?}", other),
    }
    assert_eq!(session.state(), SessionState::Running);
}

#[tokio::test]
async fn stop_is_idempotent() {
    let (backend, counters) = MockBackend::new();
    let session = CaptureSession::new(Box::new(backend));
    session.configure().unwrap();
    session.start().await.unwrap();

    session.stop().await.unwrap();
    session.stop().await.unwrap();

    assert_eq!(counters.stop.load(Ordering::SeqCst), 1);
    assert_eq!(session.state(), SessionState::Configured);
}

#[tokio::test]
async fn start_stop_start_cycles_cleanly() {
    let (backend, counters) = MockBackend::new();
    let session = CaptureSession::new(Box::new(backend));
    session.configure().unwrap();

    session.start().await.unwrap();
    session.stop().await.unwrap();
    session.start().await.unwrap();

    assert_eq!(counters.start.load(Ordering::SeqCst), 2);
    assert_eq!(session.state(), SessionState::Running);
}
