// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic camera backend
//!
//! Produces frames without any capture hardware, from one of two sources:
//! a generated test pattern or a still image file. Used by the CLI when no
//! real camera is wired up and by the test suite.

use super::types::{
    BackendError, BackendResult, CameraDevice, CameraFrame, Facing, FrameReceiver, FrameSender,
};
use super::CameraBackend;
use crate::constants::{
    PREVIEW_CHANNEL_CAPACITY, SYNTHETIC_FRAME_INTERVAL, SYNTHETIC_PATTERN_HEIGHT,
    SYNTHETIC_PATTERN_WIDTH,
};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Where synthetic frames come from
#[derive(Clone)]
enum FrameSource {
    /// Generated gradient pattern; the counter animates the blue channel
    /// so consecutive frames differ.
    TestPattern {
        width: u32,
        height: u32,
        counter: Arc<AtomicU64>,
    },
    /// A still image served as every frame
    Still {
        data: Arc<[u8]>,
        width: u32,
        height: u32,
    },
}

impl FrameSource {
    fn dimensions(&self) -> (u32, u32) {
        match self {
            FrameSource::TestPattern { width, height, .. } => (*width, *height),
            FrameSource::Still { width, height, .. } => (*width, *height),
        }
    }

    fn render(&self) -> CameraFrame {
        match self {
            FrameSource::TestPattern {
                width,
                height,
                counter,
            } => {
                let (w, h) = (*width, *height);
                let tick = counter.fetch_add(1, Ordering::Relaxed);
                let blue = (tick % 256) as u8;
                let mut data = Vec::with_capacity((w * h * 4) as usize);
                for y in 0..h {
                    for x in 0..w {
                        data.push((x * 255 / w.max(1)) as u8);
                        data.push((y * 255 / h.max(1)) as u8);
                        data.push(blue);
                        data.push(255);
                    }
                }
                CameraFrame {
                    width: w,
                    height: h,
                    data: Arc::from(data.into_boxed_slice()),
                    stride: w * 4,
                    captured_at: Instant::now(),
                }
            }
            FrameSource::Still {
                data,
                width,
                height,
            } => CameraFrame {
                width: *width,
                height: *height,
                data: Arc::clone(data),
                stride: *width * 4,
                captured_at: Instant::now(),
            },
        }
    }
}

/// Synthetic camera backend
pub struct SyntheticBackend {
    source: FrameSource,
    facing: Facing,
    device_name: String,
    device: Option<CameraDevice>,
    preview_tx: Option<FrameSender>,
    preview_rx: Option<FrameReceiver>,
    streaming: Arc<AtomicBool>,
    stream_thread: Option<std::thread::JoinHandle<()>>,
}

impl SyntheticBackend {
    /// Create a backend serving an animated test pattern as a back camera
    pub fn test_pattern() -> Self {
        Self::test_pattern_facing(Facing::Back)
    }

    /// Create a test-pattern backend reporting the given facing direction
    pub fn test_pattern_facing(facing: Facing) -> Self {
        Self {
            source: FrameSource::TestPattern {
                width: SYNTHETIC_PATTERN_WIDTH,
                height: SYNTHETIC_PATTERN_HEIGHT,
                counter: Arc::new(AtomicU64::new(0)),
            },
            facing,
            device_name: "Synthetic test pattern".to_string(),
            device: None,
            preview_tx: None,
            preview_rx: None,
            streaming: Arc::new(AtomicBool::new(false)),
            stream_thread: None,
        }
    }

    /// Create a backend serving a still image file as a back camera
    pub fn from_image(path: &Path) -> BackendResult<Self> {
        let img = image::open(path)
            .map_err(|e| BackendError::Other(format!("Failed to load {}: {}", path.display(), e)))?
            .to_rgba8();
        let (width, height) = img.dimensions();

        debug!(path = %path.display(), width, height, "Loaded still image source");

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "still image".to_string());

        Ok(Self {
            source: FrameSource::Still {
                data: Arc::from(img.into_raw().into_boxed_slice()),
                width,
                height,
            },
            facing: Facing::Back,
            device_name: format!("Still image ({})", name),
            device: None,
            preview_tx: None,
            preview_rx: None,
            streaming: Arc::new(AtomicBool::new(false)),
            stream_thread: None,
        })
    }

    fn stop_stream_thread(&mut self) {
        self.streaming.store(false, Ordering::SeqCst);
        if let Some(handle) = self.stream_thread.take() {
            let _ = handle.join();
        }
    }
}

impl CameraBackend for SyntheticBackend {
    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        let (width, height) = self.source.dimensions();
        vec![CameraDevice {
            name: self.device_name.clone(),
            facing: self.facing,
            width,
            height,
        }]
    }

    fn open(&mut self, device: &CameraDevice) -> BackendResult<()> {
        info!(device = %device, "Opening synthetic backend");

        let (tx, rx) = futures::channel::mpsc::channel(PREVIEW_CHANNEL_CAPACITY);
        self.preview_tx = Some(tx);
        self.preview_rx = Some(rx);
        self.device = Some(device.clone());
        Ok(())
    }

    fn close(&mut self) -> BackendResult<()> {
        self.stop_stream_thread();
        self.preview_tx = None;
        self.preview_rx = None;
        self.device = None;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.device.is_some()
    }

    fn start_stream(&mut self) -> BackendResult<()> {
        if self.device.is_none() {
            return Err(BackendError::NotOpen);
        }
        if self.streaming.load(Ordering::SeqCst) {
            return Ok(());
        }

        let Some(tx) = self.preview_tx.clone() else {
            return Err(BackendError::NotOpen);
        };

        self.streaming.store(true, Ordering::SeqCst);
        let streaming = Arc::clone(&self.streaming);
        let source = self.source.clone();
        let mut tx = tx;

        self.stream_thread = Some(std::thread::spawn(move || {
            while streaming.load(Ordering::SeqCst) {
                // Drop the frame if the consumer is behind
                let _ = tx.try_send(source.render());
                std::thread::sleep(SYNTHETIC_FRAME_INTERVAL);
            }
        }));

        debug!("Synthetic preview stream started");
        Ok(())
    }

    fn stop_stream(&mut self) -> BackendResult<()> {
        self.stop_stream_thread();
        debug!("Synthetic preview stream stopped");
        Ok(())
    }

    fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::SeqCst)
    }

    fn capture_photo(&self) -> BackendResult<CameraFrame> {
        if self.device.is_none() {
            return Err(BackendError::NotOpen);
        }
        Ok(self.source.render())
    }

    fn preview_receiver(&mut self) -> Option<FrameReceiver> {
        self.preview_rx.take()
    }

    fn current_device(&self) -> Option<&CameraDevice> {
        self.device.as_ref()
    }
}

impl Drop for SyntheticBackend {
    fn drop(&mut self) {
        self.stop_stream_thread();
    }
}
