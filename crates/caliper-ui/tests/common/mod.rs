#![allow(dead_code)]

use caliper_camera::{Camera, CameraConfig, CameraDevice, CameraError};
use caliper_com::{ComError, MeasureBackend, ProcessingParams, ProcessingResponse, SelectedFile};
use caliper_image::Frame;
use caliper_ui::{UiState, View};
use std::cell::{Cell, RefCell};
use std::time::Duration;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Keeps every state it was asked to render.
#[derive(Default)]
pub struct RecordingView {
    pub states: Vec<UiState>,
}

impl RecordingView {
    pub fn last(&self) -> &UiState {
        self.states.last().expect("nothing rendered")
    }
}

impl View for RecordingView {
    fn render(&mut self, state: &UiState) {
        self.states.push(state.clone());
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Upload {
        file_name: String,
        params: ProcessingParams,
    },
    Process {
        image_data: String,
        params: ProcessingParams,
    },
}

/// Answers requests from a queue and records them.
///
/// The first `stalled` requests never complete.
#[derive(Default)]
pub struct StubBackend {
    pub calls: RefCell<Vec<Call>>,
    replies: RefCell<VecDeque<Result<ProcessingResponse, ComError>>>,
    stalled: Cell<usize>,
}

impl StubBackend {
    pub fn replying(reply: Result<ProcessingResponse, ComError>) -> Self {
        let backend = Self::default();
        backend.push(reply);
        backend
    }

    pub fn stalling(requests: usize) -> Self {
        let backend = Self::default();
        backend.stalled.set(requests);
        backend
    }

    pub fn push(&self, reply: Result<ProcessingResponse, ComError>) {
        self.replies.borrow_mut().push_back(reply);
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    async fn next(&self) -> Result<ProcessingResponse, ComError> {
        if self.stalled.get() > 0 {
            self.stalled.set(self.stalled.get() - 1);
            std::future::pending::<()>().await;
        }
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or(Err(ComError::Timeout(Duration::from_secs(5))))
    }
}

impl MeasureBackend for StubBackend {
    async fn upload_image(
        &self,
        file: &SelectedFile,
        params: &ProcessingParams,
    ) -> Result<ProcessingResponse, ComError> {
        self.calls.borrow_mut().push(Call::Upload {
            file_name: file.name().to_string(),
            params: params.clone(),
        });
        self.next().await
    }

    async fn process_image(
        &self,
        image_data: &str,
        params: &ProcessingParams,
    ) -> Result<ProcessingResponse, ComError> {
        self.calls.borrow_mut().push(Call::Process {
            image_data: image_data.to_string(),
            params: params.clone(),
        });
        self.next().await
    }
}

/// Frame `n` of a stream is filled with the byte `n`, starting at 1.
pub struct MockCamera {
    width: u32,
    height: u32,
    fail: bool,
    received: Arc<AtomicUsize>,
    dropped: Arc<AtomicBool>,
}

impl Camera for MockCamera {
    async fn recv(&mut self) -> Result<Frame, CameraError> {
        if self.fail {
            return Err(CameraError::Stream("device unplugged".to_string()));
        }
        let n = self.received.fetch_add(1, Ordering::SeqCst) + 1;
        let len = (self.width * self.height * 3) as usize;
        Ok(Frame::rgb(self.width, self.height, vec![n as u8; len])?)
    }
}

impl Drop for MockCamera {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

/// Hands out `MockCamera`s; `present: false` behaves like a missing device.
pub struct MockDevice {
    pub present: bool,
    pub fail_recv: bool,
    pub opened: Arc<AtomicUsize>,
    pub received: Arc<AtomicUsize>,
    pub dropped: Arc<AtomicBool>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            present: true,
            fail_recv: false,
            opened: Arc::new(AtomicUsize::new(0)),
            received: Arc::new(AtomicUsize::new(0)),
            dropped: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn missing() -> Self {
        Self {
            present: false,
            ..Self::new()
        }
    }
}

impl CameraDevice for MockDevice {
    type Camera = MockCamera;

    async fn open(&self, config: &CameraConfig) -> Result<MockCamera, CameraError> {
        if !self.present {
            return Err(CameraError::Access(format!("{}: No such file or directory", config.device())));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockCamera {
            width: config.width(),
            height: config.height(),
            fail: self.fail_recv,
            received: self.received.clone(),
            dropped: self.dropped.clone(),
        })
    }
}

pub fn measured(diameter_mm: f64, category: &str, radius_pixels: f64) -> ProcessingResponse {
    ProcessingResponse {
        processed_image: Some("data:image/png;base64,cHJvY2Vzc2Vk".to_string()),
        diameter_mm: Some(diameter_mm),
        category: Some(category.to_string()),
        radius_pixels: Some(radius_pixels),
        ..Default::default()
    }
}

pub fn rejected(msg: &str) -> ProcessingResponse {
    ProcessingResponse {
        error: Some(msg.to_string()),
        diameter_mm: Some(0.0),
        category: Some("None".to_string()),
        radius_pixels: Some(0.0),
        ..Default::default()
    }
}

/// A real PNG file, 2x2 RGB.
pub fn png_file(name: &str) -> SelectedFile {
    let frame = Frame::rgb(2, 2, vec![255u8; 12]).unwrap();
    SelectedFile::new(name, caliper_image::encode_png(&frame).unwrap())
}
