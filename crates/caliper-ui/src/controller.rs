use crate::{CameraState, Panel, ProcessingState, ResultDisplay, UiError, UiState, View};
use caliper_camera::{Camera, CameraConfig, CameraDevice, CameraError};
use caliper_com::{Measurement, MeasureBackend, ProcessingOutcome, ProcessingParams, SelectedFile};
use caliper_image::Frame;

/// Drives camera capture, file upload and backend processing.
///
/// Operations take `&mut self`, so at most one request is in flight at a
/// time. Each one re-renders the view on every state change and, on
/// failure, both shows the error and returns it. Dropping a request future
/// part-way leaves the controller idle with its inputs intact.
pub struct MeasureController<D: CameraDevice, B: MeasureBackend, V: View> {
    device: D,
    backend: B,
    view: V,
    camera_config: CameraConfig,
    stream: Option<D::Camera>,
    captured: Option<String>,
    file: Option<SelectedFile>,
    state: UiState,
}

impl<D: CameraDevice, B: MeasureBackend, V: View> MeasureController<D, B, V> {
    pub fn new(device: D, backend: B, view: V) -> Self {
        Self {
            device,
            backend,
            view,
            camera_config: CameraConfig::default(),
            stream: None,
            captured: None,
            file: None,
            state: UiState::default(),
        }
    }

    /// Request streams with `config` instead of the 640x480 default.
    pub fn with_camera_config(mut self, config: CameraConfig) -> Self {
        self.camera_config = config;
        self
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    /// `data:` URI of the captured frame, if any.
    pub fn captured_image(&self) -> Option<&str> {
        self.captured.as_deref()
    }

    /// Ask the device for a stream.
    ///
    /// Does nothing if a stream is already active.
    pub async fn start_camera(&mut self) -> Result<(), UiError> {
        if self.stream.is_some() {
            log::warn!("Camera already streaming");
            return Ok(());
        }

        self.state.camera = CameraState::Requesting;
        self.render();

        match self.device.open(&self.camera_config).await {
            Ok(stream) => {
                log::info!("Camera {} started", self.camera_config.device());
                self.stream = Some(stream);
                self.state.camera = CameraState::Active;
                self.render();
                Ok(())
            }
            Err(e) => {
                self.state.camera = CameraState::Off;
                self.fail(UiError::CameraAccess(e))
            }
        }
    }

    /// Grab one frame, keep it as a PNG `data:` URI and stop the stream.
    ///
    /// The first `warmup_frames` of the stream are discarded. The stream is
    /// released even if receiving a frame fails.
    pub async fn capture_frame(&mut self) -> Result<(), UiError> {
        let Some(mut stream) = self.stream.take() else {
            return self.fail(UiError::NoActiveStream);
        };

        let received = receive_settled(&mut stream, self.camera_config.warmup_frames()).await;
        drop(stream);
        self.state.camera = CameraState::Off;

        let frame = match received {
            Ok(frame) => frame,
            Err(e) => return self.fail(UiError::Capture(e)),
        };
        let uri = match frame.to_png_data_uri() {
            Ok(uri) => uri,
            Err(e) => return self.fail(UiError::Encode(e)),
        };

        log::info!("Captured {}x{} frame", frame.width(), frame.height());
        self.captured = Some(uri.to_string());
        self.state.original = Some(frame);
        self.state.captured = true;
        self.render();
        Ok(())
    }

    /// Select a file for upload, or clear the selection with `None`.
    pub fn select_file(&mut self, file: Option<SelectedFile>) {
        self.state.file_name = file.as_ref().map(|f| f.name().to_string());
        self.file = file;
        self.render();
    }

    pub fn set_threshold(&mut self, threshold: u32) {
        self.state.params.threshold = threshold;
        self.render();
    }

    pub fn set_blur_amount(&mut self, blur_amount: u32) {
        self.state.params.blur_amount = blur_amount;
        self.render();
    }

    pub fn set_pixel_ratio(&mut self, pixel_ratio: f64) {
        self.state.params.pixel_ratio = pixel_ratio;
        self.render();
    }

    /// Send the selected file to `/upload_image` and show the outcome.
    pub async fn upload_and_process(&mut self) -> Result<Measurement, UiError> {
        let Some(file) = self.file.as_ref() else {
            return self.fail(UiError::NoFileSelected);
        };

        let response = {
            let loading = Loading::start(&mut self.state, &mut self.view);
            self.backend.upload_image(file, loading.params()).await
        };

        let outcome = response.and_then(|r| r.into_outcome()).map_err(UiError::Upload);
        if let Ok(ProcessingOutcome::Measured(_)) = &outcome {
            self.state.original = match caliper_image::decode_image(file.data()) {
                Ok(frame) => Some(frame),
                Err(e) => {
                    log::warn!("Cannot preview {}: {}", file.name(), e);
                    None
                }
            };
        }

        self.show_outcome(outcome)
    }

    /// Send the captured frame to `/process_image` and show the outcome.
    pub async fn process_captured(&mut self) -> Result<Measurement, UiError> {
        let Some(image_data) = self.captured.as_deref() else {
            return self.fail(UiError::NoCapturedFrame);
        };

        let response = {
            let loading = Loading::start(&mut self.state, &mut self.view);
            self.backend.process_image(image_data, loading.params()).await
        };

        let outcome = response.and_then(|r| r.into_outcome()).map_err(UiError::Processing);
        self.show_outcome(outcome)
    }

    /// Show a measurement and hide any error.
    ///
    /// Without a processed image the previous one stays.
    pub fn render_result(&mut self, measurement: &Measurement) {
        if let Some(image) = &measurement.processed_image {
            self.state.processed_image = Some(image.clone());
        }
        self.state.panel = Panel::Results(ResultDisplay::from(measurement));
        self.render();
    }

    /// Show `message` and hide the results.
    pub fn render_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.state.panel = Panel::Error(message);
        self.render();
    }

    pub fn set_loading(&mut self, busy: bool) {
        apply_loading(&mut self.state, &mut self.view, busy);
    }

    fn show_outcome(&mut self, outcome: Result<ProcessingOutcome, UiError>) -> Result<Measurement, UiError> {
        match outcome {
            Ok(ProcessingOutcome::Measured(measurement)) => {
                log::info!(
                    "Measured {} mm ({}), radius {} px",
                    measurement.diameter_mm,
                    measurement.category,
                    measurement.radius_pixels
                );
                self.render_result(&measurement);
                Ok(measurement)
            }
            Ok(ProcessingOutcome::Rejected(msg)) => self.fail(UiError::Server(msg)),
            Err(e) => self.fail(e),
        }
    }

    fn fail<T>(&mut self, err: UiError) -> Result<T, UiError> {
        self.render_error(err.to_string());
        Err(err)
    }

    fn render(&mut self) {
        self.view.render(&self.state);
    }
}

/// Receive frames until `warmup` have been skipped, and return the next one.
async fn receive_settled<C: Camera>(stream: &mut C, warmup: u32) -> Result<Frame, CameraError> {
    for _ in 0..warmup {
        stream.recv().await?;
    }
    stream.recv().await
}

fn apply_loading<V: View>(state: &mut UiState, view: &mut V, busy: bool) {
    state.processing = if busy {
        ProcessingState::Busy
    } else {
        ProcessingState::Idle
    };
    view.render(state);
}

/// Busy while alive; back to idle when dropped, including when the request
/// future is dropped mid-flight.
struct Loading<'a, V: View> {
    state: &'a mut UiState,
    view: &'a mut V,
}

impl<'a, V: View> Loading<'a, V> {
    fn start(state: &'a mut UiState, view: &'a mut V) -> Self {
        apply_loading(state, view, true);
        Self { state, view }
    }

    fn params(&self) -> &ProcessingParams {
        &self.state.params
    }
}

impl<V: View> Drop for Loading<'_, V> {
    fn drop(&mut self) {
        apply_loading(self.state, self.view, false);
    }
}
