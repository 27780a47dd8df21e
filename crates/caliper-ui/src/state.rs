use caliper_com::{Measurement, ProcessingParams};
use caliper_image::Frame;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CameraState {
    #[default]
    Off,
    /// Waiting for the device to hand out a stream.
    Requesting,
    Active,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProcessingState {
    #[default]
    Idle,
    /// A request is in flight; the spinner is shown.
    Busy,
}

/// Measurement fields formatted for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultDisplay {
    /// e.g. "12.3 mm"
    pub diameter: String,
    pub category: String,
    /// e.g. "45.2 px"
    pub radius: String,
    /// e.g. "(320, 240)", when the backend reports it.
    pub center: Option<String>,
}

impl From<&Measurement> for ResultDisplay {
    fn from(m: &Measurement) -> Self {
        Self {
            diameter: format!("{} mm", m.diameter_mm),
            category: m.category.clone(),
            radius: format!("{} px", m.radius_pixels),
            center: m.center.map(|(x, y)| format!("({x}, {y})")),
        }
    }
}

/// The results/error area. Showing one hides the other.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Panel {
    #[default]
    Empty,
    Results(ResultDisplay),
    Error(String),
}

/// Everything a [`View`](crate::View) needs to draw the screen.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UiState {
    pub camera: CameraState,
    pub processing: ProcessingState,
    pub params: ProcessingParams,
    pub panel: Panel,
    /// Preview of the captured frame or the uploaded file.
    pub original: Option<Frame>,
    /// `data:` URI of the last processed image.
    pub processed_image: Option<String>,
    pub file_name: Option<String>,
    pub captured: bool,
}

impl UiState {
    pub fn is_busy(&self) -> bool {
        self.processing == ProcessingState::Busy
    }

    pub fn start_camera_enabled(&self) -> bool {
        self.camera == CameraState::Off
    }

    pub fn capture_enabled(&self) -> bool {
        self.camera == CameraState::Active
    }

    pub fn process_enabled(&self) -> bool {
        self.captured && !self.is_busy()
    }

    pub fn upload_enabled(&self) -> bool {
        self.file_name.is_some() && !self.is_busy()
    }

    pub fn results(&self) -> Option<&ResultDisplay> {
        match &self.panel {
            Panel::Results(results) => Some(results),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.panel {
            Panel::Error(msg) => Some(msg),
            _ => None,
        }
    }
}
