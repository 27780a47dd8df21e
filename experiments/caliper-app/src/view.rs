use caliper_base::log;
use caliper_image::DataUri;
use caliper_ui::{CameraState, Panel, ProcessingState, UiState, View};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Prints state changes to a writer and saves processed images.
pub struct TerminalView<W: Write> {
    out: W,
    image_dir: Option<PathBuf>,
    camera: CameraState,
    processing: ProcessingState,
    panel: Panel,
    processed_image: Option<String>,
}

impl TerminalView<std::io::Stdout> {
    pub fn stdout(image_dir: Option<PathBuf>) -> Self {
        Self::new(std::io::stdout(), image_dir)
    }
}

impl<W: Write> TerminalView<W> {
    /// `image_dir` receives `processed.png` whenever a new processed image arrives.
    pub fn new(out: W, image_dir: Option<PathBuf>) -> Self {
        Self {
            out,
            image_dir,
            camera: CameraState::Off,
            processing: ProcessingState::Idle,
            panel: Panel::Empty,
            processed_image: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print(&mut self, state: &UiState) -> std::io::Result<()> {
        if state.camera != self.camera {
            match state.camera {
                CameraState::Requesting => writeln!(self.out, "Starting camera...")?,
                CameraState::Active => writeln!(self.out, "Camera ready")?,
                CameraState::Off => writeln!(self.out, "Camera stopped")?,
            }
            self.camera = state.camera;
        }

        if state.processing != self.processing {
            if state.processing == ProcessingState::Busy {
                writeln!(
                    self.out,
                    "Processing (threshold {}, blur {}, pixel ratio {})...",
                    state.params.threshold, state.params.blur_amount, state.params.pixel_ratio
                )?;
            }
            self.processing = state.processing;
        }

        if state.panel != self.panel {
            match &state.panel {
                Panel::Empty => {}
                Panel::Results(results) => {
                    writeln!(self.out, "Diameter: {}", results.diameter)?;
                    writeln!(self.out, "Category: {}", results.category)?;
                    writeln!(self.out, "Radius:   {}", results.radius)?;
                    if let Some(center) = &results.center {
                        writeln!(self.out, "Center:   {}", center)?;
                    }
                }
                Panel::Error(msg) => writeln!(self.out, "Error: {}", msg)?,
            }
            self.panel = state.panel.clone();
        }

        self.out.flush()
    }
}

impl<W: Write> View for TerminalView<W> {
    fn render(&mut self, state: &UiState) {
        if let Err(e) = self.print(state) {
            log::error!("Cannot write to terminal: {}", e);
        }

        if state.processed_image != self.processed_image {
            self.processed_image = state.processed_image.clone();
            if let (Some(dir), Some(uri)) = (&self.image_dir, &self.processed_image) {
                match save_image(dir, uri) {
                    Ok(path) => log::info!("Processed image written to {}", path.display()),
                    Err(e) => log::error!("Cannot save processed image: {}", e),
                }
            }
        }
    }
}

/// Decode a `data:` URI and write it to `dir/processed.png`.
pub fn save_image(dir: &Path, uri: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let image = DataUri::parse(uri)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join("processed.png");
    std::fs::write(&path, image.data())?;
    Ok(path)
}
