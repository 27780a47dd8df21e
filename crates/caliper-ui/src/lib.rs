//! The measurement controller.
//!
//! [`MeasureController`] owns the camera stream, the captured frame, the
//! selected file and the processing parameters. Every operation updates a
//! [`UiState`] and hands it to a [`View`] for rendering.

pub mod controller;
pub mod error;
pub mod state;
pub mod view;

pub use controller::MeasureController;
pub use error::UiError;
pub use state::{CameraState, Panel, ProcessingState, ResultDisplay, UiState};
pub use view::View;
