pub mod args;
pub mod view;

pub use args::{Args, ArgsError, Command, USAGE};
pub use view::TerminalView;

use caliper_camera::{Camera, CameraConfig, CameraDevice, CameraError};
use caliper_image::Frame;

/// Stands in for a camera when the binary is built without one.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCamera;

/// A stream that can never exist.
pub enum NoStream {}

impl Camera for NoStream {
    async fn recv(&mut self) -> Result<Frame, CameraError> {
        match *self {}
    }
}

impl CameraDevice for NoCamera {
    type Camera = NoStream;

    async fn open(&self, config: &CameraConfig) -> Result<NoStream, CameraError> {
        Err(CameraError::Device(format!(
            "{}: built without camera support",
            config.device()
        )))
    }
}
