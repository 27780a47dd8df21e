use crate::{CameraConfig, CameraError};
use caliper_image::Frame;

/// An active camera stream.
///
/// Dropping the stream stops it and releases the device.
#[allow(async_fn_in_trait)]
pub trait Camera {
    /// Receive the next frame from the stream.
    async fn recv(&mut self) -> Result<Frame, CameraError>;
}

/// Something that can be asked for a camera stream.
#[allow(async_fn_in_trait)]
pub trait CameraDevice {
    type Camera: Camera;

    /// Request a stream matching `config`.
    ///
    /// Returns `CameraError::Access` when permission is denied or the device
    /// does not exist.
    async fn open(&self, config: &CameraConfig) -> Result<Self::Camera, CameraError>;
}
