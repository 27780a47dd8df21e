use std::fmt;

#[derive(Debug)]
pub enum CameraError {
    /// Permission denied or no such device.
    Access(String),
    Device(String),
    Stream(String),
    Decode(caliper_image::ImageError),
    Channel(String),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::Access(msg) => write!(f, "access denied: {msg}"),
            CameraError::Device(msg) => write!(f, "device error: {msg}"),
            CameraError::Stream(msg) => write!(f, "stream error: {msg}"),
            CameraError::Decode(err) => write!(f, "decode error: {err}"),
            CameraError::Channel(msg) => write!(f, "channel error: {msg}"),
        }
    }
}

impl std::error::Error for CameraError {}

impl From<std::io::Error> for CameraError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                CameraError::Access(err.to_string())
            }
            _ => CameraError::Device(err.to_string()),
        }
    }
}

impl From<caliper_image::ImageError> for CameraError {
    fn from(err: caliper_image::ImageError) -> Self {
        CameraError::Decode(err)
    }
}
