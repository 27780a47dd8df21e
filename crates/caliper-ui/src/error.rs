use caliper_camera::CameraError;
use caliper_com::ComError;
use caliper_image::ImageError;
use std::fmt;

/// Everything a controller operation can fail with.
///
/// `Display` gives the message shown to the user.
#[derive(Debug)]
pub enum UiError {
    CameraAccess(CameraError),
    NoActiveStream,
    Capture(CameraError),
    Encode(ImageError),
    NoFileSelected,
    NoCapturedFrame,
    Upload(ComError),
    Processing(ComError),
    /// The backend answered with an `error` message.
    Server(String),
}

impl UiError {
    /// True for failures caught before anything was sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            UiError::NoActiveStream | UiError::NoFileSelected | UiError::NoCapturedFrame
        )
    }
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiError::CameraAccess(err) => write!(f, "Error accessing camera: {err}"),
            UiError::NoActiveStream => write!(f, "Please start the camera first"),
            UiError::Capture(err) => write!(f, "Error capturing image: {err}"),
            UiError::Encode(err) => write!(f, "Error encoding image: {err}"),
            UiError::NoFileSelected => write!(f, "Please select a file"),
            UiError::NoCapturedFrame => write!(f, "Please capture an image first"),
            UiError::Upload(err) => write!(f, "Upload failed: {err}"),
            UiError::Processing(err) => write!(f, "Processing failed: {err}"),
            UiError::Server(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for UiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UiError::CameraAccess(err) | UiError::Capture(err) => Some(err),
            UiError::Encode(err) => Some(err),
            UiError::Upload(err) | UiError::Processing(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ImageError> for UiError {
    fn from(err: ImageError) -> Self {
        UiError::Encode(err)
    }
}
