use std::fmt;

#[derive(Debug)]
pub enum ImageError {
    Decode(String),
    Encode(String),
    DataUri(String),
    ShapeOverflow,
    ShapeMismatch { expected: usize, got: usize },
    UnsupportedChannels(u8),
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::Decode(msg) => write!(f, "decode error: {msg}"),
            ImageError::Encode(msg) => write!(f, "encode error: {msg}"),
            ImageError::DataUri(msg) => write!(f, "invalid data URI: {msg}"),
            ImageError::ShapeOverflow => write!(f, "frame dimensions overflow when multiplied"),
            ImageError::ShapeMismatch { expected, got } => {
                write!(f, "frame size mismatch: expected {expected} bytes, got {got}")
            }
            ImageError::UnsupportedChannels(n) => write!(f, "unsupported channel count: {n}"),
        }
    }
}

impl std::error::Error for ImageError {}

impl From<crates_image::ImageError> for ImageError {
    fn from(err: crates_image::ImageError) -> Self {
        ImageError::Decode(err.to_string())
    }
}

impl From<base64::DecodeError> for ImageError {
    fn from(err: base64::DecodeError) -> Self {
        ImageError::DataUri(err.to_string())
    }
}
