use crate::{DataUri, ImageError};
use std::fmt;

/// An 8-bit still frame in HWC layout (`[height, width, channels]`).
///
/// `channels` is 1 (gray), 2 (gray + alpha), 3 (RGB) or 4 (RGBA).
#[derive(Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("channels", &self.channels)
            .field("data", &format_args!("<{} bytes>", self.data.len()))
            .finish()
    }
}

impl Frame {
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self, ImageError> {
        if !(1..=4).contains(&channels) {
            return Err(ImageError::UnsupportedChannels(channels));
        }

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(channels as usize))
            .ok_or(ImageError::ShapeOverflow)?;

        if expected != data.len() {
            return Err(ImageError::ShapeMismatch {
                expected,
                got: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Build an RGB frame.
    pub fn rgb(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ImageError> {
        Self::new(width, height, 3, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// `[height, width, channels]`
    pub fn shape(&self) -> [usize; 3] {
        [self.height as usize, self.width as usize, self.channels as usize]
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Encode as PNG and wrap it in a `data:image/png;base64,...` URI.
    pub fn to_png_data_uri(&self) -> Result<DataUri, ImageError> {
        Ok(DataUri::new("image/png", crate::encode_png(self)?))
    }
}
