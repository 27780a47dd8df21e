//! Still-frame utilities for caliper.
//!
//! Wraps the `image` crate to decode uploaded files into [`Frame`]s, encode
//! frames as PNG, and move encoded images around as `data:` URIs.
//!
//! All frames use HWC layout: `[height, width, channels]`.

pub mod datauri;
pub mod error;
pub mod frame;

pub use datauri::DataUri;
pub use error::ImageError;
pub use frame::Frame;

use crates_image::codecs::png::PngEncoder;
use crates_image::{DynamicImage, ExtendedColorType, ImageEncoder};

/// Decodes an image from raw bytes into an 8-bit frame.
///
/// The format is auto-detected. 8-bit gray, gray+alpha, RGB and RGBA images
/// keep their channel count; deeper images are converted to the 8-bit
/// equivalent, anything else to RGBA.
///
/// # Errors
///
/// Returns `ImageError::Decode` if the data is invalid or the format is unsupported.
pub fn decode_image(data: &[u8]) -> Result<Frame, ImageError> {
    let img = crates_image::load_from_memory(data)?;
    let (width, height) = (img.width(), img.height());

    let (channels, raw) = match img {
        DynamicImage::ImageLuma8(buf) => (1, buf.into_raw()),
        DynamicImage::ImageLumaA8(buf) => (2, buf.into_raw()),
        DynamicImage::ImageRgb8(buf) => (3, buf.into_raw()),
        DynamicImage::ImageRgba8(buf) => (4, buf.into_raw()),
        DynamicImage::ImageLuma16(_) => (1, img.to_luma8().into_raw()),
        DynamicImage::ImageLumaA16(_) => (2, img.to_luma_alpha8().into_raw()),
        DynamicImage::ImageRgb16(_) | DynamicImage::ImageRgb32F(_) => (3, img.to_rgb8().into_raw()),
        _ => (4, img.to_rgba8().into_raw()),
    };

    Frame::new(width, height, channels, raw)
}

/// Encodes a frame as PNG.
pub fn encode_png(frame: &Frame) -> Result<Vec<u8>, ImageError> {
    let color = match frame.channels() {
        1 => ExtendedColorType::L8,
        2 => ExtendedColorType::La8,
        3 => ExtendedColorType::Rgb8,
        4 => ExtendedColorType::Rgba8,
        n => return Err(ImageError::UnsupportedChannels(n)),
    };

    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(frame.data(), frame.width(), frame.height(), color)
        .map_err(|e| ImageError::Encode(e.to_string()))?;

    Ok(buffer)
}
