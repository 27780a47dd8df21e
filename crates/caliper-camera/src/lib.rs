//! Camera capture for caliper.
//!
//! A [`CameraDevice`] hands out a [`Camera`] stream at the requested
//! resolution; the stream yields still [`Frame`](caliper_image::Frame)s and
//! is released when dropped.

pub mod config;
pub mod convert;
pub mod error;
pub mod traits;

#[cfg(feature = "v4l2")]
pub mod v4l2;

pub use config::CameraConfig;
pub use error::CameraError;
pub use traits::{Camera, CameraDevice};

#[cfg(feature = "v4l2")]
pub use v4l2::{V4l2Camera, V4l2Device};
