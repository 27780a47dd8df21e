//! Talking to the measurement backend.
//!
//! The JSON wire types, the [`MeasureBackend`] trait, and
//! [`MeasureClient`], the `reqwest`-based backend used in production.

pub mod backend;
pub mod client;
pub mod error;
pub mod protocol;

pub use backend::MeasureBackend;
pub use client::{ClientConfig, MeasureClient, PROCESS_IMAGE_PATH, UPLOAD_IMAGE_PATH, parse_response};
pub use error::ComError;
pub use protocol::{
    Measurement, ProcessImageRequest, ProcessingOutcome, ProcessingParams, ProcessingResponse, SelectedFile,
};
