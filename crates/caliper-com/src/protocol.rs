use crate::ComError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables forwarded to the backend with every request.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessingParams {
    /// Lower edge-detection threshold (the backend uses twice this as the upper one).
    pub threshold: u32,
    /// Box-blur kernel size in pixels.
    pub blur_amount: u32,
    /// Millimetres per pixel.
    pub pixel_ratio: f64,
}

impl Default for ProcessingParams {
    fn default() -> Self {
        Self {
            threshold: 100,
            blur_amount: 3,
            pixel_ratio: 0.2645833,
        }
    }
}

impl ProcessingParams {
    /// The parameters as `(field, decimal string)` pairs, in wire order.
    pub fn fields(&self) -> [(&'static str, String); 3] {
        [
            ("threshold", self.threshold.to_string()),
            ("blur_amount", self.blur_amount.to_string()),
            ("pixel_ratio", self.pixel_ratio.to_string()),
        ]
    }
}

/// JSON body of `POST /process_image`.
#[derive(Serialize, Debug, PartialEq)]
pub struct ProcessImageRequest<'a> {
    pub image_data: &'a str,
    pub threshold: String,
    pub blur_amount: String,
    pub pixel_ratio: String,
}

impl<'a> ProcessImageRequest<'a> {
    pub fn new(image_data: &'a str, params: &ProcessingParams) -> Self {
        let [(_, threshold), (_, blur_amount), (_, pixel_ratio)] = params.fields();
        Self {
            image_data,
            threshold,
            blur_amount,
            pixel_ratio,
        }
    }
}

/// Response body of both processing endpoints, as sent.
///
/// Failures carry `error` and sometimes placeholder measurement fields.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ProcessingResponse {
    pub processed_image: Option<String>,
    pub diameter_mm: Option<f64>,
    pub category: Option<String>,
    pub radius_pixels: Option<f64>,
    pub center_x: Option<i64>,
    pub center_y: Option<i64>,
    pub error: Option<String>,
}

/// A successful measurement.
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    /// `data:` URI of the annotated image, if the backend sent one.
    pub processed_image: Option<String>,
    pub diameter_mm: f64,
    pub category: String,
    pub radius_pixels: f64,
    /// Pixel centre of the enclosing circle.
    pub center: Option<(i64, i64)>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ProcessingOutcome {
    Measured(Measurement),
    /// The backend reported an error message.
    Rejected(String),
}

impl ProcessingResponse {
    /// The reported error, if any. An empty message counts as none.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|msg| !msg.is_empty())
    }

    /// Classify the response.
    ///
    /// Returns `ComError::InvalidResponse` when there is no error but a
    /// measurement field is missing.
    pub fn into_outcome(self) -> Result<ProcessingOutcome, ComError> {
        if let Some(msg) = self.error_message() {
            return Ok(ProcessingOutcome::Rejected(msg.to_string()));
        }

        let missing = |field: &str| ComError::InvalidResponse(format!("missing field `{field}`"));
        let center = self.center_x.zip(self.center_y);

        Ok(ProcessingOutcome::Measured(Measurement {
            processed_image: self.processed_image,
            diameter_mm: self.diameter_mm.ok_or_else(|| missing("diameter_mm"))?,
            category: self.category.ok_or_else(|| missing("category"))?,
            radius_pixels: self.radius_pixels.ok_or_else(|| missing("radius_pixels"))?,
            center,
        }))
    }
}

/// A file picked for upload.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedFile {
    name: String,
    content_type: String,
    data: Vec<u8>,
}

impl SelectedFile {
    /// Wrap file contents; the MIME type is guessed from the name's extension.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        let name = name.into();
        let content_type = guess_content_type(&name).to_string();
        Self {
            name,
            content_type,
            data,
        }
    }

    /// Read a file from disk.
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, data))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn guess_content_type(name: &str) -> &'static str {
    let ext = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("bmp") => "image/bmp",
        Some("gif") => "image/gif",
        Some("tif") | Some("tiff") => "image/tiff",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
