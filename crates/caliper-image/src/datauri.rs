use crate::ImageError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;
use std::str::FromStr;

/// A base64 `data:` URI carrying an encoded image.
#[derive(Clone, PartialEq, Eq)]
pub struct DataUri {
    mime: String,
    data: Vec<u8>,
}

impl fmt::Debug for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataUri")
            .field("mime", &self.mime)
            .field("data", &format_args!("<{} bytes>", self.data.len()))
            .finish()
    }
}

impl DataUri {
    pub fn new(mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            data,
        }
    }

    /// Parse `data:<mime>;base64,<payload>`.
    ///
    /// Only base64 payloads are accepted. An empty media type defaults to
    /// `text/plain` as in RFC 2397.
    pub fn parse(uri: &str) -> Result<Self, ImageError> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| ImageError::DataUri("missing \"data:\" prefix".to_string()))?;

        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| ImageError::DataUri("missing ',' separator".to_string()))?;

        let mime = meta
            .strip_suffix(";base64")
            .ok_or_else(|| ImageError::DataUri("only base64 payloads are supported".to_string()))?;

        let mime = match mime.split(';').next() {
            Some("") | None => "text/plain",
            Some(m) => m,
        };

        let data = STANDARD.decode(payload.trim())?;
        Ok(Self::new(mime, data))
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime, STANDARD.encode(&self.data))
    }
}

impl FromStr for DataUri {
    type Err = ImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
