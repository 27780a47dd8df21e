use crate::{ComError, MeasureBackend, ProcessImageRequest, ProcessingParams, ProcessingResponse, SelectedFile};
use http::uri::PathAndQuery;
use http::{StatusCode, Uri};
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use std::time::Duration;

pub const UPLOAD_IMAGE_PATH: &str = "/upload_image";
pub const PROCESS_IMAGE_PATH: &str = "/process_image";

/// Where the backend lives and how requests to it are bounded.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    base_url: String,
    timeout: Option<Duration>,
    max_upload_bytes: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout: None,
            // Matches the backend's MAX_CONTENT_LENGTH.
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

impl ClientConfig {
    /// Set the backend base URL (e.g., "http://10.0.0.5:8000").
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Bound each request. `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Refuse uploads larger than this many bytes.
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }
}

/// HTTP client for the measurement backend.
#[derive(Clone, Debug)]
pub struct MeasureClient {
    config: ClientConfig,
    base: Uri,
    http: reqwest::Client,
}

impl MeasureClient {
    /// Validate the configured base URL and build a client.
    ///
    /// No connection is made until a request is sent.
    pub fn new(config: ClientConfig) -> Result<Self, ComError> {
        let base: Uri = config
            .base_url()
            .parse()
            .map_err(|e| ComError::InvalidUri(format!("{}: {e}", config.base_url())))?;

        match base.scheme_str() {
            Some("http") => {}
            Some(other) => return Err(ComError::UnsupportedScheme(other.to_string())),
            None => return Err(ComError::InvalidUri(format!("{} has no scheme", config.base_url()))),
        }
        if base.host().is_none() {
            return Err(ComError::InvalidUri(format!("{} has no host", config.base_url())));
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("caliper/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self { config, base, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Absolute URI of `path` below the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Uri, ComError> {
        let prefix = self.base.path().trim_end_matches('/');
        let path_and_query: PathAndQuery = format!("{prefix}{path}")
            .parse()
            .map_err(|e| ComError::InvalidUri(format!("{path}: {e}")))?;

        let mut parts = self.base.clone().into_parts();
        parts.path_and_query = Some(path_and_query);
        Uri::from_parts(parts).map_err(|e| ComError::InvalidUri(e.to_string()))
    }

    async fn send(&self, path: &str, request: reqwest::RequestBuilder) -> Result<ProcessingResponse, ComError> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        log::debug!("{} responded {} ({} bytes)", path, status, body.len());
        parse_response(status, &body)
    }

    fn classify(&self, err: reqwest::Error) -> ComError {
        match self.config.timeout() {
            Some(limit) if err.is_timeout() => ComError::Timeout(limit),
            _ => ComError::Http(err),
        }
    }
}

/// Decode a processing response.
///
/// The backend reports logical failures as `{"error": ...}` with a 4xx/5xx
/// status, so the body is parsed whatever the status. A non-2xx response
/// without a JSON error becomes `ComError::Status`.
pub fn parse_response(status: StatusCode, body: &[u8]) -> Result<ProcessingResponse, ComError> {
    match serde_json::from_slice::<ProcessingResponse>(body) {
        Ok(parsed) if status.is_success() || parsed.error_message().is_some() => Ok(parsed),
        Ok(_) => Err(ComError::Status(status)),
        Err(e) if status.is_success() => Err(ComError::Json(e)),
        Err(_) => Err(ComError::Status(status)),
    }
}

impl MeasureBackend for MeasureClient {
    async fn upload_image(
        &self,
        file: &SelectedFile,
        params: &ProcessingParams,
    ) -> Result<ProcessingResponse, ComError> {
        let limit = self.config.max_upload_bytes();
        if file.len() > limit {
            return Err(ComError::PayloadTooLarge {
                size: file.len(),
                limit,
            });
        }

        let part = Part::bytes(file.data().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.content_type())?;
        let mut form = Form::new().part("file", part);
        for (name, value) in params.fields() {
            form = form.text(name, value);
        }

        let uri = self.endpoint(UPLOAD_IMAGE_PATH)?;
        log::info!("Uploading {} ({} bytes) to {}", file.name(), file.len(), uri);
        self.send(UPLOAD_IMAGE_PATH, self.http.post(uri.to_string()).multipart(form))
            .await
    }

    async fn process_image(
        &self,
        image_data: &str,
        params: &ProcessingParams,
    ) -> Result<ProcessingResponse, ComError> {
        let request = ProcessImageRequest::new(image_data, params);

        let uri = self.endpoint(PROCESS_IMAGE_PATH)?;
        log::info!("Sending captured frame ({} bytes) to {}", image_data.len(), uri);
        self.send(PROCESS_IMAGE_PATH, self.http.post(uri.to_string()).json(&request))
            .await
    }
}
