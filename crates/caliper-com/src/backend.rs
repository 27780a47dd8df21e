use crate::{ComError, ProcessingParams, ProcessingResponse, SelectedFile};

/// The two processing endpoints, as seen by the controller.
#[allow(async_fn_in_trait)]
pub trait MeasureBackend {
    /// `POST /upload_image`: the file plus parameters as a multipart form.
    async fn upload_image(
        &self,
        file: &SelectedFile,
        params: &ProcessingParams,
    ) -> Result<ProcessingResponse, ComError>;

    /// `POST /process_image`: a `data:` URI plus parameters as JSON.
    async fn process_image(
        &self,
        image_data: &str,
        params: &ProcessingParams,
    ) -> Result<ProcessingResponse, ComError>;
}
