use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use docsift_contract::{ErrorBody, UploadFailed};
use docsift_extract::ExtractionError;
use docsift_storage::PersistenceError;
use docsift_upload::TempStorageError;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file uploaded")]
    NoFile,
    #[error("Unsupported file type")]
    UnsupportedType(String),
    #[error("Multiple file fields are not allowed")]
    MultipleFiles,
    #[error("{message}")]
    MalformedUpload { status: StatusCode, message: String },
    #[error(transparent)]
    TempStorage(#[from] TempStorageError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl UploadError {
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::NoFile | UploadError::UnsupportedType(_) | UploadError::MultipleFiles => {
                StatusCode::BAD_REQUEST
            }
            UploadError::MalformedUpload { status, .. } => *status,
            UploadError::TempStorage(_)
            | UploadError::Extraction(_)
            | UploadError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn is_rejection(&self) -> bool {
        self.status().is_client_error()
    }

    /// Client errors get `{"error"}`; server failures also carry the
    /// upload id so the caller can correlate.
    pub fn into_reply(self, upload_id: &str) -> Response {
        let status = self.status();
        let message = self.to_string();

        if self.is_rejection() {
            info!(upload_id = %upload_id, status = status.as_u16(), reason = %message, "upload rejected");
            return (status, Json(ErrorBody { error: message })).into_response();
        }

        error!(upload_id = %upload_id, error = %message, "upload failed");
        let body = UploadFailed::new(message, upload_id.to_string());
        (status, Json(body)).into_response()
    }
}
