mod app;
mod error;
mod pipeline;

pub use app::{build_router, AppState, ServerConfig, DEFAULT_MAX_UPLOAD_BYTES};
pub use error::UploadError;
pub use pipeline::process_upload;
