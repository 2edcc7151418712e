use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{
        multipart::{Multipart, MultipartError, MultipartRejection},
        DefaultBodyLimit, State,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use docsift_contract::HealthReport;
use docsift_extract::ExtractorSet;
use docsift_storage::PersistenceSink;
use docsift_upload::{TempStorage, UploadRequest};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::debug;
use uuid::Uuid;

use crate::error::UploadError;
use crate::pipeline::process_upload;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

const FILE_FIELD: &str = "file";
const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";
const FALLBACK_FILE_NAME: &str = "unknown";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub max_upload_bytes: usize,
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            static_dir: None,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub temp: TempStorage,
    pub extractors: ExtractorSet,
    pub sink: Option<Arc<dyn PersistenceSink>>,
    pub config: Arc<ServerConfig>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        temp: TempStorage,
        sink: Option<Arc<dyn PersistenceSink>>,
        config: ServerConfig,
    ) -> Self {
        Self {
            temp,
            extractors: ExtractorSet::default(),
            sink,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    pub fn with_extractors(mut self, extractors: ExtractorSet) -> Self {
        self.extractors = extractors;
        self
    }
}

pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    let router = Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload).layer(upload_limit));

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthReport {
        status: "ok".to_string(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let upload_id = Uuid::now_v7().to_string();

    let request = match read_upload(multipart).await {
        Ok(request) => request,
        Err(err) => return err.into_reply(&upload_id),
    };

    debug!(
        upload_id = %upload_id,
        file_name = %request.file_name,
        media_type = %request.media_type,
        bytes = request.payload.len(),
        "upload received"
    );

    match process_upload(&state, &upload_id, request).await {
        Ok(accepted) => Json(accepted).into_response(),
        Err(err) => err.into_reply(&upload_id),
    }
}

/// Pulls the single `file` part out of the form. Anything that is not a
/// multipart body counts as a request without a file.
async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadRequest, UploadError> {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            debug!(reason = %rejection.body_text(), "request is not multipart");
            return Err(UploadError::NoFile);
        }
    };

    let mut request: Option<UploadRequest> = None;
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        if field.name() != Some(FILE_FIELD) || field.file_name().is_none() {
            continue;
        }
        if request.is_some() {
            return Err(UploadError::MultipleFiles);
        }

        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_FILE_NAME)
            .to_string();
        let media_type = field
            .content_type()
            .unwrap_or(FALLBACK_MEDIA_TYPE)
            .to_string();
        let payload = field.bytes().await.map_err(malformed)?;

        request = Some(UploadRequest {
            media_type,
            file_name,
            payload,
        });
    }

    request.ok_or(UploadError::NoFile)
}

fn malformed(err: MultipartError) -> UploadError {
    UploadError::MalformedUpload {
        status: err.status(),
        message: err.body_text(),
    }
}
