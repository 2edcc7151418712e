use docsift_contract::{ExtractionResult, NewUploadRecord, UploadAccepted};
use docsift_extract::{select, Dispatch};
use docsift_upload::UploadRequest;
use tracing::{debug, info};

use crate::app::AppState;
use crate::error::UploadError;

/// Runs one upload through store, dispatch, extract, release and the
/// optional persist step, in that order.
///
/// The temp file is released on every path once it has been written:
/// explicitly on rejection and after extraction, and by the handle's drop
/// guard if this future is abandoned midway.
pub async fn process_upload(
    state: &AppState,
    upload_id: &str,
    request: UploadRequest,
) -> Result<UploadAccepted, UploadError> {
    let UploadRequest {
        media_type,
        file_name,
        payload,
    } = request;

    let mut temp = state.temp.store(payload).await?;
    debug!(upload_id = %upload_id, path = %temp.path().display(), "upload stored");

    let kind = match select(&media_type) {
        Dispatch::Extract(kind) => kind,
        Dispatch::Rejected => {
            temp.release().await;
            return Err(UploadError::UnsupportedType(media_type));
        }
    };

    let extracted = state.extractors.for_kind(kind).extract(temp.path()).await;
    temp.release().await;
    let result = extracted?;

    let file_id = persist(state, upload_id, &file_name, &result).await?;

    info!(
        upload_id = %upload_id,
        file_name = %file_name,
        kind = %kind,
        count = result.count(),
        file_id = file_id.as_deref().unwrap_or("-"),
        "upload processed"
    );
    Ok(UploadAccepted::new(
        upload_id.to_string(),
        file_id,
        file_name,
        &result,
    ))
}

async fn persist(
    state: &AppState,
    upload_id: &str,
    file_name: &str,
    result: &ExtractionResult,
) -> Result<Option<String>, UploadError> {
    let Some(sink) = &state.sink else {
        return Ok(None);
    };
    let record = NewUploadRecord::completed(upload_id, file_name, result);
    let file_id = sink.persist(record).await?;
    Ok(Some(file_id))
}
