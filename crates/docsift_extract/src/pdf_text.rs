use std::path::Path;

use async_trait::async_trait;
use docsift_contract::{ExtractionResult, FileKind, PdfText};
use tracing::debug;

use crate::extractor::{ExtractionError, Extractor};

/// Reads the whole file and pulls text out page by page.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn extract_bytes(bytes: &[u8]) -> Result<PdfText, ExtractionError> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|err| ExtractionError::Pdf(err.to_string()))?;
        Ok(PdfText::from_pages(pages))
    }
}

#[async_trait]
impl Extractor for PdfExtractor {
    fn kind(&self) -> FileKind {
        FileKind::Pdf
    }

    async fn extract(&self, path: &Path) -> Result<ExtractionResult, ExtractionError> {
        let bytes = tokio::fs::read(path).await?;
        let size = bytes.len();

        // the parser is synchronous and may panic on hostile input
        let pdf = tokio::task::spawn_blocking(move || Self::extract_bytes(&bytes))
            .await
            .map_err(|err| ExtractionError::Aborted(err.to_string()))??;

        debug!(
            bytes = size,
            pages = pdf.page_count(),
            chars = pdf.full_text().len(),
            "pdf text extracted"
        );
        Ok(ExtractionResult::Pdf(pdf))
    }
}
