use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use docsift_contract::{ExtractionResult, FileKind};
use thiserror::Error;

use crate::csv_rows::CsvExtractor;
use crate::pdf_text::PdfExtractor;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to read uploaded file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse PDF: {0}")]
    Pdf(String),
    #[error("failed to parse CSV: {0}")]
    Csv(String),
    #[error("extraction aborted: {0}")]
    Aborted(String),
}

/// Turns an uploaded file into structured content.
#[async_trait]
pub trait Extractor: Send + Sync {
    fn kind(&self) -> FileKind;

    async fn extract(&self, path: &Path) -> Result<ExtractionResult, ExtractionError>;
}

/// One extractor per supported file kind.
#[derive(Clone)]
pub struct ExtractorSet {
    pdf: Arc<dyn Extractor>,
    csv: Arc<dyn Extractor>,
}

impl ExtractorSet {
    pub fn new(pdf: Arc<dyn Extractor>, csv: Arc<dyn Extractor>) -> Self {
        Self { pdf, csv }
    }

    pub fn for_kind(&self, kind: FileKind) -> &dyn Extractor {
        match kind {
            FileKind::Pdf => self.pdf.as_ref(),
            FileKind::Csv => self.csv.as_ref(),
        }
    }
}

impl Default for ExtractorSet {
    fn default() -> Self {
        Self::new(Arc::new(PdfExtractor), Arc::new(CsvExtractor))
    }
}
