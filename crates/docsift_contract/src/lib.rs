pub mod model;
pub mod payload;

pub use model::{
    CsvRow, CsvTable, ExtractionResult, FileId, FileKind, NewUploadRecord, PdfText, RecordStatus,
    UploadId, UploadRecord,
};
pub use payload::{preview, ErrorBody, HealthReport, UploadAccepted, UploadFailed};
