use serde::{Deserialize, Serialize};

use crate::model::{ExtractionResult, FileId, FileKind, UploadId};

const PDF_PREVIEW_CHARS: usize = 200;

/// Short human-readable summary of an extraction for the upload response.
pub fn preview(result: &ExtractionResult) -> String {
    match result {
        ExtractionResult::Pdf(pdf) => {
            let head: String = pdf.full_text().chars().take(PDF_PREVIEW_CHARS).collect();
            format!("{head}...")
        }
        ExtractionResult::Csv(table) => format!("{} rows", table.row_count()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadAccepted {
    pub success: bool,
    pub upload_id: UploadId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_id: Option<FileId>,
    pub file_name: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    pub preview: String,
}

impl UploadAccepted {
    pub fn new(
        upload_id: UploadId,
        file_id: Option<FileId>,
        file_name: String,
        result: &ExtractionResult,
    ) -> Self {
        Self {
            success: true,
            upload_id,
            file_id,
            file_name,
            kind: result.kind(),
            preview: preview(result),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadFailed {
    pub success: bool,
    pub error: String,
    pub upload_id: UploadId,
}

impl UploadFailed {
    pub fn new(error: String, upload_id: UploadId) -> Self {
        Self {
            success: false,
            error,
            upload_id,
        }
    }
}

/// Body for rejected requests (missing file, unsupported type).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthReport {
    pub status: String,
    pub uptime: f64,
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CsvRow, CsvTable, PdfText};
    use serde_json::json;

    #[test]
    fn pdf_preview_truncates_on_characters() {
        let text = "é".repeat(250);
        let result = ExtractionResult::Pdf(PdfText::from_pages(vec![text]));
        let preview = preview(&result);

        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 203);
    }

    #[test]
    fn short_pdf_text_still_gets_ellipsis() {
        let result = ExtractionResult::Pdf(PdfText::from_pages(vec!["hello".into()]));
        assert_eq!(preview(&result), "hello...");
    }

    #[test]
    fn csv_preview_counts_rows() {
        let rows = vec![CsvRow::new(), CsvRow::new()];
        let result = ExtractionResult::Csv(CsvTable::from_rows(rows));
        assert_eq!(preview(&result), "2 rows");
    }

    #[test]
    fn accepted_body_omits_missing_file_id() {
        let result = ExtractionResult::Csv(CsvTable::default());
        let body = UploadAccepted::new("u-1".into(), None, "data.csv".into(), &result);

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "success": true,
                "uploadId": "u-1",
                "fileName": "data.csv",
                "type": "csv",
                "preview": "0 rows"
            })
        );
    }

    #[test]
    fn failed_body_shape() {
        let body = UploadFailed::new("boom".into(), "u-2".into());
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "success": false, "error": "boom", "uploadId": "u-2" })
        );
    }
}
