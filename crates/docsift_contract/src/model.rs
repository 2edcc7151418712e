use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type UploadId = String;
pub type FileId = String;

/// One CSV data line keyed by header name, in header order.
pub type CsvRow = IndexMap<String, String>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Csv,
}

impl FileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Csv => "csv",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text pulled out of a PDF. The page count is derived from the pages the
/// parser reported and cannot be set on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfText {
    full_text: String,
    page_count: usize,
}

impl PdfText {
    pub const PAGE_SEPARATOR: &'static str = "\n\n";

    pub fn from_pages(pages: Vec<String>) -> Self {
        let page_count = pages.len();
        Self {
            full_text: pages.join(Self::PAGE_SEPARATOR),
            page_count,
        }
    }

    pub fn full_text(&self) -> &str {
        &self.full_text
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }
}

/// Rows read from a CSV file, first line used as the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    rows: Vec<CsvRow>,
}

impl CsvTable {
    pub fn from_rows(rows: Vec<CsvRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[CsvRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn into_rows(self) -> Vec<CsvRow> {
        self.rows
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    Pdf(PdfText),
    Csv(CsvTable),
}

impl ExtractionResult {
    pub fn kind(&self) -> FileKind {
        match self {
            ExtractionResult::Pdf(_) => FileKind::Pdf,
            ExtractionResult::Csv(_) => FileKind::Csv,
        }
    }

    /// Page count for PDFs, row count for CSVs.
    pub fn count(&self) -> usize {
        match self {
            ExtractionResult::Pdf(pdf) => pdf.page_count(),
            ExtractionResult::Csv(table) => table.row_count(),
        }
    }

    /// The extracted content as stored: PDF text as a JSON string, CSV rows
    /// as an array of objects.
    pub fn content_value(&self) -> Value {
        match self {
            ExtractionResult::Pdf(pdf) => Value::String(pdf.full_text().to_string()),
            ExtractionResult::Csv(table) => Value::Array(
                table
                    .rows()
                    .iter()
                    .map(|row| {
                        Value::Object(
                            row.iter()
                                .map(|(key, value)| (key.clone(), Value::String(value.clone())))
                                .collect(),
                        )
                    })
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Completed,
}

impl RecordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordStatus::Completed => "completed",
        }
    }
}

/// What the pipeline hands to a persistence sink. Identifier and creation
/// time are assigned by the sink.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUploadRecord {
    pub upload_id: UploadId,
    pub file_name: String,
    pub file_type: FileKind,
    pub extracted_data: Value,
    pub status: RecordStatus,
    pub count: usize,
}

impl NewUploadRecord {
    pub fn completed(upload_id: &str, file_name: &str, result: &ExtractionResult) -> Self {
        Self {
            upload_id: upload_id.to_string(),
            file_name: file_name.to_string(),
            file_type: result.kind(),
            extracted_data: result.content_value(),
            status: RecordStatus::Completed,
            count: result.count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    pub file_id: FileId,
    pub upload_id: UploadId,
    pub file_name: String,
    pub file_type: FileKind,
    pub extracted_data: Value,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub count: usize,
}
