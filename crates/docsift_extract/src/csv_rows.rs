use std::path::{Path, PathBuf};

use async_trait::async_trait;
use csv::{ByteRecord, ReaderBuilder};
use docsift_contract::{CsvRow, CsvTable, ExtractionResult, FileKind};
use tracing::debug;

use crate::extractor::{ExtractionError, Extractor};

/// Streams a CSV file record by record, keying each row by the header line.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExtractor;

impl CsvExtractor {
    /// Reads every row or none. The reader owns the file handle, so it is
    /// closed on each return path. Bytes that are not UTF-8 decode to U+FFFD
    /// instead of failing the file.
    pub fn read_rows(path: &Path) -> Result<CsvTable, ExtractionError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(csv_error)?;
        let headers: Vec<String> = reader
            .byte_headers()
            .map_err(csv_error)?
            .iter()
            .map(decode)
            .collect();

        let mut rows = Vec::new();
        let mut record = ByteRecord::new();
        while reader.read_byte_record(&mut record).map_err(csv_error)? {
            rows.push(row_from_record(&headers, &record));
        }

        Ok(CsvTable::from_rows(rows))
    }
}

#[async_trait]
impl Extractor for CsvExtractor {
    fn kind(&self) -> FileKind {
        FileKind::Csv
    }

    async fn extract(&self, path: &Path) -> Result<ExtractionResult, ExtractionError> {
        let path: PathBuf = path.to_path_buf();
        let table = tokio::task::spawn_blocking(move || Self::read_rows(&path))
            .await
            .map_err(|err| ExtractionError::Aborted(err.to_string()))??;

        debug!(rows = table.row_count(), "csv rows extracted");
        Ok(ExtractionResult::Csv(table))
    }
}

/// Cells past the header get positional `_<index>` keys; missing trailing
/// cells are left out.
fn row_from_record(headers: &[String], record: &ByteRecord) -> CsvRow {
    record
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let key = match headers.get(index) {
                Some(name) => name.clone(),
                None => format!("_{index}"),
            };
            (key, decode(value))
        })
        .collect()
}

fn decode(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}

fn csv_error(err: csv::Error) -> ExtractionError {
    ExtractionError::Csv(err.to_string())
}
