use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use docsift_contract::{FileId, NewUploadRecord, UploadRecord};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("record store rejected write: {0}")]
    Rejected(String),
    #[error("failed to serialize extracted data: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("stored record is unreadable: {0}")]
    Corrupt(String),
}

/// Durable home for completed extractions. Writes are append-only.
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    /// Stores one record and returns the identifier the store assigned.
    async fn persist(&self, record: NewUploadRecord) -> Result<FileId, PersistenceError>;
}

/// Process-local sink. Can be switched offline to exercise failure paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryUploadStore {
    records: Arc<RwLock<Vec<UploadRecord>>>,
    offline: Arc<AtomicBool>,
}

impl MemoryUploadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub async fn records(&self) -> Vec<UploadRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl PersistenceSink for MemoryUploadStore {
    async fn persist(&self, record: NewUploadRecord) -> Result<FileId, PersistenceError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable(
                "in-memory store is offline".to_string(),
            ));
        }

        let file_id = Uuid::now_v7().to_string();
        self.records.write().await.push(UploadRecord {
            file_id: file_id.clone(),
            upload_id: record.upload_id,
            file_name: record.file_name,
            file_type: record.file_type,
            extracted_data: record.extracted_data,
            status: record.status,
            created_at: Utc::now(),
            count: record.count,
        });
        Ok(file_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsift_contract::{CsvTable, ExtractionResult, FileKind, RecordStatus};

    fn record(upload_id: &str) -> NewUploadRecord {
        let result = ExtractionResult::Csv(CsvTable::default());
        NewUploadRecord::completed(upload_id, "rows.csv", &result)
    }

    #[tokio::test]
    async fn memory_store_appends_completed_records() {
        let store = MemoryUploadStore::new();
        let first = store.persist(record("u-1")).await.unwrap();
        let second = store.persist(record("u-2")).await.unwrap();

        assert_ne!(first, second);
        let records = store.records().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].file_id, first);
        assert_eq!(records[0].file_type, FileKind::Csv);
        assert_eq!(records[1].status, RecordStatus::Completed);
    }

    #[tokio::test]
    async fn offline_memory_store_writes_nothing() {
        let store = MemoryUploadStore::new();
        store.set_offline(true);

        let err = store.persist(record("u-1")).await.unwrap_err();
        assert!(matches!(err, PersistenceError::Unavailable(_)));
        assert!(store.records().await.is_empty());
    }
}
