use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use docsift_contract::{FileId, FileKind, NewUploadRecord, RecordStatus, UploadRecord};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;
use tracing::info;
use uuid::Uuid;

use crate::sink::{PersistenceError, PersistenceSink};

const SCHEMA_SQL: &str = include_str!("sql/schema.sql");

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub sqlite_path: String,
}

#[derive(Debug, Clone)]
pub struct SqliteUploadStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone, FromRow)]
struct UploadRow {
    file_id: String,
    upload_id: String,
    file_name: String,
    file_type: String,
    extracted_data_json: String,
    status: String,
    item_count: i64,
    created_at: String,
}

impl SqliteUploadStore {
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        let uri = normalize_sqlite_uri(&config.sqlite_path);
        let options = SqliteConnectOptions::from_str(&uri)
            .with_context(|| format!("invalid sqlite URI: {}", uri))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("failed to connect sqlite pool")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA_SQL.split(';') {
            let sql = statement.trim();
            if sql.is_empty() {
                continue;
            }
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("migration failed for statement: {sql}"))?;
        }
        info!("docsift sqlite schema ready");
        Ok(())
    }

    pub async fn insert(&self, record: &NewUploadRecord) -> Result<FileId, PersistenceError> {
        let file_id = Uuid::now_v7().to_string();
        let extracted_data_json = serde_json::to_string(&record.extracted_data)?;
        let item_count = i64::try_from(record.count)
            .map_err(|_| PersistenceError::Rejected(format!("count {} out of range", record.count)))?;

        sqlx::query(
            "INSERT INTO extracted_files(file_id, upload_id, file_name, file_type, extracted_data_json, status, item_count) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&file_id)
        .bind(&record.upload_id)
        .bind(&record.file_name)
        .bind(record.file_type.as_str())
        .bind(&extracted_data_json)
        .bind(record.status.as_str())
        .bind(item_count)
        .execute(&self.pool)
        .await
        .map_err(classify)?;

        Ok(file_id)
    }

    pub async fn fetch(&self, file_id: &str) -> Result<Option<UploadRecord>, PersistenceError> {
        let row = sqlx::query_as::<_, UploadRow>(
            "SELECT file_id, upload_id, file_name, file_type, extracted_data_json, status, item_count, created_at FROM extracted_files WHERE file_id = ?",
        )
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)?;

        row.map(UploadRow::into_record).transpose()
    }

    pub async fn list_by_upload(&self, upload_id: &str) -> Result<Vec<UploadRecord>, PersistenceError> {
        let rows = sqlx::query_as::<_, UploadRow>(
            "SELECT file_id, upload_id, file_name, file_type, extracted_data_json, status, item_count, created_at FROM extracted_files WHERE upload_id = ? ORDER BY created_at ASC",
        )
        .bind(upload_id)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        rows.into_iter().map(UploadRow::into_record).collect()
    }
}

#[async_trait]
impl PersistenceSink for SqliteUploadStore {
    async fn persist(&self, record: NewUploadRecord) -> Result<FileId, PersistenceError> {
        self.insert(&record).await
    }
}

impl UploadRow {
    fn into_record(self) -> Result<UploadRecord, PersistenceError> {
        let file_type = match self.file_type.as_str() {
            "pdf" => FileKind::Pdf,
            "csv" => FileKind::Csv,
            other => {
                return Err(PersistenceError::Corrupt(format!("unknown file type {other}")));
            }
        };
        let status = match self.status.as_str() {
            "completed" => RecordStatus::Completed,
            other => return Err(PersistenceError::Corrupt(format!("unknown status {other}"))),
        };
        let extracted_data: Value = serde_json::from_str(&self.extracted_data_json)
            .map_err(|err| PersistenceError::Corrupt(format!("extracted data: {err}")))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|err| PersistenceError::Corrupt(format!("created_at: {err}")))?
            .with_timezone(&Utc);
        let count = usize::try_from(self.item_count)
            .map_err(|_| PersistenceError::Corrupt(format!("count {}", self.item_count)))?;

        Ok(UploadRecord {
            file_id: self.file_id,
            upload_id: self.upload_id,
            file_name: self.file_name,
            file_type,
            extracted_data,
            status,
            created_at,
            count,
        })
    }
}

fn classify(error: sqlx::Error) -> PersistenceError {
    match error {
        sqlx::Error::Database(db) => PersistenceError::Rejected(db.to_string()),
        other => PersistenceError::Unavailable(other.to_string()),
    }
}

fn normalize_sqlite_uri(raw: &str) -> String {
    if raw.starts_with("sqlite:") {
        raw.to_string()
    } else {
        format!("sqlite://{raw}")
    }
}
