//! Test helpers: build AppState and router for upload pipeline tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use docsift_contract::{CsvTable, ExtractionResult, FileKind};
use docsift_extract::{ExtractionError, Extractor};
use docsift_server::{build_router, AppState, ServerConfig};
use docsift_storage::{MemoryUploadStore, PersistenceSink};
use docsift_upload::TempStorage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tempfile::TempDir;

pub struct TestApp {
    pub server: TestServer,
    pub sink: Option<MemoryUploadStore>,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Files currently sitting in the upload temp directory.
    pub fn temp_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.upload_dir.path())
            .expect("read upload dir")
            .map(|entry| entry.expect("dir entry").path())
            .collect()
    }

    pub fn sink(&self) -> &MemoryUploadStore {
        self.sink.as_ref().expect("test app built without a sink")
    }
}

pub struct TestAppBuilder {
    sink: Option<MemoryUploadStore>,
    config: ServerConfig,
    extractor_override: Option<Arc<dyn Extractor>>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            sink: None,
            config: ServerConfig::default(),
            extractor_override: None,
        }
    }

    pub fn with_memory_sink(mut self) -> Self {
        self.sink = Some(MemoryUploadStore::new());
        self
    }

    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the CSV extractor.
    pub fn with_csv_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractor_override = Some(extractor);
        self
    }

    pub fn build(self) -> TestApp {
        let upload_dir = tempfile::tempdir().expect("upload dir");
        let sink = self
            .sink
            .clone()
            .map(|store| Arc::new(store) as Arc<dyn PersistenceSink>);

        let mut state = AppState::new(TempStorage::new(upload_dir.path()), sink, self.config);
        if let Some(csv) = self.extractor_override {
            let extractors = docsift_extract::ExtractorSet::new(
                Arc::new(docsift_extract::PdfExtractor),
                csv,
            );
            state = state.with_extractors(extractors);
        }

        let app = build_router(state);
        let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");
        TestApp {
            server,
            sink: self.sink,
            upload_dir,
        }
    }
}

pub fn file_form(file_name: &str, mime_type: &str, contents: &[u8]) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::copy_from_slice(contents))
        .file_name(file_name)
        .mime_type(mime_type);
    MultipartForm::new().add_part("file", part)
}

pub fn csv_form(file_name: &str, contents: &str) -> MultipartForm {
    file_form(file_name, "text/csv", contents.as_bytes())
}

/// CSV extractor stand-in that records the temp path it was handed and
/// whether the file existed at that moment.
#[derive(Default)]
pub struct RecordingExtractor {
    pub seen: Mutex<Vec<(PathBuf, bool, Vec<u8>)>>,
    pub fail_with: Option<String>,
}

impl RecordingExtractor {
    pub fn failing(message: &str) -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }

    pub fn seen(&self) -> Vec<(PathBuf, bool, Vec<u8>)> {
        self.seen.lock().expect("seen lock").clone()
    }
}

#[async_trait]
impl Extractor for RecordingExtractor {
    fn kind(&self) -> FileKind {
        FileKind::Csv
    }

    async fn extract(&self, path: &Path) -> Result<ExtractionResult, ExtractionError> {
        let contents = std::fs::read(path).unwrap_or_default();
        self.seen
            .lock()
            .expect("seen lock")
            .push((path.to_path_buf(), path.exists(), contents));

        match &self.fail_with {
            Some(message) => Err(ExtractionError::Csv(message.clone())),
            None => Ok(ExtractionResult::Csv(CsvTable::default())),
        }
    }
}

/// Builds a PDF with one page of Courier text per entry in `lines`.
pub fn pdf_with_pages(lines: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for line in lines {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(*line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode page content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Count" => kids.len() as i64,
        "Kids" => kids,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).expect("serialize pdf");
    out
}
