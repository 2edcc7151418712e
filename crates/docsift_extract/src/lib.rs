pub mod csv_rows;
pub mod dispatch;
pub mod extractor;
pub mod pdf_text;

pub use csv_rows::CsvExtractor;
pub use dispatch::{select, Dispatch};
pub use extractor::{ExtractionError, Extractor, ExtractorSet};
pub use pdf_text::PdfExtractor;
