use docsift_contract::FileKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Extract(FileKind),
    Rejected,
}

/// Picks the extractor for a declared media type by substring. PDF wins
/// when a type mentions both.
pub fn select(media_type: &str) -> Dispatch {
    let media_type = media_type.to_ascii_lowercase();
    match (media_type.contains("pdf"), media_type.contains("csv")) {
        (true, _) => Dispatch::Extract(FileKind::Pdf),
        (false, true) => Dispatch::Extract(FileKind::Csv),
        (false, false) => Dispatch::Rejected,
    }
}
