pub mod repository;
pub mod sink;

pub use repository::{SqliteUploadStore, StorageConfig};
pub use sink::{MemoryUploadStore, PersistenceError, PersistenceSink};
