pub mod detect;
pub mod importer;
pub mod logging;
pub mod matching;
pub mod slug;

pub use detect::{DuplicateDetector, DuplicateReport};
pub use importer::{ImportCounts, ImportSummary, TransactionalImporter};
