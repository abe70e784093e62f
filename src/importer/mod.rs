pub mod batch;
pub mod report;
pub mod transaction;

pub use batch::{collect_source_files, has_extension, run_batch, BatchSummary};
pub use report::{write_report, BatchReport};
pub use transaction::{content_hash, import_file, ImportOutcome};
