//! # jt13-import
//!
//! Imports 13jt bid/budget XML deliverables into a relational schema without
//! per-tag mapping code:
//! - tables are discovered by name prefix from a static catalog
//! - every XML element whose tag names a table becomes one row
//! - rows carry the ids of every matched ancestor as foreign keys
//! - each source file is imported in its own transaction

pub mod cli;
pub mod config;
pub mod importer;
pub mod parser;
pub mod schema;
pub mod ui;
pub mod writer;

pub use cli::{Cli, Commands};
pub use importer::{import_file, run_batch, BatchSummary, ImportOutcome};
pub use schema::{RelationDescriptor, SchemaRegistry};
pub use ui::{ConsoleUi, Phase, SilentUi, Ui};
pub use writer::{Database, Dialect};

/// Result type alias for importer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for importer operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Duplicate file: content hash {hash} already imported as source_file {existing_id}")]
    DuplicateFile { hash: String, existing_id: i64 },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("File is not valid {0}")]
    Encoding(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No surrogate id available for {0} after flush")]
    MissingSurrogateId(String),

    #[error("Missing root relation: catalog has no `{0}` table")]
    MissingRootRelation(String),

    #[error("Reset failed at `{statement}`: {source}")]
    Reset {
        statement: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Circular dependency detected at: {0}")]
    CircularDependency(String),

    #[error("Unsupported database dialect: {0}")]
    UnsupportedDialect(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
