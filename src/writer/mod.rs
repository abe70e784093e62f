pub mod reset;
pub mod schema_gen;
pub mod sqlite;

pub use reset::{reset_all, ConstraintToggle, Dialect, SqlExecutor};
pub use sqlite::{sqlite_path, Database, Session};
