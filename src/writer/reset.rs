//! Bulk reset of every tracked table before a fresh import
//!
//! Each storage engine switches foreign key enforcement differently, so the
//! toggle is a small strategy chosen by [`Dialect`]. Engines without a known
//! toggle rely on children-first delete order alone.

use std::fmt;

use rusqlite::Connection;

use crate::schema::{DependencyResolver, TableSchema};
use crate::{Error, Result};

/// Storage engine family, resolved once from the database URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    MySql,
    Other(String),
}

impl Dialect {
    /// `sqlite://…`, `sqlite:…` and bare paths are SQLite; `mysql://…`,
    /// `mysql+driver://…` and `mariadb://…` are MySQL.
    pub fn from_url(url: &str) -> Self {
        let Some((scheme, _)) = url.split_once("://") else {
            return Dialect::Sqlite;
        };
        let engine = scheme
            .split('+')
            .next()
            .unwrap_or(scheme)
            .to_ascii_lowercase();

        match engine.as_str() {
            "sqlite" | "sqlite3" => Dialect::Sqlite,
            "mysql" | "mariadb" => Dialect::MySql,
            _ => Dialect::Other(engine),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Dialect::Sqlite => "sqlite",
            Dialect::MySql => "mysql",
            Dialect::Other(name) => name,
        }
    }

    pub fn constraint_toggle(&self) -> &'static dyn ConstraintToggle {
        match self {
            Dialect::Sqlite => &SqlitePragma,
            Dialect::MySql => &MySqlChecks,
            Dialect::Other(_) => &OrderedDeletes,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Engine-specific statements that switch foreign key enforcement
pub trait ConstraintToggle {
    fn disable(&self) -> Option<&'static str>;
    fn enable(&self) -> Option<&'static str>;
}

pub struct SqlitePragma;

impl ConstraintToggle for SqlitePragma {
    fn disable(&self) -> Option<&'static str> {
        Some("PRAGMA foreign_keys = OFF")
    }

    fn enable(&self) -> Option<&'static str> {
        Some("PRAGMA foreign_keys = ON")
    }
}

pub struct MySqlChecks;

impl ConstraintToggle for MySqlChecks {
    fn disable(&self) -> Option<&'static str> {
        Some("SET FOREIGN_KEY_CHECKS = 0")
    }

    fn enable(&self) -> Option<&'static str> {
        Some("SET FOREIGN_KEY_CHECKS = 1")
    }
}

/// Leaves enforcement on; delete order has to satisfy every constraint
pub struct OrderedDeletes;

impl ConstraintToggle for OrderedDeletes {
    fn disable(&self) -> Option<&'static str> {
        None
    }

    fn enable(&self) -> Option<&'static str> {
        None
    }
}

/// Anything that can run a single SQL statement
pub trait SqlExecutor {
    fn execute_sql(&self, sql: &str) -> rusqlite::Result<()>;
}

impl SqlExecutor for Connection {
    fn execute_sql(&self, sql: &str) -> rusqlite::Result<()> {
        self.execute_batch(sql)
    }
}

fn run(executor: &impl SqlExecutor, sql: &str) -> Result<()> {
    tracing::debug!("reset: {}", sql);
    executor.execute_sql(sql).map_err(|source| Error::Reset {
        statement: sql.to_string(),
        source,
    })
}

/// Delete every row of `tables`, children first. Returns the number of
/// tables emptied.
pub fn reset_all(
    executor: &impl SqlExecutor,
    dialect: &Dialect,
    tables: &[&'static TableSchema],
) -> Result<usize> {
    let order = DependencyResolver::new(tables).reverse_ordered()?;
    let toggle = dialect.constraint_toggle();

    tracing::info!("Resetting {} tables ({} dialect)", order.len(), dialect);

    if let Some(sql) = toggle.disable() {
        run(executor, sql)?;
    }

    let deleted = delete_rows(executor, &order);

    // Re-enable even when a delete failed so the connection isn't left
    // without enforcement
    let enabled = match toggle.enable() {
        Some(sql) => run(executor, sql),
        None => Ok(()),
    };

    deleted?;
    enabled?;
    Ok(order.len())
}

fn delete_rows(executor: &impl SqlExecutor, order: &[&'static TableSchema]) -> Result<()> {
    run(executor, "BEGIN")?;
    for table in order {
        if let Err(e) = run(executor, &format!("DELETE FROM {}", table.name)) {
            executor.execute_sql("ROLLBACK").ok();
            return Err(e);
        }
    }
    // A failed COMMIT leaves the transaction open, and the SQLite pragma that
    // re-enables enforcement is a no-op inside one
    run(executor, "COMMIT").inspect_err(|_| {
        executor.execute_sql("ROLLBACK").ok();
    })
}
