use rusqlite::{Connection, OptionalExtension, Transaction};

use super::reset::{reset_all, Dialect};
use super::schema_gen::{generate_create_table, generate_indexes};
use crate::parser::{Record, RecordSink, StagedId};
use crate::schema::TableSchema;
use crate::{Error, Result};

/// The single storage connection owned by the batch driver
pub struct Database {
    conn: Connection,
    dialect: Dialect,
    transactions: usize,
}

impl Database {
    /// Open (or create) the database behind `url`. Only SQLite URLs and bare
    /// paths have a driver; `:memory:` opens an in-memory database.
    pub fn open(url: &str) -> Result<Self> {
        let dialect = Dialect::from_url(url);
        if dialect != Dialect::Sqlite {
            return Err(Error::UnsupportedDialect(dialect.to_string()));
        }

        let path = sqlite_path(url);
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };

        Self::with_connection(conn, dialect)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, Dialect::Sqlite)
    }

    fn with_connection(conn: Connection, dialect: Dialect) -> Result<Self> {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )?;
        Ok(Self {
            conn,
            dialect,
            transactions: 0,
        })
    }

    /// Create all tables for the given schemas, parents first
    pub fn create_tables(&self, schemas: &[&TableSchema]) -> Result<()> {
        for schema in schemas {
            self.conn.execute(&generate_create_table(schema), [])?;

            for index_sql in generate_indexes(schema) {
                self.conn.execute(&index_sql, [])?;
            }
        }

        tracing::debug!("Ensured {} tables", schemas.len());
        Ok(())
    }

    /// Id of the source file already imported with this content hash
    pub fn find_file_by_hash(&self, hash: &str) -> Result<Option<i64>> {
        self.conn
            .query_row("SELECT id FROM source_file WHERE hash = ?1", [hash], |row| {
                row.get(0)
            })
            .optional()
            .map_err(Into::into)
    }

    pub fn count_rows(&self, table: &str) -> Result<i64> {
        let count = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
        Ok(count)
    }

    /// Start a unit of work; dropping the session without committing rolls
    /// it back
    pub fn begin(&mut self) -> Result<Session<'_>> {
        let tx = self.conn.transaction()?;
        self.transactions += 1;
        Ok(Session {
            tx,
            staged: Vec::new(),
            flushed: 0,
        })
    }

    /// Empty every table in `tables` using this connection's dialect
    pub fn reset(&self, tables: &[&'static TableSchema]) -> Result<usize> {
        reset_all(&self.conn, &self.dialect, tables)
    }

    /// Import transactions opened on this connection so far
    pub fn transactions_begun(&self) -> usize {
        self.transactions
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

/// Filesystem path (or `:memory:`) behind a SQLite URL
pub fn sqlite_path(url: &str) -> &str {
    url.strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite3://"))
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url)
}

/// One file's transaction. Records are staged in memory and written on
/// [`RecordSink::flush`] or [`Session::commit`].
pub struct Session<'conn> {
    tx: Transaction<'conn>,
    staged: Vec<Record>,
    flushed: usize,
}

impl<'conn> Session<'conn> {
    /// Stage and immediately flush a record, returning its id
    pub fn insert(&mut self, record: Record) -> Result<i64> {
        let table = record.table().name;
        let staged = self.stage(record)?;
        self.flush()?;
        self.surrogate_id(staged)
            .ok_or_else(|| Error::MissingSurrogateId(table.to_string()))
    }

    /// Flush pending records and commit. Returns the number of rows written.
    pub fn commit(mut self) -> Result<usize> {
        self.flush()?;
        let written = self.staged.len();
        self.tx.commit()?;
        Ok(written)
    }

    pub fn rollback(self) -> Result<()> {
        self.tx.rollback()?;
        Ok(())
    }

    pub fn pending(&self) -> usize {
        self.staged.len() - self.flushed
    }
}

impl RecordSink for Session<'_> {
    fn stage(&mut self, record: Record) -> Result<StagedId> {
        self.staged.push(record);
        Ok(StagedId::new(self.staged.len() - 1))
    }

    fn flush(&mut self) -> Result<()> {
        let tx = &self.tx;
        for record in &mut self.staged[self.flushed..] {
            let id = insert_record(tx, record)?;
            record.assign_id(id);
            self.flushed += 1;
        }
        Ok(())
    }

    fn surrogate_id(&self, staged: StagedId) -> Option<i64> {
        self.staged.get(staged.index()).and_then(Record::id)
    }
}

/// Insert one record and return its generated id
fn insert_record(tx: &Transaction, record: &Record) -> Result<i64> {
    let table = record.table().name;
    let sql = if record.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES", table)
    } else {
        let columns: Vec<&str> = record.values().map(|(c, _)| c).collect();
        let placeholders: Vec<&str> = columns.iter().map(|_| "?").collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders.join(", ")
        )
    };

    let mut stmt = tx.prepare_cached(&sql)?;
    for (idx, (_, value)) in record.values().enumerate() {
        value.bind_to(idx + 1, &mut stmt)?;
    }
    stmt.raw_execute()?;

    Ok(tx.last_insert_rowid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SqlValue;
    use crate::schema::tables::{JINGJIBIAO, SOURCE_FILE, ZBXX};

    fn database() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_tables(&[&SOURCE_FILE, &JINGJIBIAO, &ZBXX]).unwrap();
        db
    }

    fn source_file(hash: &str) -> Record {
        let mut record = Record::new(&SOURCE_FILE);
        record.set("filename", SqlValue::Text("a.13jt".into()));
        record.set("hash", SqlValue::Text(hash.into()));
        record
    }

    #[test]
    fn test_flush_assigns_ids_in_stage_order() {
        let mut db = database();
        let mut session = db.begin().unwrap();
        let file_id = session.insert(source_file("h1")).unwrap();

        let mut first = Record::new(&JINGJIBIAO);
        first.set("file_id", SqlValue::Integer(file_id));
        let a = session.stage(first.clone()).unwrap();
        let b = session.stage(first).unwrap();
        assert_eq!(session.surrogate_id(a), None);
        assert_eq!(session.pending(), 2);

        session.flush().unwrap();
        let (a, b) = (session.surrogate_id(a).unwrap(), session.surrogate_id(b).unwrap());
        assert!(a < b);
        assert_eq!(session.commit().unwrap(), 3);
        assert_eq!(db.count_rows("origin_jingjibiao").unwrap(), 2);
    }

    #[test]
    fn test_dropped_session_rolls_back() {
        let mut db = database();
        {
            let mut session = db.begin().unwrap();
            session.insert(source_file("h1")).unwrap();
        }
        assert_eq!(db.count_rows("source_file").unwrap(), 0);
        assert_eq!(db.find_file_by_hash("h1").unwrap(), None);
        assert_eq!(db.transactions_begun(), 1);
    }

    #[test]
    fn test_foreign_keys_are_enforced() {
        let mut db = database();
        let mut session = db.begin().unwrap();
        let mut orphan = Record::new(&ZBXX);
        orphan.set("jingjibiao_id", SqlValue::Integer(42));
        assert!(matches!(session.insert(orphan), Err(Error::Storage(_))));
    }

    #[test]
    fn test_empty_record_uses_default_values() {
        let mut db = database();
        let mut session = db.begin().unwrap();
        let id = session.insert(Record::new(&JINGJIBIAO)).unwrap();
        assert!(id > 0);
    }

    #[test]
    fn test_open_rejects_other_dialects() {
        assert!(matches!(
            Database::open("mysql://localhost/jt13"),
            Err(Error::UnsupportedDialect(ref d)) if d == "mysql"
        ));
        assert!(Database::open("sqlite://:memory:").is_ok());
    }
}
