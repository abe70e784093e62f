use std::collections::BTreeMap;

use crate::schema::{RelationDescriptor, TableSchema};

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Integer(i64),
    Text(String),
}

impl SqlValue {
    pub fn bind_to(&self, idx: usize, stmt: &mut rusqlite::Statement) -> rusqlite::Result<()> {
        match self {
            SqlValue::Integer(i) => stmt.raw_bind_parameter(idx, i)?,
            SqlValue::Text(s) => stmt.raw_bind_parameter(idx, s.as_str())?,
        }
        Ok(())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

/// A row staged for insertion into one table
#[derive(Debug, Clone)]
pub struct Record {
    table: &'static TableSchema,
    values: BTreeMap<&'static str, SqlValue>,
    id: Option<i64>,
}

impl Record {
    pub fn new(table: &'static TableSchema) -> Self {
        Self {
            table,
            values: BTreeMap::new(),
            id: None,
        }
    }

    pub fn table(&self) -> &'static TableSchema {
        self.table
    }

    pub fn set(&mut self, column: &'static str, value: SqlValue) {
        self.values.insert(column, value);
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.values.get(column)
    }

    /// Columns with a value, in column-name order
    pub fn values(&self) -> impl Iterator<Item = (&'static str, &SqlValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Surrogate key; `None` until the record has been flushed
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

/// Build an unsaved record from an element's attributes.
///
/// Attribute names are matched case-insensitively against the relation's data
/// columns and stored verbatim as text. Attributes without a matching column
/// are dropped so documents may carry fields the schema doesn't know yet.
pub fn build_record<'a, I>(relation: &RelationDescriptor, attributes: I) -> Record
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut record = Record::new(relation.schema());

    for (name, value) in attributes {
        match relation.field_for_attribute(&name.to_lowercase()) {
            Some(column) => record.set(column, SqlValue::Text(value.to_string())),
            None => tracing::trace!("Dropping <{}> attribute {}", relation.tag(), name),
        }
    }

    record
}
