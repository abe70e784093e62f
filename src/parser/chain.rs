use super::record::{Record, SqlValue};
use crate::schema::RelationDescriptor;

/// One ancestor row: its surrogate id and the FK column that points at it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLink {
    pub id: i64,
    pub field: String,
}

/// Ancestor lineage carried down the element walk.
///
/// Extending returns a new chain and leaves the receiver untouched, so sibling
/// subtrees never see each other's entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForeignKeyChain {
    links: Vec<ChainLink>,
}

impl ForeignKeyChain {
    pub fn seed(id: i64, field: impl Into<String>) -> Self {
        Self::default().extend(id, field)
    }

    pub fn extend(&self, id: i64, field: impl Into<String>) -> Self {
        let mut links = Vec::with_capacity(self.links.len() + 1);
        links.extend_from_slice(&self.links);
        links.push(ChainLink {
            id,
            field: field.into(),
        });
        Self { links }
    }

    /// Set every chain field the record's relation declares. Entries the
    /// relation doesn't know are skipped; for repeated fields the nearest
    /// ancestor wins.
    pub fn apply(&self, relation: &RelationDescriptor, record: &mut Record) {
        let schema = relation.schema();
        for link in &self.links {
            if !relation.declares(&link.field) {
                continue;
            }
            if let Some(column) = schema.column(&link.field) {
                record.set(column.name, SqlValue::Integer(link.id));
            }
        }
    }

    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
