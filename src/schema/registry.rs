//! Tag -> relation lookup built once at startup

use super::dependencies::DependencyResolver;
use super::tables::ANCHOR_TABLE;
use super::types::TableSchema;
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};

/// A table that mirrors one XML tag, with its attribute map precomputed
#[derive(Debug, Clone)]
pub struct RelationDescriptor {
    schema: &'static TableSchema,
    tag: String,
    /// Lowercased attribute name -> column
    fields: HashMap<String, &'static str>,
    declared: HashSet<&'static str>,
}

impl RelationDescriptor {
    fn new(schema: &'static TableSchema, tag: String) -> Self {
        let fields = schema
            .data_columns()
            .map(|c| (c.name.to_lowercase(), c.name))
            .collect();
        let declared = schema
            .columns
            .iter()
            .map(|c| c.name)
            .filter(|name| *name != "id")
            .collect();

        Self {
            schema,
            tag,
            fields,
            declared,
        }
    }

    pub fn name(&self) -> &'static str {
        self.schema.name
    }

    /// Lowercased, un-prefixed table name
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn schema(&self) -> &'static TableSchema {
        self.schema
    }

    /// Column an attribute maps to, if any. `attribute` must be lowercased.
    pub fn field_for_attribute(&self, attribute: &str) -> Option<&'static str> {
        self.fields.get(attribute).copied()
    }

    /// Whether the table declares a column with this name (the surrogate key
    /// excluded)
    pub fn declares(&self, field: &str) -> bool {
        self.declared.contains(field)
    }

    /// Foreign key fields this relation may receive from its ancestors
    pub fn ancestor_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.schema.foreign_keys.iter().map(|fk| fk.column)
    }
}

/// The set of relations the importer can persist, keyed by XML tag
#[derive(Debug)]
pub struct SchemaRegistry {
    prefix: String,
    anchor: &'static TableSchema,
    relations: HashMap<String, RelationDescriptor>,
    /// Anchor plus every relation, parents first
    tracked: Vec<&'static TableSchema>,
}

impl SchemaRegistry {
    /// Keep every catalog table whose name carries `prefix`.
    ///
    /// Fails with [`Error::MissingRootRelation`] when the catalog has no
    /// source-file anchor: nothing could ever be imported without it.
    pub fn discover(catalog: &[&'static TableSchema], prefix: &str) -> Result<Self> {
        let anchor = catalog
            .iter()
            .find(|t| t.name == ANCHOR_TABLE)
            .copied()
            .ok_or_else(|| Error::MissingRootRelation(ANCHOR_TABLE.to_string()))?;

        let mut relations = HashMap::new();
        let mut tracked = vec![anchor];

        for table in catalog {
            if table.name == ANCHOR_TABLE {
                continue;
            }
            let Some(stripped) = table.name.strip_prefix(prefix) else {
                continue;
            };
            if stripped.is_empty() {
                continue;
            }

            let tag = stripped.to_lowercase();
            tracing::debug!("Registered relation {} for <{}>", table.name, tag);
            relations.insert(tag.clone(), RelationDescriptor::new(*table, tag));
            tracked.push(*table);
        }

        let tracked = DependencyResolver::new(&tracked).ordered()?;

        Ok(Self {
            prefix: prefix.to_string(),
            anchor,
            relations,
            tracked,
        })
    }

    /// Exact, case-insensitive match between an XML tag and a relation's
    /// un-prefixed name
    pub fn resolve(&self, tag: &str) -> Option<&RelationDescriptor> {
        match self.relations.get(tag) {
            Some(relation) => Some(relation),
            None => self.relations.get(&tag.to_lowercase()),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn anchor(&self) -> &'static TableSchema {
        self.anchor
    }

    /// Every table the importer writes to, parents before children
    pub fn tracked_tables(&self) -> &[&'static TableSchema] {
        &self.tracked
    }

    pub fn relations(&self) -> impl Iterator<Item = &RelationDescriptor> {
        self.relations.values()
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}
