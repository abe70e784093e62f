//! Depth-first XML element walk
//!
//! Every element whose tag resolves to a relation becomes a staged record
//! carrying the current foreign key chain. Elements with child elements are
//! flushed first so their id can be handed down; unmatched elements pass their
//! chain through to their children unchanged.

use roxmltree::Node;

use super::chain::ForeignKeyChain;
use super::record::{build_record, Record};
use crate::schema::SchemaRegistry;
use crate::{Error, Result};

/// Handle to a record handed to a [`RecordSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagedId(usize);

impl StagedId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Storage seen by the walker: records are staged, and only receive a
/// surrogate id once flushed
pub trait RecordSink {
    fn stage(&mut self, record: Record) -> Result<StagedId>;
    fn flush(&mut self) -> Result<()>;
    fn surrogate_id(&self, staged: StagedId) -> Option<i64>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Records staged
    pub records: usize,
    /// Elements without a matching relation
    pub passthrough: usize,
    /// Eager flushes before descending into children
    pub flushes: usize,
}

pub struct DocumentWalker<'a, S: RecordSink> {
    registry: &'a SchemaRegistry,
    sink: &'a mut S,
    stats: WalkStats,
}

impl<'a, S: RecordSink> DocumentWalker<'a, S> {
    pub fn new(registry: &'a SchemaRegistry, sink: &'a mut S) -> Self {
        Self {
            registry,
            sink,
            stats: WalkStats::default(),
        }
    }

    /// Walk `root` and everything below it. Errors are returned as-is; the
    /// caller owns rollback.
    pub fn walk_document(mut self, root: Node<'_, '_>, chain: &ForeignKeyChain) -> Result<WalkStats> {
        self.walk(root, chain)?;
        Ok(self.stats)
    }

    fn walk(&mut self, element: Node<'_, '_>, chain: &ForeignKeyChain) -> Result<()> {
        let tag = element.tag_name().name();

        let Some(relation) = self.registry.resolve(tag) else {
            self.stats.passthrough += 1;
            tracing::trace!("No relation for <{}>, passing chain through", tag);
            for child in element.children().filter(|n| n.is_element()) {
                self.walk(child, chain)?;
            }
            return Ok(());
        };

        let attributes = element.attributes().map(|a| (a.name(), a.value()));
        let mut record = build_record(relation, attributes);
        chain.apply(relation, &mut record);
        let staged = self.sink.stage(record)?;
        self.stats.records += 1;

        let mut children = element.children().filter(|n| n.is_element()).peekable();
        if children.peek().is_none() {
            // Leaves are written with the next flush or at commit
            return Ok(());
        }

        self.sink.flush()?;
        self.stats.flushes += 1;
        let id = self
            .sink
            .surrogate_id(staged)
            .ok_or_else(|| Error::MissingSurrogateId(relation.name().to_string()))?;
        tracing::trace!("Flushed <{}> as {} id {}", tag, relation.name(), id);

        let chain = chain.extend(id, format!("{}_id", relation.tag()));
        for child in children {
            self.walk(child, &chain)?;
        }

        Ok(())
    }
}
