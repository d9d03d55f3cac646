use std::collections::HashMap;
use crate::core::error::Result;
use crate::core::types::{AggregateRecord, Document, FieldValue, SongId};
use crate::query::ast::Query;
use crate::query::pipeline::{GroupRow, Pipeline};
use crate::query::types::SortOrder;

/// Document collection holding song records.
pub trait RecordStore: Send + Sync {
    /// Documents matching `filter`, ordered by id, at most `limit` of them.
    fn find(&self, filter: &Query, sort: SortOrder, limit: Option<usize>) -> Result<Vec<Document>>;

    fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<GroupRow>>;

    /// Stores a new document under a freshly assigned id.
    fn insert(&self, fields: HashMap<String, FieldValue>) -> Result<SongId>;

    /// Inserts or fully replaces the document with `doc.id`.
    fn upsert(&self, doc: Document) -> Result<()>;

    fn find_one(&self, id: SongId) -> Result<Option<Document>>;

    /// Overwrites the named fields only. Returns false when `id` does not exist.
    fn update_fields(&self, id: SongId, fields: HashMap<String, FieldValue>) -> Result<bool>;

    /// Builds (or rebuilds) the full-text index over `fields`.
    fn create_text_index(&self, fields: &[&str]) -> Result<()>;
}

/// Lazily consumed sequence of aggregate records.
pub type AggregateCursor = Box<dyn Iterator<Item = AggregateRecord> + Send>;

/// Collection of precomputed per-level totals, keyed by level.
pub trait AggregateStore: Send + Sync {
    fn find_all(&self) -> Result<AggregateCursor>;

    fn find_one(&self, level: i64) -> Result<Option<AggregateRecord>>;

    /// Replaces the record for `record.level`, creating it when absent.
    fn upsert(&self, record: AggregateRecord) -> Result<()>;
}
