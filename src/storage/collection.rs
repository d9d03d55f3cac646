use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use crate::analysis::analyzer::Analyzer;
use crate::core::error::{Error, Result};
use crate::core::types::{Document, FieldValue, SongId};
use crate::index::inverted::TextIndex;
use crate::query::ast::Query;
use crate::query::matcher::DocumentMatcher;
use crate::query::pipeline::{GroupRow, Pipeline};
use crate::query::planner::{QueryPlanner, ScanPlan};
use crate::query::types::SortOrder;
use crate::storage::layout::StorageLayout;
use crate::storage::lock::StoreLock;
use crate::storage::store::RecordStore;
use crate::storage::wal::{SyncMode, WAL};

/// Journaled collection operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Operation {
    Insert(Document),
    Replace(Document),
    UpdateFields { id: SongId, fields: HashMap<String, FieldValue> },
    CreateTextIndex { fields: Vec<String> },
}

/// Song collection: id-ordered documents, an optional text index and an
/// optional journal.
///
/// Every mutation is journaled before it is applied, under the same write lock,
/// so replay reproduces the exact same ids and index.
pub struct SongCollection {
    state: RwLock<CollectionState>,
    _lock: Option<StoreLock>,
}

struct CollectionState {
    documents: BTreeMap<SongId, Document>,
    next_id: u64,
    text_index: Option<TextIndex>,
    wal: Option<WAL<Operation>>,
}

impl SongCollection {
    pub fn in_memory() -> Self {
        SongCollection {
            state: RwLock::new(CollectionState::new(None)),
            _lock: None,
        }
    }

    /// Opens the on-disk collection, taking the writer lock for the layout.
    pub fn open(layout: &StorageLayout) -> Result<Self> {
        let lock = StoreLock::acquire(&layout.songs_lock_path())?;
        let path = layout.songs_wal_path();
        let (wal, entries) = WAL::open(&path, SyncMode::None)?;

        let mut state = CollectionState::new(None);
        let replayed = entries.len();
        for entry in entries {
            state.apply(entry.operation);
        }
        state.wal = Some(wal);

        info!(
            path = %path.display(),
            replayed,
            documents = state.documents.len(),
            text_index = state.text_index.is_some(),
            "opened song collection"
        );

        Ok(SongCollection {
            state: RwLock::new(state),
            _lock: Some(lock),
        })
    }

    pub fn len(&self) -> usize {
        self.state.read().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_text_index(&self) -> bool {
        self.state.read().text_index.is_some()
    }

    /// Forces journaled writes to disk.
    pub fn sync(&self) -> Result<()> {
        if let Some(wal) = self.state.write().wal.as_mut() {
            wal.sync()?;
        }
        Ok(())
    }
}

impl CollectionState {
    fn new(wal: Option<WAL<Operation>>) -> Self {
        CollectionState {
            documents: BTreeMap::new(),
            next_id: 1,
            text_index: None,
            wal,
        }
    }

    fn commit(&mut self, op: Operation) -> Result<()> {
        if let Some(wal) = self.wal.as_mut() {
            wal.append(op.clone())?;
        }
        self.apply(op);
        Ok(())
    }

    fn apply(&mut self, op: Operation) {
        match op {
            Operation::Insert(doc) => {
                // Fresh id, nothing indexed under it yet
                self.next_id = self.next_id.max(doc.id.0.saturating_add(1));
                if let Some(index) = self.text_index.as_mut() {
                    index.add_document(&doc);
                }
                self.documents.insert(doc.id, doc);
            }
            Operation::Replace(doc) => {
                self.next_id = self.next_id.max(doc.id.0.saturating_add(1));
                if let Some(index) = self.text_index.as_mut() {
                    if self.documents.contains_key(&doc.id) {
                        index.remove_document(doc.id);
                    }
                    index.add_document(&doc);
                }
                self.documents.insert(doc.id, doc);
            }
            Operation::UpdateFields { id, fields } => {
                let Some(doc) = self.documents.get_mut(&id) else {
                    return;
                };
                let reindex = self.text_index.as_ref()
                    .is_some_and(|index| fields.keys().any(|f| index.covers(f)));
                doc.fields.extend(fields);
                if reindex {
                    if let Some(index) = self.text_index.as_mut() {
                        index.remove_document(id);
                        index.add_document(doc);
                    }
                }
            }
            Operation::CreateTextIndex { fields } => {
                let mut index = TextIndex::new(fields, Analyzer::text_index());
                for doc in self.documents.values() {
                    index.add_document(doc);
                }
                self.text_index = Some(index);
            }
        }
    }

    /// Candidate documents for `plan`, in `sort` order.
    fn candidates<'s>(&'s self, plan: &ScanPlan, sort: SortOrder) -> Box<dyn Iterator<Item = &'s Document> + 's> {
        match plan {
            ScanPlan::Scan { after } => {
                let lower = match after {
                    Some(id) => Bound::Excluded(*id),
                    None => Bound::Unbounded,
                };
                let docs = self.documents
                    .range((lower, Bound::Unbounded))
                    .map(|(_, doc)| doc);
                match sort {
                    SortOrder::Asc => Box::new(docs),
                    SortOrder::Desc => Box::new(docs.rev()),
                }
            }
            ScanPlan::IndexSeek { terms, after } => {
                let mut ids = self.text_index.as_ref()
                    .map(|index| index.search_any(terms))
                    .unwrap_or_default();
                if let Some(after) = after {
                    let start = ids.partition_point(|id| id <= after);
                    ids.drain(..start);
                }
                let docs = ids.into_iter().filter_map(move |id| self.documents.get(&id));
                match sort {
                    SortOrder::Asc => Box::new(docs),
                    SortOrder::Desc => Box::new(docs.rev()),
                }
            }
        }
    }
}

impl RecordStore for SongCollection {
    fn find(&self, filter: &Query, sort: SortOrder, limit: Option<usize>) -> Result<Vec<Document>> {
        let state = self.state.read();

        if filter.uses_text_index() && state.text_index.is_none() {
            return Err(Error::validation("full-word search requires a text index"));
        }

        let limit = limit.unwrap_or(usize::MAX);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let plan = QueryPlanner::new(state.text_index.is_some()).plan(filter);
        let matcher = DocumentMatcher::new(state.text_index.as_ref());

        let mut results = Vec::new();
        let mut visited = 0usize;
        for doc in state.candidates(&plan, sort) {
            visited += 1;
            if matcher.matches(doc, filter)? {
                results.push(doc.clone());
                if results.len() >= limit {
                    break;
                }
            }
        }

        debug!(?plan, visited, returned = results.len(), "find");
        Ok(results)
    }

    fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<GroupRow>> {
        let state = self.state.read();
        let matcher = DocumentMatcher::new(state.text_index.as_ref());
        pipeline.execute(state.documents.values(), &matcher)
    }

    fn insert(&self, fields: HashMap<String, FieldValue>) -> Result<SongId> {
        let mut state = self.state.write();
        let id = SongId::new(state.next_id);
        state.commit(Operation::Insert(Document::with_fields(id, fields)))?;
        Ok(id)
    }

    fn upsert(&self, doc: Document) -> Result<()> {
        self.state.write().commit(Operation::Replace(doc))
    }

    fn find_one(&self, id: SongId) -> Result<Option<Document>> {
        Ok(self.state.read().documents.get(&id).cloned())
    }

    fn update_fields(&self, id: SongId, fields: HashMap<String, FieldValue>) -> Result<bool> {
        let mut state = self.state.write();
        if !state.documents.contains_key(&id) {
            return Ok(false);
        }
        state.commit(Operation::UpdateFields { id, fields })?;
        Ok(true)
    }

    fn create_text_index(&self, fields: &[&str]) -> Result<()> {
        let fields: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
        let mut state = self.state.write();
        state.commit(Operation::CreateTextIndex { fields: fields.clone() })?;
        info!(
            ?fields,
            terms = state.text_index.as_ref().map(TextIndex::term_count).unwrap_or(0),
            "built text index"
        );
        Ok(())
    }
}
