use std::sync::Arc;
use tracing::debug;
use crate::analysis::analyzer::Analyzer;
use crate::core::error::{Error, Result};
use crate::core::types::{Song, SongId};
use crate::query::types::SortOrder;
use crate::search::filter::SongFilter;
use crate::storage::store::RecordStore;

pub const DEFAULT_MAX_LIMIT: usize = 100;

/// One page of a keyset listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Song>,
    /// Id of the last item. Present whenever the page is non-empty, so the end of a
    /// listing is only observed as an empty page.
    pub next_cursor: Option<SongId>,
}

/// Keyset pager over a record store
///
/// Pages are ordered by ascending id and bounded by `id > previous_id`, which
/// keeps them stable under concurrent inserts (new songs only ever append).
pub struct KeysetPager {
    pub store: Arc<dyn RecordStore>,
    pub analyzer: Analyzer,
    pub max_limit: usize,
}

impl KeysetPager {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        KeysetPager {
            store,
            analyzer: Analyzer::text_index(),
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }

    pub fn with_max_limit(mut self, max_limit: usize) -> Self {
        self.max_limit = max_limit;
        self
    }

    pub fn clamp_limit(&self, limit: usize) -> usize {
        limit.min(self.max_limit)
    }

    pub fn list(&self, previous_id: Option<&str>, limit: usize, filter: &SongFilter) -> Result<Page> {
        let after = previous_id
            .map(|token| {
                token.parse::<SongId>().map_err(|e| {
                    Error::validation(format!("previous_id: {}", e.context))
                })
            })
            .transpose()?;

        let limit = self.clamp_limit(limit);
        if limit == 0 {
            return Ok(Page {
                items: Vec::new(),
                next_cursor: None,
            });
        }

        let query = filter.to_query(after, &self.analyzer);
        let docs = self.store.find(&query, SortOrder::Asc, Some(limit))?;
        let items = docs.iter().map(Song::from_document).collect::<Result<Vec<_>>>()?;
        let next_cursor = items.last().map(|song| song.id);

        debug!(
            after = ?after,
            limit,
            returned = items.len(),
            message = filter.message.as_deref(),
            word = filter.word.as_deref(),
            "listed songs"
        );

        Ok(Page { items, next_cursor })
    }
}
