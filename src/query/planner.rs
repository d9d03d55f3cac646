use crate::core::types::SongId;
use crate::query::ast::Query;

/// How the collection walks its documents for a query.
///
/// Either plan yields candidates in ascending id order; the full query is still
/// evaluated against every candidate, the plan only narrows what gets visited.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanPlan {
    /// Range scan over the id-ordered document map.
    Scan { after: Option<SongId> },
    /// Walk the union of the posting lists for `terms`.
    IndexSeek { terms: Vec<String>, after: Option<SongId> },
}

/// Query planner: picks the narrowest access path visible at the top level
pub struct QueryPlanner {
    pub has_text_index: bool,
}

impl QueryPlanner {
    pub fn new(has_text_index: bool) -> Self {
        QueryPlanner { has_text_index }
    }

    pub fn plan(&self, query: &Query) -> ScanPlan {
        let conjuncts: Vec<&Query> = match query {
            // Should clauses only ever narrow further, must clauses bound the scan
            Query::Bool(b) => b.must.iter().collect(),
            other => vec![other],
        };

        let mut after: Option<SongId> = None;
        let mut terms: Option<Vec<String>> = None;

        for clause in conjuncts {
            match clause {
                Query::IdRange(range) => {
                    // Several bounds: the tightest one wins
                    after = match (after, range.gt) {
                        (Some(a), Some(b)) => Some(a.max(b)),
                        (a, b) => a.or(b),
                    };
                }
                Query::Text(text) if self.has_text_index && terms.is_none() => {
                    terms = Some(text.terms.clone());
                }
                _ => {}
            }
        }

        match terms {
            Some(terms) => ScanPlan::IndexSeek { terms, after },
            None => ScanPlan::Scan { after },
        }
    }
}
