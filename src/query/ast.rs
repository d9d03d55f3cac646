use serde::{Serialize, Deserialize};
use crate::core::types::{FieldValue, SongId};

/// Filter language understood by the record store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Query {
    MatchAll,
    Bool(BoolQuery),         // Boolean combinations
    Contains(ContainsQuery), // Case-insensitive substring on one field
    Text(TextQuery),         // Full-word lookup through the text index
    IdRange(IdRangeQuery),   // Keyset bound on the document id
    Equals(EqualsQuery),     // Exact field value
}

/// Boolean query with must/should clauses
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoolQuery {
    pub must: Vec<Query>,    // All must match (AND)
    pub should: Vec<Query>,  // At least one must match (OR)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainsQuery {
    pub field: String,
    pub value: String,
}

/// Terms are expected to be analyzed already, with the index analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextQuery {
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdRangeQuery {
    pub gt: Option<SongId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EqualsQuery {
    pub field: String,
    pub value: FieldValue,
}

impl BoolQuery {
    pub fn new() -> Self {
        BoolQuery::default()
    }

    pub fn with_must(mut self, query: Query) -> Self {
        self.must.push(query);
        self
    }

    pub fn with_should(mut self, query: Query) -> Self {
        self.should.push(query);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty()
    }
}

impl Query {
    pub fn contains(field: &str, value: &str) -> Query {
        Query::Contains(ContainsQuery {
            field: field.to_string(),
            value: value.to_string(),
        })
    }

    pub fn text(terms: Vec<String>) -> Query {
        Query::Text(TextQuery { terms })
    }

    pub fn after(id: SongId) -> Query {
        Query::IdRange(IdRangeQuery { gt: Some(id) })
    }

    pub fn equals(field: &str, value: FieldValue) -> Query {
        Query::Equals(EqualsQuery {
            field: field.to_string(),
            value,
        })
    }

    /// True when evaluating the query needs a text index.
    pub fn uses_text_index(&self) -> bool {
        match self {
            Query::Text(_) => true,
            Query::Bool(b) => b.must.iter().chain(&b.should).any(Query::uses_text_index),
            _ => false,
        }
    }
}
