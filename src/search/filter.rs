use crate::analysis::analyzer::Analyzer;
use crate::core::types::{fields, SongId};
use crate::query::ast::{BoolQuery, Query};

/// Optional search clauses of a song listing.
///
/// Empty strings count as absent, so `?message=` lists everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongFilter {
    /// Case-insensitive substring of title or artist.
    pub message: Option<String>,
    /// Whole-word lookup through the text index.
    pub word: Option<String>,
}

impl SongFilter {
    pub fn new(message: Option<String>, word: Option<String>) -> Self {
        SongFilter {
            message: message.filter(|m| !m.is_empty()),
            word: word.filter(|w| !w.is_empty()),
        }
    }

    pub fn message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string()).filter(|m| !m.is_empty());
        self
    }

    pub fn word(mut self, word: &str) -> Self {
        self.word = Some(word.to_string()).filter(|w| !w.is_empty());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.message.is_none() && self.word.is_none()
    }

    /// Conjunction of every present clause plus the keyset bound.
    ///
    /// `word` goes through `analyzer`, which must be the text index analyzer. A word
    /// made only of separators analyzes to no terms and then matches nothing.
    pub fn to_query(&self, after: Option<SongId>, analyzer: &Analyzer) -> Query {
        let mut query = BoolQuery::new();

        if let Some(message) = &self.message {
            query = query.with_must(Query::Bool(
                BoolQuery::new()
                    .with_should(Query::contains(fields::TITLE, message))
                    .with_should(Query::contains(fields::ARTIST, message)),
            ));
        }

        if let Some(word) = &self.word {
            query = query.with_must(Query::text(analyzer.terms(word)));
        }

        if let Some(after) = after {
            query = query.with_must(Query::after(after));
        }

        if query.is_empty() {
            Query::MatchAll
        } else {
            Query::Bool(query)
        }
    }
}
