use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Document, FieldValue};
use crate::index::inverted::TextIndex;
use crate::query::ast::{BoolQuery, ContainsQuery, EqualsQuery, IdRangeQuery, Query, TextQuery};

/// Document matcher - evaluates a query against one document
pub struct DocumentMatcher<'a> {
    index: Option<&'a TextIndex>,
}

impl<'a> DocumentMatcher<'a> {
    pub fn new(index: Option<&'a TextIndex>) -> Self {
        DocumentMatcher { index }
    }

    pub fn matches(&self, doc: &Document, query: &Query) -> Result<bool> {
        match query {
            Query::MatchAll => Ok(true),
            Query::Bool(bool_query) => self.matches_bool(doc, bool_query),
            Query::Contains(contains) => Ok(self.matches_contains(doc, contains)),
            Query::Text(text) => self.matches_text(doc, text),
            Query::IdRange(range) => Ok(self.matches_id_range(doc, range)),
            Query::Equals(equals) => Ok(self.matches_equals(doc, equals)),
        }
    }

    fn matches_bool(&self, doc: &Document, bool_query: &BoolQuery) -> Result<bool> {
        // Must clauses: all must match (AND)
        for must_clause in &bool_query.must {
            if !self.matches(doc, must_clause)? {
                return Ok(false);
            }
        }

        // Should clauses: at least one must match (OR)
        if !bool_query.should.is_empty() {
            for should_clause in &bool_query.should {
                if self.matches(doc, should_clause)? {
                    return Ok(true);
                }
            }
            return Ok(false);
        }

        Ok(true)
    }

    fn matches_contains(&self, doc: &Document, contains: &ContainsQuery) -> bool {
        match doc.get_field(&contains.field) {
            Some(FieldValue::Text(s)) => {
                s.to_lowercase().contains(&contains.value.to_lowercase())
            }
            _ => false,
        }
    }

    fn matches_text(&self, doc: &Document, text: &TextQuery) -> Result<bool> {
        let index = self.index.ok_or_else(|| {
            Error::new(ErrorKind::Validation, "full-word search requires a text index")
        })?;
        Ok(index.contains_any(doc.id, &text.terms))
    }

    fn matches_id_range(&self, doc: &Document, range: &IdRangeQuery) -> bool {
        range.gt.is_none_or(|gt| doc.id > gt)
    }

    fn matches_equals(&self, doc: &Document, equals: &EqualsQuery) -> bool {
        doc.get_field(&equals.field)
            .is_some_and(|value| value.loosely_equals(&equals.value))
    }
}
