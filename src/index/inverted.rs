use std::collections::{HashMap, HashSet};
use crate::analysis::analyzer::Analyzer;
use crate::core::types::{Document, FieldValue, SongId};
use crate::index::posting::{union_sorted, PostingList};

/// Term representation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Term(String);

impl Term {
    pub fn new(text: &str) -> Self {
        Term(text.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Full-text index over a fixed set of text fields.
///
/// All indexed fields share one term space: a word found in either the title or
/// the artist makes the document a hit.
pub struct TextIndex {
    pub fields: Vec<String>,
    pub postings: HashMap<Term, PostingList>,
    pub analyzer: Analyzer,
    pub doc_count: usize,
}

impl TextIndex {
    pub fn new(fields: Vec<String>, analyzer: Analyzer) -> Self {
        TextIndex {
            fields,
            postings: HashMap::new(),
            analyzer,
            doc_count: 0,
        }
    }

    pub fn covers(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    pub fn add_document(&mut self, doc: &Document) {
        let mut terms: HashSet<Term> = HashSet::new();
        for field in &self.fields {
            let Some(FieldValue::Text(text)) = doc.get_field(field) else {
                continue;
            };
            terms.extend(self.analyzer.analyze(text).into_iter().map(|token| Term::new(&token.text)));
        }

        for term in terms {
            self.postings.entry(term).or_default().add(doc.id);
        }

        self.doc_count += 1;
    }

    pub fn remove_document(&mut self, doc_id: SongId) {
        let mut found = false;
        for list in self.postings.values_mut() {
            found |= list.remove(doc_id);
        }
        self.postings.retain(|_, list| !list.is_empty());
        if found {
            self.doc_count = self.doc_count.saturating_sub(1);
        }
    }

    pub fn search_term(&self, term: &str) -> Option<&PostingList> {
        self.postings.get(&Term::new(term))
    }

    /// Documents containing any of `terms`, ascending by id.
    pub fn search_any(&self, terms: &[String]) -> Vec<SongId> {
        union_sorted(terms.iter().filter_map(|t| self.search_term(t)))
    }

    pub fn contains_any(&self, doc_id: SongId, terms: &[String]) -> bool {
        terms.iter()
            .filter_map(|t| self.search_term(t))
            .any(|list| list.contains(doc_id))
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::fields;

    fn song(id: u64, title: &str, artist: &str) -> Document {
        let mut doc = Document::new(SongId(id));
        doc.add_field(fields::TITLE, FieldValue::Text(title.into()));
        doc.add_field(fields::ARTIST, FieldValue::Text(artist.into()));
        doc
    }

    fn index() -> TextIndex {
        TextIndex::new(
            vec![fields::TITLE.into(), fields::ARTIST.into()],
            Analyzer::text_index(),
        )
    }

    #[test]
    fn words_from_every_indexed_field_are_searchable() {
        let mut index = index();
        index.add_document(&song(1, "Wishing In The Night", "The Yousicians"));
        index.add_document(&song(2, "Theory of Everything", "Mr Fastfinger"));

        assert_eq!(index.search_any(&["the".into()]), [SongId(1)]);
        assert_eq!(index.search_any(&["fastfinger".into()]), [SongId(2)]);
        assert_eq!(index.search_any(&["night".into(), "theory".into()]), [SongId(1), SongId(2)]);
        assert_eq!(index.search_term("the").unwrap().len(), 1);
    }

    #[test]
    fn removed_documents_leave_no_terms_behind() {
        let mut index = index();
        index.add_document(&song(1, "Babysitting", "The Yousicians"));
        index.add_document(&song(2, "Alabama Sunrise", "The Yousicians"));
        index.remove_document(SongId(1));

        assert!(index.search_term("babysitting").is_none());
        assert!(!index.contains_any(SongId(1), &["the".into()]));
        assert!(index.contains_any(SongId(2), &["the".into()]));
        assert_eq!(index.doc_count, 1);
    }
}
