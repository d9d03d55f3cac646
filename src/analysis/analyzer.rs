use std::sync::Arc;
use crate::analysis::filter::{LowercaseFilter, TokenFilter};
use crate::analysis::token::Token;
use crate::analysis::tokenizer::{StandardTokenizer, Tokenizer};

/// Text analysis pipeline: one tokenizer followed by token filters in order.
///
/// The same analyzer must be used for indexing and for query terms, otherwise
/// full-word lookups silently miss.
#[derive(Clone)]
pub struct Analyzer {
    pub tokenizer: Arc<dyn Tokenizer>,
    pub filters: Vec<Arc<dyn TokenFilter>>,
    pub name: String,
}

impl Analyzer {
    pub fn new(name: impl Into<String>, tokenizer: Arc<dyn Tokenizer>) -> Self {
        Analyzer {
            tokenizer,
            filters: Vec::new(),
            name: name.into(),
        }
    }

    pub fn add_filter(mut self, filter: Arc<dyn TokenFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn analyze(&self, text: &str) -> Vec<Token> {
        let mut tokens = self.tokenizer.tokenize(text);

        for filter in &self.filters {
            tokens = filter.filter(tokens);
        }

        tokens
    }

    /// Distinct terms of `text`, in first-seen order.
    pub fn terms(&self, text: &str) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        for token in self.analyze(text) {
            if !terms.contains(&token.text) {
                terms.push(token.text);
            }
        }
        terms
    }

    /// Language-neutral analyzer for the song text index: no stemming and no stop
    /// words, so short words such as "the" remain searchable.
    pub fn text_index() -> Self {
        Analyzer::new("text_index", Arc::new(StandardTokenizer::default()))
            .add_filter(Arc::new(LowercaseFilter))
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Analyzer::text_index()
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("name", &self.name)
            .field("tokenizer", &self.tokenizer.name())
            .field("filters", &self.filters.iter().map(|f| f.name()).collect::<Vec<_>>())
            .finish()
    }
}
