use crate::analysis::token::Token;

/// Rewrites or drops tokens after tokenization. Filters keep positions intact.
pub trait TokenFilter: Send + Sync {
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token>;

    fn name(&self) -> &'static str;
}

/// Unicode case folding, so "The" and "the" index to the same term.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowercaseFilter;

impl TokenFilter for LowercaseFilter {
    fn filter(&self, mut tokens: Vec<Token>) -> Vec<Token> {
        for token in &mut tokens {
            if token.text.chars().any(char::is_uppercase) {
                token.text = token.text.to_lowercase();
            }
        }
        tokens
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_non_ascii_letters_too() {
        let tokens = vec![Token::new("ÖLAND".into(), 0, 0), Token::new("waki".into(), 1, 7)];
        let folded = LowercaseFilter.filter(tokens);
        assert_eq!(folded[0].text, "öland");
        assert_eq!(folded[1].text, "waki");
        assert_eq!(folded[1].position, 1);
    }
}
