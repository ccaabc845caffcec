use crate::pricing::estimate_price;
use crate::{ProviderError, TokenQuery, TokenResult, TokenizerProvider, Visualization};

/// Characters that carry no `charToToken` entry.
pub fn is_layout_whitespace(c: char) -> bool {
    c == ' ' || c == '\n'
}

/// Offline estimator: one token per whitespace-separated word.
///
/// Useful when no real tokenizer is installed. Prices come from the built-in
/// table, so the numbers are only as good as a word count.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceTokenizer;

impl WhitespaceTokenizer {
    pub fn tokenize(&self, text: &str) -> Visualization {
        let mut tokens: Vec<String> = Vec::new();
        let mut char_to_token = Vec::new();
        let mut in_word = false;

        for c in text.chars() {
            if c.is_whitespace() {
                in_word = false;
                // Tabs and carriage returns still occupy a mapping slot.
                if !is_layout_whitespace(c) {
                    char_to_token.push(None);
                }
                continue;
            }
            if !in_word {
                tokens.push(String::new());
                in_word = true;
            }
            let index = tokens.len() - 1;
            tokens[index].push(c);
            char_to_token.push(Some(index));
        }

        Visualization {
            text: text.to_string(),
            token_ids: (0..tokens.len() as i64).collect(),
            tokens,
            char_to_token,
        }
    }
}

#[async_trait::async_trait]
impl TokenizerProvider for WhitespaceTokenizer {
    async fn count(&self, query: &TokenQuery) -> Result<TokenResult, ProviderError> {
        let visualization = self.tokenize(&query.text);
        let token_count = visualization.tokens.len() as u64;
        Ok(TokenResult {
            token_count,
            price: estimate_price(&query.provider, &query.model, token_count),
            visualization: query.visualize.then_some(visualization),
        })
    }
}
