//! Token stream shared by the parser and the tree walker.

use crate::lexer::{Lexer, Token};

/// All tokens of a script together with the source they came from.
///
/// The last token is always EOF.
#[derive(Debug, Clone)]
pub struct TokenStream<'a> {
    source: &'a str,
    tokens: Vec<Token>,
}

impl<'a> TokenStream<'a> {
    /// Tokenizes `source`.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        let tokens = Lexer::new(source).tokenize();
        Self { source, tokens }
    }

    /// Returns the source text.
    #[must_use]
    pub const fn source(&self) -> &'a str {
        self.source
    }

    /// Returns all tokens, including lexer error tokens.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns the token at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Returns the number of tokens, EOF included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the stream holds no tokens at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns the source text of a token.
    #[must_use]
    pub fn text(&self, token: &Token) -> &'a str {
        self.source
            .get(token.span.start..token.span.end)
            .unwrap_or_default()
    }

    /// Returns the verbatim source from the first character of `start` to
    /// the last character of `stop`, comments and whitespace included.
    #[must_use]
    pub fn text_between(&self, start: &Token, stop: &Token) -> &'a str {
        let span = start.span.merge(stop.span);
        self.source.get(span.start..span.end).unwrap_or_default()
    }
}
