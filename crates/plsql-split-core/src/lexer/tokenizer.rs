//! PL/SQL tokenizer implementation.

use super::{Keyword, Location, Span, Token, TokenKind};

/// A lexer that tokenizes Oracle SQL and PL/SQL input.
///
/// Every token records its 1-based line and 0-based character column so the
/// splitter can report positions without re-scanning the source.
pub struct Lexer<'a> {
    /// The input source code.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
    /// Line of the character at `pos`.
    line: usize,
    /// Column of the character at `pos`.
    column: usize,
    /// Location of the start of the current token.
    token_location: Location,
    /// Whether a token has already been produced on the current line.
    line_has_token: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
            line: 1,
            column: 0,
            token_location: Location::new(1, 0),
            line_has_token: false,
        }
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns the next character without advancing.
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 0;
            self.line_has_token = false;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Marks the current position as the start of a token.
    fn begin_token(&mut self) {
        self.start = self.pos;
        self.token_location = Location::new(self.line, self.column);
    }

    /// Skips whitespace and comments.
    ///
    /// Returns an error token for a block comment that never closes.
    fn skip_whitespace_and_comments(&mut self) -> Option<Token> {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.advance();
            }

            // Single-line comments (-- ...)
            if self.peek() == Some('-') && self.peek_next() == Some('-') {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.advance();
                }
                continue;
            }

            // Multi-line comments (/* ... */)
            if self.peek() == Some('/') && self.peek_next() == Some('*') {
                self.begin_token();
                self.advance(); // /
                self.advance(); // *
                loop {
                    match self.advance() {
                        Some('*') if self.peek() == Some('/') => {
                            self.advance();
                            break;
                        }
                        None => {
                            return Some(self.make_token(TokenKind::Error(String::from(
                                "Unterminated block comment",
                            ))));
                        }
                        _ => {}
                    }
                }
                continue;
            }

            return None;
        }
    }

    /// Creates a span from start to current position.
    const fn make_span(&self) -> Span {
        Span::new(self.start, self.pos)
    }

    /// Creates a token with the current span.
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.make_span(), self.token_location)
    }

    /// Returns true if only whitespace remains before the end of the line.
    fn rest_of_line_is_blank(&self) -> bool {
        self.input[self.pos..]
            .split('\n')
            .next()
            .is_none_or(|rest| rest.trim().is_empty())
    }

    fn is_identifier_char(c: char) -> bool {
        c.is_alphanumeric() || matches!(c, '_' | '$' | '#')
    }

    /// Scans an identifier or keyword.
    fn scan_identifier(&mut self) -> Token {
        while self.peek().is_some_and(Self::is_identifier_char) {
            self.advance();
        }

        let text = &self.input[self.start..self.pos];
        match Keyword::from_str(text) {
            Some(keyword) => self.make_token(TokenKind::Keyword(keyword)),
            None => self.make_token(TokenKind::Identifier),
        }
    }

    /// Scans a quoted identifier (e.g., "Mixed Case").
    fn scan_quoted_identifier(&mut self) -> Token {
        self.advance(); // consume opening quote
        loop {
            match self.advance() {
                Some('"') => return self.make_token(TokenKind::QuotedIdentifier),
                Some(_) => {}
                None => {
                    return self.make_token(TokenKind::Error(String::from(
                        "Unterminated quoted identifier",
                    )));
                }
            }
        }
    }

    /// Scans a string literal. The opening quote is the next character.
    fn scan_string(&mut self) -> Token {
        self.advance(); // consume opening quote
        loop {
            match self.advance() {
                Some('\'') => {
                    // '' is an escaped quote
                    if self.peek() == Some('\'') {
                        self.advance();
                    } else {
                        return self.make_token(TokenKind::String);
                    }
                }
                Some(_) => {}
                None => {
                    return self.make_token(TokenKind::Error(String::from(
                        "Unterminated string literal",
                    )));
                }
            }
        }
    }

    /// Scans an alternative-quoting literal such as q'[it's]'.
    ///
    /// The `q` and the opening quote are the next two characters.
    fn scan_q_quoted_string(&mut self) -> Token {
        self.advance(); // q
        self.advance(); // '
        let Some(open) = self.advance() else {
            return self.make_token(TokenKind::Error(String::from(
                "Unterminated quoted string",
            )));
        };
        let close = match open {
            '[' => ']',
            '{' => '}',
            '(' => ')',
            '<' => '>',
            other => other,
        };
        loop {
            match self.advance() {
                Some(c) if c == close && self.peek() == Some('\'') => {
                    self.advance();
                    return self.make_token(TokenKind::String);
                }
                Some(_) => {}
                None => {
                    return self.make_token(TokenKind::Error(String::from(
                        "Unterminated quoted string",
                    )));
                }
            }
        }
    }

    /// Scans a number, including decimals, exponents and f/d suffixes.
    fn scan_number(&mut self) -> Token {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        // 1..10 is a range, not a decimal
        if self.peek() == Some('.') && self.peek_next() != Some('.') {
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if self.peek().is_some_and(|c| c == 'e' || c == 'E')
            && self
                .peek_next()
                .is_some_and(|c| c.is_ascii_digit() || c == '+' || c == '-')
        {
            self.advance(); // e/E
            if self.peek().is_some_and(|c| c == '+' || c == '-') {
                self.advance();
            }
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if self.peek().is_some_and(|c| matches!(c, 'f' | 'F' | 'd' | 'D'))
            && !self.peek_next().is_some_and(Self::is_identifier_char)
        {
            self.advance();
        }

        self.make_token(TokenKind::Number)
    }

    /// Scans a bind or substitution variable after its sigil.
    fn scan_variable(&mut self) -> Token {
        while self.peek().is_some_and(Self::is_identifier_char) {
            self.advance();
        }
        self.make_token(TokenKind::BindVariable)
    }

    /// Scans the next token.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        let token = self.scan_token();
        self.line_has_token = true;
        token
    }

    fn scan_token(&mut self) -> Token {
        if let Some(error) = self.skip_whitespace_and_comments() {
            return error;
        }
        let first_on_line = !self.line_has_token;
        self.begin_token();

        let Some(c) = self.advance() else {
            return self.make_token(TokenKind::Eof);
        };

        match c {
            // Single-character tokens
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            ',' => self.make_token(TokenKind::Comma),
            ';' => self.make_token(TokenKind::Semicolon),
            '+' => self.make_token(TokenKind::Plus),
            '-' => self.make_token(TokenKind::Minus),
            '%' => self.make_token(TokenKind::Percent),
            '@' => self.make_token(TokenKind::At),

            // Potentially multi-character tokens
            '/' => {
                if first_on_line && self.rest_of_line_is_blank() {
                    self.make_token(TokenKind::BatchSlash)
                } else {
                    self.make_token(TokenKind::Slash)
                }
            }
            '*' => {
                if self.peek() == Some('*') {
                    self.advance();
                    self.make_token(TokenKind::Power)
                } else {
                    self.make_token(TokenKind::Star)
                }
            }
            '.' => {
                if self.peek() == Some('.') {
                    self.advance();
                    self.make_token(TokenKind::DoubleDot)
                } else if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.scan_number()
                } else {
                    self.make_token(TokenKind::Dot)
                }
            }
            ':' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::Assign)
                } else if self.peek().is_some_and(Self::is_identifier_char) {
                    self.scan_variable()
                } else {
                    self.make_token(TokenKind::Colon)
                }
            }
            '&' => {
                if self.peek() == Some('&') {
                    self.advance();
                }
                if self.peek().is_some_and(Self::is_identifier_char) {
                    self.scan_variable()
                } else {
                    self.make_token(TokenKind::Error(String::from("Unexpected character: &")))
                }
            }
            '=' => {
                if self.peek() == Some('>') {
                    self.advance();
                    self.make_token(TokenKind::Arrow)
                } else {
                    self.make_token(TokenKind::Eq)
                }
            }
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::LtEq)
                } else if self.peek() == Some('>') {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                } else if self.peek() == Some('<') {
                    self.advance();
                    self.make_token(TokenKind::LabelStart)
                } else {
                    self.make_token(TokenKind::Lt)
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::GtEq)
                } else if self.peek() == Some('>') {
                    self.advance();
                    self.make_token(TokenKind::LabelEnd)
                } else {
                    self.make_token(TokenKind::Gt)
                }
            }
            '!' | '^' | '~' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                } else {
                    self.make_token(TokenKind::Error(format!("Unexpected character: {c}")))
                }
            }
            '|' => {
                if self.peek() == Some('|') {
                    self.advance();
                    self.make_token(TokenKind::Concat)
                } else {
                    self.make_token(TokenKind::Error(String::from("Unexpected character: |")))
                }
            }

            // String literals
            '\'' => {
                self.rewind();
                self.scan_string()
            }
            'q' | 'Q' if self.peek() == Some('\'') => {
                self.rewind();
                self.scan_q_quoted_string()
            }
            'n' | 'N' if self.peek() == Some('\'') => self.scan_string(),
            'n' | 'N'
                if self.peek().is_some_and(|c| c == 'q' || c == 'Q')
                    && self.peek_next() == Some('\'') =>
            {
                self.scan_q_quoted_string()
            }

            // Quoted identifiers
            '"' => {
                self.rewind();
                self.scan_quoted_identifier()
            }

            // Numbers
            c if c.is_ascii_digit() => self.scan_number(),

            // Identifiers and keywords
            c if c.is_alphabetic() || c == '_' || c == '$' => self.scan_identifier(),

            _ => self.make_token(TokenKind::Error(format!("Unexpected character: {c}"))),
        }
    }

    /// Moves back to the start of the current token.
    fn rewind(&mut self) {
        self.pos = self.start;
        self.line = self.token_location.line;
        self.column = self.token_location.column;
    }

    /// Tokenizes the entire input and returns all tokens.
    ///
    /// The last token is always [`TokenKind::Eof`].
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}
