//! PL/SQL Lexer/Tokenizer
//!
//! This module provides a hand-written lexer for Oracle SQL, PL/SQL and the
//! SQL*Plus batch terminator. Tokens carry byte spans plus line/column
//! locations.

mod span;
mod token;
mod tokenizer;

pub use span::{Location, Span};
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
