//! Syntax error records and the listener that collects them.

use core::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::context::render_context;

/// Appended to "no viable alternative" messages whose offending token is a
/// `BEGIN`, the usual symptom of unbalanced nested blocks.
pub const NESTED_BLOCK_HINT: &str = " - This might be an issue with nested PL/SQL blocks. \
Check the block structure and ensure BEGIN/END pairs match.";

/// A syntax error reported by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxError {
    /// Line of the offending token (1-based).
    pub line: usize,
    /// Column of the offending token (0-based).
    pub column: usize,
    /// The diagnostic message.
    pub message: String,
    /// Source text of the offending token, if there was one.
    pub token_text: Option<String>,
    /// Rendered source excerpt around the error, empty when not available.
    pub context: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}:{} {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for SyntaxError {}

/// Receives syntax errors as the parser finds them.
pub trait SyntaxErrorListener {
    /// Called once per syntax error, in the order the parser finds them.
    fn syntax_error(&mut self, line: usize, column: usize, message: &str, offending: Option<&str>);
}

/// Adds the nested block hint when the message and token call for it.
#[must_use]
pub fn enhance_message(message: &str, offending: Option<&str>) -> String {
    let begins_block =
        offending.is_some_and(|text| text.to_ascii_uppercase().contains("BEGIN"));
    if message.contains("no viable alternative") && begins_block {
        format!("{message}{NESTED_BLOCK_HINT}")
    } else {
        message.to_string()
    }
}

/// Collects syntax errors up to a cap, rendering source context for each.
#[derive(Debug)]
pub struct SyntaxErrorCollector<'a> {
    source: &'a str,
    max_errors: usize,
    context_lines: usize,
    errors: Vec<SyntaxError>,
}

impl<'a> SyntaxErrorCollector<'a> {
    /// Creates a collector.
    ///
    /// A `max_errors` of 0 keeps every error.
    #[must_use]
    pub const fn new(max_errors: usize, source: &'a str, context_lines: usize) -> Self {
        Self {
            source,
            max_errors,
            context_lines,
            errors: Vec::new(),
        }
    }

    /// Returns true once the cap has been reached.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.max_errors != 0 && self.errors.len() >= self.max_errors
    }

    /// Returns the errors collected so far.
    #[must_use]
    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    /// Consumes the collector and returns its errors.
    #[must_use]
    pub fn into_errors(self) -> Vec<SyntaxError> {
        self.errors
    }
}

impl SyntaxErrorListener for SyntaxErrorCollector<'_> {
    fn syntax_error(&mut self, line: usize, column: usize, message: &str, offending: Option<&str>) {
        if self.is_full() {
            trace!(line, column, message, "error cap reached, dropping syntax error");
            return;
        }
        let message = enhance_message(message, offending);
        debug!(line, column, message = %message, "syntax error");
        self.errors.push(SyntaxError {
            line,
            column,
            context: render_context(self.source, line, column, self.context_lines),
            message,
            token_text: offending.map(str::to_string),
        });
    }
}
