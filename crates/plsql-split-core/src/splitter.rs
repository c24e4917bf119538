//! Public splitting API.
//!
//! A [`Splitter`] turns a script into [`Statement`]s, or into a
//! [`SyntaxErrorReport`] when the script does not parse. Options follow the
//! builder style:
//!
//! ```rust
//! use plsql_split_core::{Splitter, StatementType};
//!
//! let splitter = Splitter::new().with_max_errors(5).with_verbose_errors(true);
//! let statements = splitter
//!     .split_str("SELECT * FROM employees;\nCOMMIT;")
//!     .unwrap();
//!
//! assert_eq!(statements.len(), 2);
//! assert_eq!(statements[0].statement_type, StatementType::Select);
//! assert_eq!(statements[1].statement_type, StatementType::Commit);
//! ```

use core::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::parser::{ParseOptions, SyntaxError};
use crate::resolver::StatementSpan;
use crate::script::{parse_script_with, ScriptOptions};
use crate::statement::StatementType;

/// Messages longer than this that list expected tokens are shortened.
const LONG_MESSAGE: usize = 200;

/// A statement returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    /// Verbatim statement text.
    pub content: String,
    /// First line (1-based), 0 when positions are disabled.
    pub start_line: usize,
    /// Last line (1-based), 0 when positions are disabled.
    pub end_line: usize,
    /// First column (0-based).
    pub start_column: usize,
    /// Column past the last character.
    pub end_column: usize,
    /// Statement type.
    #[serde(rename = "type")]
    pub statement_type: StatementType,
}

impl Statement {
    fn from_span(span: StatementSpan, include_position: bool) -> Self {
        if include_position {
            Self {
                content: span.content,
                start_line: span.start_line,
                end_line: span.end_line,
                start_column: span.start_column,
                end_column: span.end_column,
                statement_type: span.statement_type,
            }
        } else {
            Self {
                content: span.content,
                start_line: 0,
                end_line: 0,
                start_column: 0,
                end_column: 0,
                statement_type: span.statement_type,
            }
        }
    }
}

/// A syntax error returned to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxErrorReport {
    /// Line of the error (1-based).
    pub line: usize,
    /// Column of the error (0-based).
    pub column: usize,
    /// Error message. In verbose mode, several errors joined by newlines.
    pub message: String,
    /// First line of the context, when requested.
    pub statement: String,
    /// Source excerpt around the error.
    pub context: String,
}

impl SyntaxErrorReport {
    fn from_error(error: &SyntaxError, include_statement: bool) -> Self {
        Self {
            line: error.line,
            column: error.column,
            message: error.message.clone(),
            statement: statement_line(&error.context, include_statement),
            context: error.context.clone(),
        }
    }
}

fn statement_line(context: &str, include_statement: bool) -> String {
    if include_statement && !context.is_empty() {
        context.split('\n').next().unwrap_or_default().to_string()
    } else {
        String::new()
    }
}

impl fmt::Display for SyntaxErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "syntax error at line {}, column {}: ", self.line, self.column)?;
        if !self.context.is_empty() {
            return write!(f, "{}\n{}", self.message, self.context);
        }
        if self.message.len() > LONG_MESSAGE {
            if let Some((head, _)) = self.message.split_once("expecting {") {
                return write!(f, "{} expecting {{...}}", head.trim());
            }
        }
        f.write_str(&self.message)
    }
}

impl std::error::Error for SyntaxErrorReport {}

/// Splits scripts into statements.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Splitter {
    include_position: bool,
    verbose_errors: bool,
    max_errors: usize,
    include_context: bool,
    include_error_statement: bool,
    context_lines: usize,
    parse_options: ParseOptions,
}

impl Default for Splitter {
    fn default() -> Self {
        Self {
            include_position: true,
            verbose_errors: false,
            max_errors: 1,
            include_context: false,
            include_error_statement: false,
            context_lines: 3,
            parse_options: ParseOptions::default(),
        }
    }
}

impl Splitter {
    /// Creates a splitter that fails on the first syntax error.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep or zero out statement positions.
    #[must_use]
    pub const fn with_position_info(mut self, include: bool) -> Self {
        self.include_position = include;
        self
    }

    /// Report up to `max_errors` errors in one message instead of the first.
    #[must_use]
    pub const fn with_verbose_errors(mut self, verbose: bool) -> Self {
        self.verbose_errors = verbose;
        self
    }

    /// Maximum number of errors collected, 0 for no limit.
    #[must_use]
    pub const fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }

    /// Append source context to each error of a verbose message.
    #[must_use]
    pub const fn with_error_context(mut self, include: bool) -> Self {
        self.include_context = include;
        self
    }

    /// Fill in [`SyntaxErrorReport::statement`].
    #[must_use]
    pub const fn with_error_statement(mut self, include: bool) -> Self {
        self.include_error_statement = include;
        self
    }

    /// Lines of context on each side of an error.
    #[must_use]
    pub const fn with_error_context_lines(mut self, lines: usize) -> Self {
        self.context_lines = lines;
        self
    }

    /// Parser dialect options.
    #[must_use]
    pub const fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    fn script_options(&self) -> ScriptOptions {
        ScriptOptions::new()
            .with_max_errors(self.max_errors)
            .with_context_lines(self.context_lines)
            .with_parse_options(self.parse_options)
    }

    /// Splits a script held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::Syntax`](crate::SplitError::Syntax) if the
    /// script has a syntax error.
    pub fn split_str(&self, source: &str) -> Result<Vec<Statement>> {
        let (statements, errors) = self.parse_raw(source);
        if errors.is_empty() {
            Ok(statements)
        } else {
            Err(self.error_report(&errors).into())
        }
    }

    /// Reads a whole script from `reader` and splits it.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the script has a syntax error.
    pub fn split_reader<R: Read>(&self, mut reader: R) -> Result<Vec<Statement>> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        self.split_str(&source)
    }

    /// Reads a script file and splits it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or has a syntax error.
    pub fn split_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Statement>> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading script");
        let source = fs::read_to_string(path)?;
        self.split_str(&source)
    }

    /// Returns the statements and the syntax errors of a script.
    ///
    /// Unlike [`Splitter::split_str`], statements found around errors are
    /// kept.
    #[must_use]
    pub fn parse(&self, source: &str) -> (Vec<Statement>, Vec<SyntaxErrorReport>) {
        let (statements, errors) = self.parse_raw(source);
        let reports = errors
            .iter()
            .map(|error| SyntaxErrorReport::from_error(error, self.include_error_statement))
            .collect();
        (statements, reports)
    }

    /// Returns up to `max_errors` syntax errors of a script.
    #[must_use]
    pub fn syntax_errors(&self, source: &str) -> Vec<SyntaxErrorReport> {
        self.parse(source).1
    }

    /// Returns every syntax error of a script, ignoring the error cap.
    #[must_use]
    pub fn all_syntax_errors(&self, source: &str) -> Vec<SyntaxErrorReport> {
        self.with_max_errors(0).syntax_errors(source)
    }

    fn parse_raw(&self, source: &str) -> (Vec<Statement>, Vec<SyntaxError>) {
        let outcome = parse_script_with(source, &self.script_options());
        let statements = outcome
            .statements
            .into_iter()
            .map(|span| Statement::from_span(span, self.include_position))
            .collect();
        (statements, outcome.errors)
    }

    /// Builds the report for a failed split. `errors` is not empty.
    fn error_report(&self, errors: &[SyntaxError]) -> SyntaxErrorReport {
        let first = &errors[0];
        let mut report = SyntaxErrorReport::from_error(first, self.include_error_statement);
        if !self.verbose_errors {
            return report;
        }

        let shown = if self.max_errors == 0 {
            errors.len()
        } else {
            self.max_errors.min(errors.len())
        };
        let mut messages: Vec<String> = errors[..shown]
            .iter()
            .map(|error| {
                let mut message = format!(
                    "Line {}, Column {}: {}",
                    error.line, error.column, error.message
                );
                if self.include_context && !error.context.is_empty() {
                    message.push('\n');
                    message.push_str(&error.context);
                }
                message
            })
            .collect();
        if errors.len() > shown {
            messages.push(format!("... and {} more errors", errors.len() - shown));
        }
        report.message = messages.join("\n");
        report
    }
}

/// Splits a script with the default options.
///
/// # Errors
///
/// Returns an error on the first syntax error.
pub fn split_str(source: &str) -> Result<Vec<Statement>> {
    Splitter::new().split_str(source)
}

/// Reads and splits a script with the default options.
///
/// # Errors
///
/// Returns an error if reading fails or on the first syntax error.
pub fn split_reader<R: Read>(reader: R) -> Result<Vec<Statement>> {
    Splitter::new().split_reader(reader)
}

/// Reads and splits a script file with the default options.
///
/// # Errors
///
/// Returns an error if the file cannot be read or on the first syntax error.
pub fn split_file<P: AsRef<Path>>(path: P) -> Result<Vec<Statement>> {
    Splitter::new().split_file(path)
}
