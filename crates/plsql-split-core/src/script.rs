//! Whole-script parsing: lexing, parsing, boundary resolution and
//! classification in one call.

use tracing::debug;

use crate::parser::{ParseOptions, Parser, SyntaxError, SyntaxErrorCollector, TokenStream};
use crate::resolver::{deduplicate, BoundaryResolver, StatementSpan};
use crate::statement::StatementType;

/// Knobs for [`parse_script_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptOptions {
    /// Maximum number of syntax errors kept, 0 for all of them.
    pub max_errors: usize,
    /// Lines of source shown on each side of an error.
    pub context_lines: usize,
    /// Dialect options for the parser.
    pub parse_options: ParseOptions,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            max_errors: 1,
            context_lines: 3,
            parse_options: ParseOptions::default(),
        }
    }
}

impl ScriptOptions {
    /// Creates the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the error cap.
    #[must_use]
    pub const fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }

    /// Sets the context radius.
    #[must_use]
    pub const fn with_context_lines(mut self, context_lines: usize) -> Self {
        self.context_lines = context_lines;
        self
    }

    /// Sets the parser options.
    #[must_use]
    pub const fn with_parse_options(mut self, parse_options: ParseOptions) -> Self {
        self.parse_options = parse_options;
        self
    }
}

/// Statements and syntax errors found in a script.
///
/// Both lists may be non-empty: statements before, between and after
/// errors are still reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    /// Statements in source order.
    pub statements: Vec<StatementSpan>,
    /// Syntax errors in the order they were found.
    pub errors: Vec<SyntaxError>,
}

impl ParseOutcome {
    /// Returns true if no syntax error was found.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parses `source` with the given error cap and context radius.
#[must_use]
pub fn parse_script(source: &str, max_errors: usize, context_lines: usize) -> ParseOutcome {
    let options = ScriptOptions::new()
        .with_max_errors(max_errors)
        .with_context_lines(context_lines);
    parse_script_with(source, &options)
}

/// Parses `source` into classified statements and syntax errors.
#[must_use]
pub fn parse_script_with(source: &str, options: &ScriptOptions) -> ParseOutcome {
    if source.trim().is_empty() {
        return ParseOutcome::default();
    }

    let stream = TokenStream::new(source);
    let mut collector = SyntaxErrorCollector::new(options.max_errors, source, options.context_lines);
    let tree = Parser::new(&stream, options.parse_options, &mut collector).parse();

    let mut resolver = BoundaryResolver::new(&stream);
    tree.walk(&stream, &mut resolver);

    let mut statements = deduplicate(resolver.into_statements());
    for statement in &mut statements {
        if statement.statement_type == StatementType::Unknown {
            statement.statement_type = StatementType::classify(&statement.content);
        }
    }

    let errors = collector.into_errors();
    debug!(
        tokens = stream.len(),
        statements = statements.len(),
        errors = errors.len(),
        "parsed script"
    );
    ParseOutcome { statements, errors }
}
