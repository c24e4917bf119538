//! Statement boundary resolution.
//!
//! [`BoundaryResolver`] listens to the parse tree walk and records one
//! [`StatementSpan`] per top-level construct. Block-style rules raise a depth
//! counter so that statements nested inside a PL/SQL body are not reported
//! on their own.

mod dedup;

pub use dedup::deduplicate;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::lexer::Token;
use crate::parser::{ParseTreeListener, RuleContext, RuleKind, RuleRole, TokenStream};
use crate::statement::StatementType;

/// One statement found in a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementSpan {
    /// Verbatim source from the first to the last token of the statement.
    pub content: String,
    /// Line of the first token (1-based).
    pub start_line: usize,
    /// Column of the first token (0-based).
    pub start_column: usize,
    /// Line of the last token (1-based).
    pub end_line: usize,
    /// Column just past the last character of the last token.
    pub end_column: usize,
    /// Statement type, `Unknown` until classified.
    pub statement_type: StatementType,
}

impl StatementSpan {
    /// Position key used to detect the same statement reported twice.
    #[must_use]
    pub const fn key(&self) -> (usize, usize, usize, usize) {
        (
            self.start_line,
            self.start_column,
            self.end_line,
            self.end_column,
        )
    }
}

/// Tree listener that turns rule events into statement spans.
#[derive(Debug)]
pub struct BoundaryResolver<'a> {
    tokens: &'a TokenStream<'a>,
    depth: usize,
    statements: Vec<StatementSpan>,
}

impl<'a> BoundaryResolver<'a> {
    /// Creates a resolver reading token text from `tokens`.
    #[must_use]
    pub const fn new(tokens: &'a TokenStream<'a>) -> Self {
        Self {
            tokens,
            depth: 0,
            statements: Vec::new(),
        }
    }

    /// Current block nesting depth.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Statements recorded so far, in the order they were entered.
    #[must_use]
    pub fn statements(&self) -> &[StatementSpan] {
        &self.statements
    }

    /// Consumes the resolver and returns the raw statement list.
    ///
    /// The list may contain the same span several times; see [`deduplicate`].
    #[must_use]
    pub fn into_statements(self) -> Vec<StatementSpan> {
        self.statements
    }

    fn span(&self, start: &Token, stop: &Token, statement_type: StatementType) -> StatementSpan {
        StatementSpan {
            content: self.tokens.text_between(start, stop).to_string(),
            start_line: start.line(),
            start_column: start.column(),
            end_line: stop.line(),
            end_column: stop.column() + self.tokens.text(stop).chars().count(),
            statement_type,
        }
    }

    fn emit(&mut self, start: &Token, stop: &Token, statement_type: StatementType) {
        let span = self.span(start, stop, statement_type);
        trace!(
            line = span.start_line,
            column = span.start_column,
            statement_type = %span.statement_type,
            "statement boundary"
        );
        self.statements.push(span);
    }

    /// Type of a transaction control statement from its leading keyword.
    fn transaction_type(&self, start: &Token) -> StatementType {
        let leader = self.tokens.text(start).trim().to_uppercase();
        match leader.as_str() {
            "COMMIT" => StatementType::Commit,
            "ROLLBACK" => StatementType::Rollback,
            "SAVEPOINT" => StatementType::Savepoint,
            _ => StatementType::Transaction,
        }
    }
}

/// Statement type of a block rule that is a statement of its own.
const fn block_type(kind: RuleKind) -> StatementType {
    match kind {
        RuleKind::AnonymousBlock => StatementType::PlsqlBlock,
        RuleKind::CreateProcedureBody => StatementType::CreateProcedure,
        RuleKind::CreateFunctionBody => StatementType::CreateFunction,
        RuleKind::CreatePackage => StatementType::CreatePackage,
        RuleKind::CreatePackageBody => StatementType::CreatePackageBody,
        RuleKind::CreateTrigger => StatementType::CreateTrigger,
        RuleKind::CreateType => StatementType::CreateType,
        RuleKind::CreateTypeBody => StatementType::CreateTypeBody,
        _ => StatementType::Unknown,
    }
}

impl ParseTreeListener for BoundaryResolver<'_> {
    fn enter_rule(&mut self, ctx: &RuleContext<'_>) {
        let (Some(start), Some(stop)) = (ctx.start, ctx.stop) else {
            return;
        };
        match ctx.kind.role() {
            RuleRole::Statement if self.depth == 0 => {
                self.emit(start, stop, StatementType::Unknown);
            }
            RuleRole::TransactionControl if self.depth == 0 => {
                let statement_type = self.transaction_type(start);
                self.emit(start, stop, statement_type);
            }
            RuleRole::ExecutableBlock => {
                self.depth += 1;
                if self.depth == 1 {
                    self.emit(start, stop, block_type(ctx.kind));
                }
            }
            RuleRole::NestedBlock => self.depth += 1,
            _ => {}
        }
    }

    fn exit_rule(&mut self, ctx: &RuleContext<'_>) {
        if ctx.start.is_none() || ctx.stop.is_none() {
            return;
        }
        if matches!(
            ctx.kind.role(),
            RuleRole::ExecutableBlock | RuleRole::NestedBlock
        ) {
            if self.depth == 0 {
                warn!(rule = ?ctx.kind, "block exit without matching enter");
            } else {
                self.depth -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseOptions, Parser, SyntaxErrorCollector};

    fn resolve(source: &str) -> Vec<StatementSpan> {
        let stream = TokenStream::new(source);
        let mut errors = SyntaxErrorCollector::new(0, source, 0);
        let tree = Parser::new(&stream, ParseOptions::default(), &mut errors).parse();
        let mut resolver = BoundaryResolver::new(&stream);
        tree.walk(&stream, &mut resolver);
        assert_eq!(resolver.depth(), 0);
        resolver.into_statements()
    }

    fn ctx<'t>(kind: RuleKind, token: &'t Token) -> RuleContext<'t> {
        RuleContext {
            kind,
            start: Some(token),
            stop: Some(token),
        }
    }

    #[test]
    fn test_select_positions() {
        let spans = deduplicate(resolve("SELECT * FROM employees;"));
        assert_eq!(spans.len(), 1);
        let span = &spans[0];
        assert_eq!(span.content, "SELECT * FROM employees");
        assert_eq!(span.key(), (1, 0, 1, 23));
        assert_eq!(span.statement_type, StatementType::Unknown);
    }

    #[test]
    fn test_anonymous_block_is_tagged() {
        let spans = deduplicate(resolve("BEGIN\n  NULL;\nEND;"));
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].statement_type, StatementType::PlsqlBlock);
        assert_eq!(spans[0].content, "BEGIN\n  NULL;\nEND;");
        assert_eq!(spans[0].key(), (1, 0, 3, 4));
    }

    #[test]
    fn test_nested_statements_are_not_reported() {
        let source = "BEGIN\n  UPDATE t SET x = 1;\n  BEGIN\n    COMMIT;\n  END;\nEND;";
        let spans = deduplicate(resolve(source));
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].statement_type, StatementType::PlsqlBlock);
    }

    #[test]
    fn test_transaction_control_types() {
        let spans = deduplicate(resolve(
            "COMMIT;\nROLLBACK;\nSAVEPOINT sp1;\nSET TRANSACTION READ ONLY;",
        ));
        let types: Vec<StatementType> = spans.iter().map(|s| s.statement_type).collect();
        assert_eq!(
            types,
            vec![
                StatementType::Commit,
                StatementType::Rollback,
                StatementType::Savepoint,
                StatementType::Transaction,
            ]
        );
    }

    #[test]
    fn test_create_units_are_tagged() {
        let source = "CREATE OR REPLACE PROCEDURE p IS\nBEGIN\n  NULL;\nEND;\n/\n\
                      CREATE TABLE t (id NUMBER);";
        let spans = deduplicate(resolve(source));
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].statement_type, StatementType::CreateProcedure);
        assert_eq!(spans[1].statement_type, StatementType::Unknown);
        assert_eq!(spans[1].content, "CREATE TABLE t (id NUMBER)");
    }

    #[test]
    fn test_end_column_counts_characters() {
        let spans = deduplicate(resolve("SELECT 'héllo' FROM dual;"));
        assert_eq!(spans[0].end_column, 24);
    }

    #[test]
    fn test_rules_without_tokens_are_ignored() {
        let stream = TokenStream::new("");
        let mut resolver = BoundaryResolver::new(&stream);
        let empty = RuleContext {
            kind: RuleKind::AnonymousBlock,
            start: None,
            stop: None,
        };
        resolver.enter_rule(&empty);
        assert_eq!(resolver.depth(), 0);
        assert!(resolver.statements().is_empty());
    }

    #[test]
    fn test_depth_is_clamped_at_zero() {
        let stream = TokenStream::new("BEGIN");
        let token = &stream.tokens()[0];
        let mut resolver = BoundaryResolver::new(&stream);
        resolver.exit_rule(&ctx(RuleKind::Block, token));
        assert_eq!(resolver.depth(), 0);
        resolver.enter_rule(&ctx(RuleKind::AnonymousBlock, token));
        assert_eq!(resolver.depth(), 1);
        assert_eq!(resolver.statements().len(), 1);
    }

    #[test]
    fn test_nested_block_alone_emits_nothing() {
        let stream = TokenStream::new("BEGIN");
        let token = &stream.tokens()[0];
        let mut resolver = BoundaryResolver::new(&stream);
        resolver.enter_rule(&ctx(RuleKind::DeclareSection, token));
        resolver.enter_rule(&ctx(RuleKind::DataManipulation, token));
        assert_eq!(resolver.depth(), 1);
        assert!(resolver.statements().is_empty());
        resolver.exit_rule(&ctx(RuleKind::DeclareSection, token));
        resolver.enter_rule(&ctx(RuleKind::DataManipulation, token));
        assert_eq!(resolver.statements().len(), 1);
    }
}
