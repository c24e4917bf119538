//! Structural parser for Oracle SQL and PL/SQL scripts.
//!
//! The parser recognises statement boundaries and PL/SQL block structure and
//! records them as a [`ParseTree`]. Expressions are scanned rather than
//! parsed: a SQL statement is a balanced run of tokens up to its terminator,
//! with a few structural checks that catch the common mistakes (a missing
//! table name, unbalanced parentheses, a forgotten `;` between statements).

use tracing::trace;

use super::error::SyntaxErrorListener;
use super::stream::TokenStream;
use super::tree::{ParseTree, RuleKind};
use crate::lexer::{Keyword, Token, TokenKind};

/// Grammar options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Accept Oracle 12c syntax such as `WITH FUNCTION` inline PL/SQL.
    pub version12: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { version12: true }
    }
}

impl ParseOptions {
    /// Creates the default options (Oracle 12c syntax enabled).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables Oracle 12c syntax.
    #[must_use]
    pub const fn with_version12(mut self, enabled: bool) -> Self {
        self.version12 = enabled;
        self
    }
}

/// SQL*Plus commands that the lexer sees as plain identifiers.
const SQLPLUS_COMMANDS: &[&str] = &[
    "ACCEPT", "CLEAR", "COLUMN", "DEFINE", "EXIT", "HOST", "PAUSE", "PRINT", "QUIT", "REM",
    "REMARK", "TIMING", "UNDEFINE", "VAR", "VARIABLE",
];

/// The kinds of top-level unit a script can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Block,
    Create,
    Transaction,
    Manipulation,
    Definition,
    Call,
    SqlPlus,
}

/// Returns true if `keyword` at the start of a line ends a SQL statement
/// led by `leader`, because it must be the start of the next one.
const fn breaks_statement(leader: Option<Keyword>, keyword: Keyword) -> bool {
    // Privilege and audit lists can name any statement.
    if matches!(
        leader,
        Some(Keyword::Grant | Keyword::Revoke | Keyword::Audit | Keyword::Noaudit)
    ) {
        return false;
    }
    let nests_dml = matches!(
        leader,
        Some(Keyword::Alter | Keyword::Merge | Keyword::Explain)
    );
    match keyword {
        Keyword::Create
        | Keyword::Grant
        | Keyword::Revoke
        | Keyword::Commit
        | Keyword::Rollback
        | Keyword::Savepoint
        | Keyword::Begin
        | Keyword::Declare
        | Keyword::End => true,
        Keyword::Insert
        | Keyword::Update
        | Keyword::Delete
        | Keyword::Merge
        | Keyword::Alter
        | Keyword::Drop
        | Keyword::Truncate => !nests_dml,
        _ => false,
    }
}

const fn is_member_modifier(keyword: Keyword) -> bool {
    matches!(
        keyword,
        Keyword::Member
            | Keyword::Static
            | Keyword::Map
            | Keyword::Order
            | Keyword::Constructor
            | Keyword::Overriding
            | Keyword::Final
            | Keyword::Instantiable
            | Keyword::Not
    )
}

const fn is_manipulation(keyword: Keyword) -> bool {
    matches!(
        keyword,
        Keyword::Select
            | Keyword::With
            | Keyword::Insert
            | Keyword::Update
            | Keyword::Delete
            | Keyword::Merge
            | Keyword::Lock
            | Keyword::Explain
    )
}

/// Structural recursive descent parser.
///
/// Syntax errors go to the listener; the parser resynchronises and keeps
/// going so that later statements are still found.
pub struct Parser<'s, 'l, L: SyntaxErrorListener + ?Sized> {
    stream: &'s TokenStream<'s>,
    listener: &'l mut L,
    options: ParseOptions,
    tree: ParseTree,
    /// Index of the current token. Never an error token.
    pos: usize,
    /// Index of the most recently consumed token.
    last_consumed: Option<usize>,
    /// Open rules as (node id, index of their first token).
    open_rules: Vec<(usize, usize)>,
    /// Token the last error was reported at, to avoid cascades.
    last_error: Option<usize>,
}

impl<'s, 'l, L: SyntaxErrorListener + ?Sized> Parser<'s, 'l, L> {
    /// Creates a parser over `stream` reporting to `listener`.
    #[must_use]
    pub fn new(stream: &'s TokenStream<'s>, options: ParseOptions, listener: &'l mut L) -> Self {
        let mut parser = Self {
            stream,
            listener,
            options,
            tree: ParseTree::new(),
            pos: 0,
            last_consumed: None,
            open_rules: Vec::new(),
            last_error: None,
        };
        parser.skip_error_tokens();
        parser
    }

    /// Parses the whole script.
    #[must_use]
    pub fn parse(mut self) -> ParseTree {
        self.parse_script();
        self.tree
    }

    // ---------------------------------------------------------------------
    // Script level
    // ---------------------------------------------------------------------

    fn parse_script(&mut self) {
        self.open(RuleKind::SqlScript);
        loop {
            match &self.current().kind {
                TokenKind::Eof => break,
                TokenKind::Semicolon | TokenKind::BatchSlash => self.advance(),
                _ => {
                    let before = self.pos;
                    match self.unit_kind() {
                        Some(unit) => self.parse_unit_statement(unit),
                        None => self.recover_unit(),
                    }
                    if self.pos == before {
                        self.advance();
                    }
                }
            }
        }
        self.close();
    }

    fn unit_kind(&self) -> Option<Unit> {
        let token = self.current();
        match &token.kind {
            TokenKind::LabelStart => Some(Unit::Block),
            TokenKind::LeftParen => Some(Unit::Manipulation),
            TokenKind::At => Some(Unit::SqlPlus),
            TokenKind::Identifier => {
                let text = self.stream.text(token);
                SQLPLUS_COMMANDS
                    .iter()
                    .any(|command| command.eq_ignore_ascii_case(text))
                    .then_some(Unit::SqlPlus)
            }
            TokenKind::Keyword(keyword) => match keyword {
                Keyword::Begin | Keyword::Declare => Some(Unit::Block),
                Keyword::Create => Some(Unit::Create),
                Keyword::Commit | Keyword::Rollback | Keyword::Savepoint => {
                    Some(Unit::Transaction)
                }
                Keyword::Set => {
                    if self.peek_keyword(1) == Some(Keyword::Transaction) {
                        Some(Unit::Transaction)
                    } else {
                        Some(Unit::SqlPlus)
                    }
                }
                Keyword::Alter
                | Keyword::Drop
                | Keyword::Truncate
                | Keyword::Grant
                | Keyword::Revoke
                | Keyword::Comment
                | Keyword::Rename
                | Keyword::Analyze
                | Keyword::Audit
                | Keyword::Noaudit
                | Keyword::Flashback
                | Keyword::Purge => Some(Unit::Definition),
                Keyword::Call => Some(Unit::Call),
                Keyword::Exec
                | Keyword::Execute
                | Keyword::Show
                | Keyword::Desc
                | Keyword::Describe
                | Keyword::Prompt
                | Keyword::Spool
                | Keyword::Whenever => Some(Unit::SqlPlus),
                kw if is_manipulation(*kw) => Some(Unit::Manipulation),
                _ => None,
            },
            _ => None,
        }
    }

    fn parse_unit_statement(&mut self, unit: Unit) {
        trace!(?unit, line = self.current().line(), "unit statement");
        self.open(RuleKind::UnitStatement);
        match unit {
            Unit::Block => self.parse_anonymous_block(),
            Unit::Create => self.parse_create(),
            Unit::Transaction => self.parse_sql_statement(RuleKind::TransactionControl),
            Unit::Manipulation => self.parse_sql_statement(RuleKind::DataManipulation),
            Unit::Definition => self.parse_sql_statement(RuleKind::DataDefinition),
            Unit::Call => {
                self.open(RuleKind::CallStatement);
                self.scan_sql(Some(Keyword::Call), false);
                self.close();
            }
            Unit::SqlPlus => self.parse_sqlplus_command(),
        }
        self.close();
    }

    /// Reports an unrecognised unit and skips to the next separator.
    fn recover_unit(&mut self) {
        let token = self.current();
        let message = format!("no viable alternative at input '{}'", self.display(token));
        self.report(self.pos, &message);
        while !matches!(
            self.current().kind,
            TokenKind::Semicolon | TokenKind::BatchSlash | TokenKind::Eof
        ) {
            self.advance();
        }
    }

    /// Line-oriented client command, ended by the end of its line or `;`.
    fn parse_sqlplus_command(&mut self) {
        self.open(RuleKind::SqlPlusCommand);
        let line = self.current().line();
        self.advance();
        let mut parens = 0usize;
        loop {
            let token = self.current();
            match &token.kind {
                TokenKind::Eof | TokenKind::Semicolon | TokenKind::BatchSlash => break,
                _ if parens == 0 && token.line() != line => break,
                TokenKind::LeftParen => parens += 1,
                TokenKind::RightParen => parens = parens.saturating_sub(1),
                _ => {}
            }
            self.advance();
        }
        self.close();
    }

    // ---------------------------------------------------------------------
    // SQL statements
    // ---------------------------------------------------------------------

    fn parse_sql_statement(&mut self, kind: RuleKind) {
        self.open(RuleKind::SqlStatement);
        self.open(kind);
        let leader = self.current().as_keyword();
        let inline_plsql = leader == Some(Keyword::With)
            && matches!(
                self.peek_keyword(1),
                Some(Keyword::Function | Keyword::Procedure)
            );
        if inline_plsql && self.options.version12 {
            self.parse_with_plsql();
            self.scan_sql(leader, true);
        } else {
            if inline_plsql {
                let index = self.peek_index(1);
                let message = format!(
                    "no viable alternative at input 'WITH {}'",
                    self.display(self.token_at(index))
                );
                self.report(index, &message);
            }
            self.scan_sql(leader, false);
        }
        self.close();
        self.close();
    }

    /// `WITH FUNCTION ... END; [PROCEDURE ... END;]` before the query.
    fn parse_with_plsql(&mut self) {
        self.open(RuleKind::WithClause);
        self.advance(); // WITH
        while matches!(
            self.current().as_keyword(),
            Some(Keyword::Function | Keyword::Procedure)
        ) {
            self.parse_subprogram();
        }
        self.close();
    }

    /// Consumes a SQL statement up to, not including, its terminator.
    ///
    /// `started` is true when the leading tokens were already consumed.
    fn scan_sql(&mut self, leader: Option<Keyword>, mut started: bool) {
        let mut parens = 0usize;
        let mut case_depth = 0usize;
        loop {
            let index = self.pos;
            let token = self.current();
            match &token.kind {
                TokenKind::Eof | TokenKind::Semicolon | TokenKind::BatchSlash => {
                    if parens > 0 {
                        let message = format!("missing ')' at '{}'", self.display(token));
                        self.report(index, &message);
                    }
                    return;
                }
                TokenKind::LeftParen => parens += 1,
                TokenKind::RightParen => {
                    if parens == 0 {
                        self.report(index, "extraneous input ')'");
                    } else {
                        parens -= 1;
                    }
                }
                TokenKind::Keyword(Keyword::Case) => case_depth += 1,
                TokenKind::Keyword(Keyword::End) if case_depth > 0 => case_depth -= 1,
                TokenKind::Keyword(keyword)
                    if started
                        && parens == 0
                        && self.starts_line(token)
                        && self.ends_statement(leader, *keyword) =>
                {
                    let message =
                        format!("mismatched input '{}' expecting ';'", self.display(token));
                    self.report(index, &message);
                    return;
                }
                _ => {}
            }
            // `FROM` inside parentheses may belong to TRIM or EXTRACT.
            let introduces_table = parens == 0
                && match token.as_keyword() {
                    Some(Keyword::From | Keyword::Join | Keyword::Into | Keyword::Table) => true,
                    Some(Keyword::Update) => !started,
                    _ => false,
                };
            self.advance();
            started = true;
            if introduces_table {
                self.expect_table_reference();
            }
        }
    }

    /// Returns true if `keyword` at the start of a line ends the statement
    /// being scanned.
    fn ends_statement(&self, leader: Option<Keyword>, keyword: Keyword) -> bool {
        match keyword {
            Keyword::Select => !self.query_may_follow(leader),
            Keyword::With => self.starts_query_factoring() && !self.query_may_follow(leader),
            _ => breaks_statement(leader, keyword),
        }
    }

    /// Returns true if the current `WITH` opens `name AS (` or inline PL/SQL
    /// rather than a trailing clause such as `WITH READ ONLY`.
    fn starts_query_factoring(&self) -> bool {
        if matches!(
            self.peek_keyword(1),
            Some(Keyword::Function | Keyword::Procedure)
        ) {
            return true;
        }
        self.token_at(self.peek_index(1)).is_name()
            && (self.peek_keyword(2) == Some(Keyword::As)
                || matches!(
                    self.token_at(self.peek_index(2)).kind,
                    TokenKind::LeftParen
                ))
    }

    /// Returns true if a query can continue the statement at this point:
    /// after a set operator, `AS`, the inline PL/SQL of a `WITH`, or the
    /// subquery factoring list.
    fn query_may_follow(&self, leader: Option<Keyword>) -> bool {
        if matches!(
            leader,
            Some(
                Keyword::Insert
                    | Keyword::Explain
                    | Keyword::Grant
                    | Keyword::Revoke
                    | Keyword::Audit
                    | Keyword::Noaudit
            )
        ) {
            return true;
        }
        let Some(index) = self.last_consumed else {
            return true;
        };
        let previous = self.token_at(index);
        match &previous.kind {
            TokenKind::Semicolon => true,
            TokenKind::RightParen => leader == Some(Keyword::With),
            TokenKind::Keyword(
                Keyword::As | Keyword::Union | Keyword::Intersect | Keyword::Minus,
            ) => true,
            _ => self.stream.text(previous).eq_ignore_ascii_case("ALL"),
        }
    }

    fn expect_table_reference(&mut self) {
        let token = self.current();
        if !token.is_name() && !matches!(token.kind, TokenKind::LeftParen) {
            let message = format!(
                "mismatched input '{}' expecting table reference",
                self.display(token)
            );
            self.report(self.pos, &message);
        }
    }

    // ---------------------------------------------------------------------
    // PL/SQL units
    // ---------------------------------------------------------------------

    fn parse_anonymous_block(&mut self) {
        self.open(RuleKind::AnonymousBlock);
        self.skip_labels();
        if self.check_keyword(Keyword::Declare) {
            self.advance();
            self.parse_declare_section(&[]);
        }
        self.parse_body();
        self.expect_semicolon();
        self.close();
    }

    fn parse_create(&mut self) {
        let mut offset = 1;
        if self.peek_keyword(offset) == Some(Keyword::Or) {
            offset += 2; // OR REPLACE
        }
        if matches!(
            self.peek_keyword(offset),
            Some(Keyword::Editionable | Keyword::Noneditionable)
        ) {
            offset += 1;
        }
        let followed_by_body = self.peek_keyword(offset + 1) == Some(Keyword::Body);
        let kind = match self.peek_keyword(offset) {
            Some(Keyword::Procedure) => RuleKind::CreateProcedureBody,
            Some(Keyword::Function) => RuleKind::CreateFunctionBody,
            Some(Keyword::Package) if followed_by_body => RuleKind::CreatePackageBody,
            Some(Keyword::Package) => RuleKind::CreatePackage,
            Some(Keyword::Trigger) => RuleKind::CreateTrigger,
            Some(Keyword::Type) if followed_by_body => RuleKind::CreateTypeBody,
            Some(Keyword::Type) => RuleKind::CreateType,
            _ => {
                self.parse_sql_statement(RuleKind::DataDefinition);
                return;
            }
        };

        self.open(kind);
        for _ in 0..=offset {
            self.advance();
        }
        match kind {
            RuleKind::CreateProcedureBody | RuleKind::CreateFunctionBody => {
                self.parse_subprogram_tail();
            }
            RuleKind::CreatePackage => self.parse_package_spec(),
            RuleKind::CreatePackageBody | RuleKind::CreateTypeBody => {
                self.advance(); // BODY
                self.parse_package_body();
            }
            RuleKind::CreateTrigger => self.parse_trigger(),
            _ => self.parse_type_spec(),
        }
        self.close();
    }

    /// Everything after `PROCEDURE`/`FUNCTION`: name, parameters, return
    /// clause, then either `;` or `IS|AS` and an implementation.
    fn parse_subprogram_tail(&mut self) {
        if !self.skip_header(&[Keyword::Is, Keyword::As]) {
            self.expect_semicolon();
            return;
        }
        self.advance(); // IS | AS
        if matches!(
            self.current().as_keyword(),
            Some(Keyword::Language | Keyword::External)
        ) {
            self.skip_to_semicolon();
            return;
        }
        self.parse_declare_section(&[]);
        self.parse_body();
        self.expect_semicolon();
    }

    fn parse_subprogram(&mut self) {
        self.open(RuleKind::SubprogramBody);
        self.advance(); // PROCEDURE | FUNCTION
        self.parse_subprogram_tail();
        self.close();
    }

    fn parse_package_spec(&mut self) {
        if !self.skip_header(&[Keyword::Is, Keyword::As]) {
            self.expect_keyword(Keyword::Is);
            return;
        }
        self.advance(); // IS | AS
        self.parse_declare_section(&[]);
        if self.check_keyword(Keyword::Begin) {
            let message = format!(
                "no viable alternative at input '{}'",
                self.display(self.current())
            );
            self.report(self.pos, &message);
            self.parse_body();
        } else {
            self.parse_end(None);
        }
        self.expect_semicolon();
    }

    /// Package and type bodies: declarations, an optional initialisation
    /// section, `END [name];`.
    fn parse_package_body(&mut self) {
        if !self.skip_header(&[Keyword::Is, Keyword::As]) {
            self.expect_keyword(Keyword::Is);
            return;
        }
        self.advance(); // IS | AS
        self.parse_declare_section(&[]);
        if self.check_keyword(Keyword::Begin) {
            self.parse_body();
        } else {
            self.parse_end(None);
        }
        self.expect_semicolon();
    }

    /// Object type specifications are plain declarations up to `;` or `/`.
    fn parse_type_spec(&mut self) {
        let mut parens = 0usize;
        loop {
            let index = self.pos;
            let token = self.current();
            match &token.kind {
                TokenKind::Eof | TokenKind::BatchSlash => return,
                TokenKind::Semicolon if parens == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::Keyword(Keyword::Create) if parens == 0 && self.starts_line(token) => {
                    let message = format!("missing ';' at '{}'", self.display(token));
                    self.report(index, &message);
                    return;
                }
                TokenKind::LeftParen => parens += 1,
                TokenKind::RightParen => parens = parens.saturating_sub(1),
                _ => {}
            }
            self.advance();
        }
    }

    fn parse_trigger(&mut self) {
        let mut parens = 0usize;
        loop {
            let token = self.current();
            match &token.kind {
                TokenKind::Eof | TokenKind::BatchSlash | TokenKind::Semicolon => {
                    let message =
                        format!("mismatched input '{}' expecting BEGIN", self.display(token));
                    self.report(self.pos, &message);
                    return;
                }
                TokenKind::LeftParen => parens += 1,
                TokenKind::RightParen => parens = parens.saturating_sub(1),
                TokenKind::Keyword(
                    Keyword::Begin | Keyword::Declare | Keyword::Compound | Keyword::Call,
                ) if parens == 0 => break,
                _ => {}
            }
            self.advance();
        }

        match self.current().as_keyword() {
            Some(Keyword::Declare) => {
                self.advance();
                self.parse_declare_section(&[]);
                self.parse_body();
                self.expect_semicolon();
            }
            Some(Keyword::Begin) => {
                self.parse_body();
                self.expect_semicolon();
            }
            Some(Keyword::Compound) => {
                self.advance();
                self.expect_keyword(Keyword::Trigger);
                self.parse_compound_trigger();
            }
            _ => self.skip_to_semicolon(),
        }
    }

    /// Shared declarations followed by timing-point sections such as
    /// `BEFORE EACH ROW IS BEGIN ... END BEFORE EACH ROW;`.
    fn parse_compound_trigger(&mut self) {
        let timing_points = [Keyword::Before, Keyword::After, Keyword::Instead];
        self.parse_declare_section(&timing_points);
        while self
            .current()
            .as_keyword()
            .is_some_and(|kw| timing_points.contains(&kw))
        {
            self.skip_header(&[Keyword::Is]);
            self.expect_keyword(Keyword::Is);
            self.parse_body();
            self.expect_semicolon();
        }
        self.parse_end(None);
        self.expect_semicolon();
    }

    // ---------------------------------------------------------------------
    // Declarations
    // ---------------------------------------------------------------------

    fn parse_declare_section(&mut self, extra_stops: &[Keyword]) {
        self.open(RuleKind::DeclareSection);
        loop {
            let before = self.pos;
            match &self.current().kind {
                TokenKind::Eof | TokenKind::BatchSlash => break,
                TokenKind::Keyword(Keyword::Begin | Keyword::End | Keyword::Create) => break,
                TokenKind::Keyword(kw) if extra_stops.contains(kw) => break,
                TokenKind::Keyword(Keyword::Procedure | Keyword::Function) => {
                    self.parse_subprogram();
                }
                TokenKind::Keyword(kw) if is_member_modifier(*kw) => {
                    while self.current().as_keyword().is_some_and(is_member_modifier) {
                        self.advance();
                    }
                    if matches!(
                        self.current().as_keyword(),
                        Some(Keyword::Procedure | Keyword::Function)
                    ) {
                        self.parse_subprogram();
                    } else {
                        self.skip_to_semicolon();
                    }
                }
                _ => self.skip_to_semicolon(),
            }
            if self.pos == before {
                break;
            }
        }
        self.close();
    }

    /// Consumes a subprogram or timing-point header up to one of `stops`.
    ///
    /// Returns false if the header ended some other way, leaving the
    /// current token in place.
    fn skip_header(&mut self, stops: &[Keyword]) -> bool {
        let mut parens = 0usize;
        loop {
            let token = self.current();
            match &token.kind {
                TokenKind::Eof | TokenKind::BatchSlash => return false,
                TokenKind::Semicolon if parens == 0 => return false,
                TokenKind::LeftParen => parens += 1,
                TokenKind::RightParen => parens = parens.saturating_sub(1),
                TokenKind::Keyword(Keyword::Begin | Keyword::End) if parens == 0 => return false,
                // RETURN SELF AS RESULT
                TokenKind::Keyword(Keyword::As) if parens == 0 && self.next_is_result() => {
                    self.advance();
                }
                TokenKind::Keyword(kw) if parens == 0 && stops.contains(kw) => return true,
                _ => {}
            }
            self.advance();
        }
    }

    fn next_is_result(&self) -> bool {
        let next = self.token_at(self.peek_index(1));
        next.kind == TokenKind::Identifier && self.stream.text(next).eq_ignore_ascii_case("RESULT")
    }

    // ---------------------------------------------------------------------
    // Bodies and statements
    // ---------------------------------------------------------------------

    /// `BEGIN seq [EXCEPTION handlers] END [label]`, without the `;`.
    fn parse_body(&mut self) {
        self.open(RuleKind::Body);
        if self.expect_keyword(Keyword::Begin) {
            self.parse_seq_of_statements();
            if self.check_keyword(Keyword::Exception) {
                self.advance();
                while self.check_keyword(Keyword::When) {
                    self.parse_exception_handler();
                }
            }
            self.parse_end(None);
        }
        self.close();
    }

    fn parse_exception_handler(&mut self) {
        self.open(RuleKind::ExceptionHandler);
        self.advance(); // WHEN
        self.skip_condition(Keyword::Then);
        self.expect_keyword(Keyword::Then);
        self.parse_seq_of_statements();
        self.close();
    }

    /// Statements up to a keyword that closes or continues the enclosing
    /// construct (END, EXCEPTION, WHEN, ELSIF, ELSE).
    fn parse_seq_of_statements(&mut self) {
        self.open(RuleKind::SeqOfStatements);
        loop {
            let before = self.pos;
            match &self.current().kind {
                TokenKind::Eof | TokenKind::BatchSlash => break,
                TokenKind::Keyword(
                    Keyword::End
                    | Keyword::Exception
                    | Keyword::When
                    | Keyword::Elsif
                    | Keyword::Else
                    | Keyword::Create,
                ) => break,
                TokenKind::Semicolon => self.advance(),
                _ => self.parse_plsql_statement(),
            }
            if self.pos == before {
                self.advance();
            }
        }
        self.close();
    }

    fn parse_plsql_statement(&mut self) {
        self.open(RuleKind::PlsqlStatement);
        self.skip_labels();
        match self.current().as_keyword() {
            Some(Keyword::Begin) => self.parse_block(),
            Some(Keyword::Declare) => self.parse_declare_block(),
            Some(Keyword::If | Keyword::Loop | Keyword::For | Keyword::While | Keyword::Case) => {
                self.parse_control_statement();
            }
            Some(Keyword::Commit | Keyword::Rollback | Keyword::Savepoint) => {
                self.parse_sql_statement(RuleKind::TransactionControl);
                self.expect_semicolon();
            }
            Some(Keyword::Set) if self.peek_keyword(1) == Some(Keyword::Transaction) => {
                self.parse_sql_statement(RuleKind::TransactionControl);
                self.expect_semicolon();
            }
            Some(kw) if is_manipulation(kw) => {
                self.parse_sql_statement(RuleKind::DataManipulation);
                self.expect_semicolon();
            }
            _ => self.skip_to_semicolon(),
        }
        self.close();
    }

    fn parse_block(&mut self) {
        self.open(RuleKind::Block);
        self.parse_body();
        self.expect_semicolon();
        self.close();
    }

    fn parse_declare_block(&mut self) {
        self.open(RuleKind::DeclareBlock);
        self.advance(); // DECLARE
        self.parse_declare_section(&[]);
        self.parse_body();
        self.expect_semicolon();
        self.close();
    }

    fn parse_control_statement(&mut self) {
        self.open(RuleKind::ControlStatement);
        match self.current().as_keyword() {
            Some(Keyword::If) => {
                self.advance();
                self.skip_condition(Keyword::Then);
                self.expect_keyword(Keyword::Then);
                self.parse_seq_of_statements();
                loop {
                    if self.check_keyword(Keyword::Elsif) {
                        self.advance();
                        self.skip_condition(Keyword::Then);
                        self.expect_keyword(Keyword::Then);
                        self.parse_seq_of_statements();
                    } else if self.check_keyword(Keyword::Else) {
                        self.advance();
                        self.parse_seq_of_statements();
                    } else {
                        break;
                    }
                }
                self.parse_end(Some(Keyword::If));
            }
            Some(Keyword::Case) => {
                self.advance();
                self.skip_condition(Keyword::When);
                while self.check_keyword(Keyword::When) {
                    self.advance();
                    self.skip_condition(Keyword::Then);
                    self.expect_keyword(Keyword::Then);
                    self.parse_seq_of_statements();
                }
                if self.check_keyword(Keyword::Else) {
                    self.advance();
                    self.parse_seq_of_statements();
                }
                self.parse_end(Some(Keyword::Case));
            }
            _ => {
                // FOR ... LOOP, WHILE ... LOOP, LOOP
                if !self.check_keyword(Keyword::Loop) {
                    self.advance();
                    self.skip_condition(Keyword::Loop);
                }
                self.expect_keyword(Keyword::Loop);
                self.parse_seq_of_statements();
                self.parse_end(Some(Keyword::Loop));
            }
        }
        self.expect_semicolon();
        self.close();
    }

    /// `END [IF|LOOP|CASE] [label words]`, without the `;`.
    fn parse_end(&mut self, closer: Option<Keyword>) {
        if !self.expect_keyword(Keyword::End) {
            return;
        }
        if let Some(closer) = closer {
            self.expect_keyword(closer);
        }
        // Labels, unit names and timing points (END BEFORE EACH ROW).
        let line = self.last_line();
        for _ in 0..4 {
            let token = self.current();
            if token.line() == line && token.is_name() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Consumes an expression up to `stop` at nesting level zero.
    fn skip_condition(&mut self, stop: Keyword) {
        let mut parens = 0usize;
        let mut case_depth = 0usize;
        loop {
            let token = self.current();
            match &token.kind {
                TokenKind::Eof | TokenKind::BatchSlash | TokenKind::Semicolon => return,
                TokenKind::LeftParen => parens += 1,
                TokenKind::RightParen => parens = parens.saturating_sub(1),
                TokenKind::Keyword(kw) if *kw == stop && parens == 0 && case_depth == 0 => return,
                TokenKind::Keyword(Keyword::Case) => case_depth += 1,
                TokenKind::Keyword(Keyword::End) if case_depth > 0 => case_depth -= 1,
                TokenKind::Keyword(Keyword::End | Keyword::Begin) => return,
                _ => {}
            }
            self.advance();
        }
    }

    /// Consumes a simple statement or declaration including its `;`.
    fn skip_to_semicolon(&mut self) {
        let mut case_depth = 0usize;
        loop {
            let index = self.pos;
            let token = self.current();
            let ends_early = match &token.kind {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::Eof | TokenKind::BatchSlash => true,
                TokenKind::Keyword(Keyword::Case) => {
                    case_depth += 1;
                    false
                }
                TokenKind::Keyword(Keyword::End) if case_depth > 0 => {
                    case_depth -= 1;
                    false
                }
                TokenKind::Keyword(Keyword::End | Keyword::Begin | Keyword::Elsif) => true,
                TokenKind::Keyword(Keyword::Create) => self.starts_line(token),
                _ => false,
            };
            if ends_early {
                let message = format!("missing ';' at '{}'", self.display(token));
                self.report(index, &message);
                return;
            }
            self.advance();
        }
    }

    fn skip_labels(&mut self) {
        while matches!(self.current().kind, TokenKind::LabelStart) {
            self.advance();
            if self.current().is_name() {
                self.advance();
            }
            if matches!(self.current().kind, TokenKind::LabelEnd) {
                self.advance();
            } else {
                let message = format!("missing '>>' at '{}'", self.display(self.current()));
                self.report(self.pos, &message);
                return;
            }
        }
    }

    // ---------------------------------------------------------------------
    // Token navigation
    // ---------------------------------------------------------------------

    fn token_at(&self, index: usize) -> &'s Token {
        let tokens = self.stream.tokens();
        &tokens[index.min(tokens.len().saturating_sub(1))]
    }

    fn current(&self) -> &'s Token {
        self.token_at(self.pos)
    }

    /// Index of the `n`th significant token after the current one.
    fn peek_index(&self, n: usize) -> usize {
        let tokens = self.stream.tokens();
        let mut index = self.pos;
        let mut remaining = n;
        while remaining > 0 && index + 1 < tokens.len() {
            index += 1;
            if !matches!(tokens[index].kind, TokenKind::Error(_)) {
                remaining -= 1;
            }
        }
        index
    }

    fn peek_keyword(&self, n: usize) -> Option<Keyword> {
        self.token_at(self.peek_index(n)).as_keyword()
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(&self.current().kind, TokenKind::Keyword(kw) if *kw == keyword)
    }

    fn advance(&mut self) {
        if self.current().is_eof() {
            return;
        }
        self.last_consumed = Some(self.pos);
        self.pos += 1;
        self.skip_error_tokens();
    }

    /// Reports and skips tokens the lexer could not recognise.
    fn skip_error_tokens(&mut self) {
        while let TokenKind::Error(reason) = &self.current().kind {
            trace!(%reason, "lexer error token");
            let message = format!(
                "token recognition error at: '{}'",
                self.display(self.current())
            );
            self.report(self.pos, &message);
            self.pos += 1;
        }
    }

    /// Line of the most recently consumed token.
    fn last_line(&self) -> usize {
        self.last_consumed
            .map_or(0, |index| self.token_at(index).line())
    }

    /// Returns true if `token` is the first significant token on its line.
    fn starts_line(&self, token: &Token) -> bool {
        self.last_consumed.is_none() || self.last_line() < token.line()
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            let message = format!(
                "mismatched input '{}' expecting {}",
                self.display(self.current()),
                keyword.as_str()
            );
            self.report(self.pos, &message);
            false
        }
    }

    fn expect_semicolon(&mut self) -> bool {
        if matches!(self.current().kind, TokenKind::Semicolon) {
            self.advance();
            true
        } else {
            let message = format!("missing ';' at '{}'", self.display(self.current()));
            self.report(self.pos, &message);
            false
        }
    }

    // ---------------------------------------------------------------------
    // Tree building and errors
    // ---------------------------------------------------------------------

    fn open(&mut self, kind: RuleKind) {
        let parent = self.open_rules.last().map(|&(id, _)| id);
        let id = self.tree.open(kind, parent);
        self.open_rules.push((id, self.pos));
    }

    fn close(&mut self) {
        if let Some((id, first)) = self.open_rules.pop() {
            let range = self
                .last_consumed
                .filter(|&last| last >= first)
                .map(|last| (first, last));
            self.tree.close(id, range);
        }
    }

    /// Text of a token as shown in messages.
    fn display(&self, token: &Token) -> String {
        if token.is_eof() {
            return String::from("<EOF>");
        }
        self.stream
            .text(token)
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    fn report(&mut self, index: usize, message: &str) {
        if self.last_error == Some(index) {
            return;
        }
        self.last_error = Some(index);
        let token = self.token_at(index);
        let offending = if token.is_eof() {
            "<EOF>"
        } else {
            self.stream.text(token)
        };
        self.listener
            .syntax_error(token.line(), token.column(), message, Some(offending));
    }
}
