//! Token types for the PL/SQL lexer.

use super::{Location, Span};

/// Keywords the parser dispatches on.
///
/// Oracle reserves very few of these, so the parser still accepts most of
/// them where a name is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Queries and DML
    Select,
    With,
    From,
    Where,
    Group,
    Order,
    Having,
    Union,
    Minus,
    Intersect,
    Connect,
    Start,
    Join,
    On,
    Into,
    Values,
    Set,
    Insert,
    Update,
    Delete,
    Merge,
    Lock,
    Explain,
    Call,

    // DDL
    Create,
    Alter,
    Drop,
    Truncate,
    Grant,
    Revoke,
    Comment,
    Rename,
    Analyze,
    Audit,
    Noaudit,
    Flashback,
    Purge,
    Or,
    Replace,
    Editionable,
    Noneditionable,
    Procedure,
    Function,
    Package,
    Body,
    Trigger,
    Type,
    Table,

    // Transaction control
    Commit,
    Rollback,
    Savepoint,
    Transaction,

    // PL/SQL structure
    Begin,
    Declare,
    End,
    Exception,
    When,
    Then,
    Else,
    Elsif,
    If,
    Loop,
    For,
    While,
    Case,
    Is,
    As,
    Language,
    External,
    Compound,
    Before,
    After,
    Instead,
    Member,
    Static,
    Map,
    Constructor,
    Overriding,
    Final,
    Instantiable,
    Not,

    // SQL*Plus commands
    Exec,
    Execute,
    Show,
    Desc,
    Describe,
    Prompt,
    Spool,
    Whenever,
}

impl Keyword {
    /// Attempts to parse a keyword from a string (case-insensitive).
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SELECT" => Some(Self::Select),
            "WITH" => Some(Self::With),
            "FROM" => Some(Self::From),
            "WHERE" => Some(Self::Where),
            "GROUP" => Some(Self::Group),
            "ORDER" => Some(Self::Order),
            "HAVING" => Some(Self::Having),
            "UNION" => Some(Self::Union),
            "MINUS" => Some(Self::Minus),
            "INTERSECT" => Some(Self::Intersect),
            "CONNECT" => Some(Self::Connect),
            "START" => Some(Self::Start),
            "JOIN" => Some(Self::Join),
            "ON" => Some(Self::On),
            "INTO" => Some(Self::Into),
            "VALUES" => Some(Self::Values),
            "SET" => Some(Self::Set),
            "INSERT" => Some(Self::Insert),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            "MERGE" => Some(Self::Merge),
            "LOCK" => Some(Self::Lock),
            "EXPLAIN" => Some(Self::Explain),
            "CALL" => Some(Self::Call),
            "CREATE" => Some(Self::Create),
            "ALTER" => Some(Self::Alter),
            "DROP" => Some(Self::Drop),
            "TRUNCATE" => Some(Self::Truncate),
            "GRANT" => Some(Self::Grant),
            "REVOKE" => Some(Self::Revoke),
            "COMMENT" => Some(Self::Comment),
            "RENAME" => Some(Self::Rename),
            "ANALYZE" => Some(Self::Analyze),
            "AUDIT" => Some(Self::Audit),
            "NOAUDIT" => Some(Self::Noaudit),
            "FLASHBACK" => Some(Self::Flashback),
            "PURGE" => Some(Self::Purge),
            "OR" => Some(Self::Or),
            "REPLACE" => Some(Self::Replace),
            "EDITIONABLE" => Some(Self::Editionable),
            "NONEDITIONABLE" => Some(Self::Noneditionable),
            "PROCEDURE" => Some(Self::Procedure),
            "FUNCTION" => Some(Self::Function),
            "PACKAGE" => Some(Self::Package),
            "BODY" => Some(Self::Body),
            "TRIGGER" => Some(Self::Trigger),
            "TYPE" => Some(Self::Type),
            "TABLE" => Some(Self::Table),
            "COMMIT" => Some(Self::Commit),
            "ROLLBACK" => Some(Self::Rollback),
            "SAVEPOINT" => Some(Self::Savepoint),
            "TRANSACTION" => Some(Self::Transaction),
            "BEGIN" => Some(Self::Begin),
            "DECLARE" => Some(Self::Declare),
            "END" => Some(Self::End),
            "EXCEPTION" => Some(Self::Exception),
            "WHEN" => Some(Self::When),
            "THEN" => Some(Self::Then),
            "ELSE" => Some(Self::Else),
            "ELSIF" => Some(Self::Elsif),
            "IF" => Some(Self::If),
            "LOOP" => Some(Self::Loop),
            "FOR" => Some(Self::For),
            "WHILE" => Some(Self::While),
            "CASE" => Some(Self::Case),
            "IS" => Some(Self::Is),
            "AS" => Some(Self::As),
            "LANGUAGE" => Some(Self::Language),
            "EXTERNAL" => Some(Self::External),
            "COMPOUND" => Some(Self::Compound),
            "BEFORE" => Some(Self::Before),
            "AFTER" => Some(Self::After),
            "INSTEAD" => Some(Self::Instead),
            "MEMBER" => Some(Self::Member),
            "STATIC" => Some(Self::Static),
            "MAP" => Some(Self::Map),
            "CONSTRUCTOR" => Some(Self::Constructor),
            "OVERRIDING" => Some(Self::Overriding),
            "FINAL" => Some(Self::Final),
            "INSTANTIABLE" => Some(Self::Instantiable),
            "NOT" => Some(Self::Not),
            "EXEC" => Some(Self::Exec),
            "EXECUTE" => Some(Self::Execute),
            "SHOW" => Some(Self::Show),
            "DESC" => Some(Self::Desc),
            "DESCRIBE" => Some(Self::Describe),
            "PROMPT" => Some(Self::Prompt),
            "SPOOL" => Some(Self::Spool),
            "WHENEVER" => Some(Self::Whenever),
            _ => None,
        }
    }

    /// Returns the keyword as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::With => "WITH",
            Self::From => "FROM",
            Self::Where => "WHERE",
            Self::Group => "GROUP",
            Self::Order => "ORDER",
            Self::Having => "HAVING",
            Self::Union => "UNION",
            Self::Minus => "MINUS",
            Self::Intersect => "INTERSECT",
            Self::Connect => "CONNECT",
            Self::Start => "START",
            Self::Join => "JOIN",
            Self::On => "ON",
            Self::Into => "INTO",
            Self::Values => "VALUES",
            Self::Set => "SET",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Merge => "MERGE",
            Self::Lock => "LOCK",
            Self::Explain => "EXPLAIN",
            Self::Call => "CALL",
            Self::Create => "CREATE",
            Self::Alter => "ALTER",
            Self::Drop => "DROP",
            Self::Truncate => "TRUNCATE",
            Self::Grant => "GRANT",
            Self::Revoke => "REVOKE",
            Self::Comment => "COMMENT",
            Self::Rename => "RENAME",
            Self::Analyze => "ANALYZE",
            Self::Audit => "AUDIT",
            Self::Noaudit => "NOAUDIT",
            Self::Flashback => "FLASHBACK",
            Self::Purge => "PURGE",
            Self::Or => "OR",
            Self::Replace => "REPLACE",
            Self::Editionable => "EDITIONABLE",
            Self::Noneditionable => "NONEDITIONABLE",
            Self::Procedure => "PROCEDURE",
            Self::Function => "FUNCTION",
            Self::Package => "PACKAGE",
            Self::Body => "BODY",
            Self::Trigger => "TRIGGER",
            Self::Type => "TYPE",
            Self::Table => "TABLE",
            Self::Commit => "COMMIT",
            Self::Rollback => "ROLLBACK",
            Self::Savepoint => "SAVEPOINT",
            Self::Transaction => "TRANSACTION",
            Self::Begin => "BEGIN",
            Self::Declare => "DECLARE",
            Self::End => "END",
            Self::Exception => "EXCEPTION",
            Self::When => "WHEN",
            Self::Then => "THEN",
            Self::Else => "ELSE",
            Self::Elsif => "ELSIF",
            Self::If => "IF",
            Self::Loop => "LOOP",
            Self::For => "FOR",
            Self::While => "WHILE",
            Self::Case => "CASE",
            Self::Is => "IS",
            Self::As => "AS",
            Self::Language => "LANGUAGE",
            Self::External => "EXTERNAL",
            Self::Compound => "COMPOUND",
            Self::Before => "BEFORE",
            Self::After => "AFTER",
            Self::Instead => "INSTEAD",
            Self::Member => "MEMBER",
            Self::Static => "STATIC",
            Self::Map => "MAP",
            Self::Constructor => "CONSTRUCTOR",
            Self::Overriding => "OVERRIDING",
            Self::Final => "FINAL",
            Self::Instantiable => "INSTANTIABLE",
            Self::Not => "NOT",
            Self::Exec => "EXEC",
            Self::Execute => "EXECUTE",
            Self::Show => "SHOW",
            Self::Desc => "DESC",
            Self::Describe => "DESCRIBE",
            Self::Prompt => "PROMPT",
            Self::Spool => "SPOOL",
            Self::Whenever => "WHENEVER",
        }
    }

    /// Returns true for clause keywords that can never name a table.
    #[must_use]
    pub const fn is_clause_keyword(&self) -> bool {
        matches!(
            self,
            Self::Select
                | Self::From
                | Self::Where
                | Self::Group
                | Self::Order
                | Self::Having
                | Self::Union
                | Self::Minus
                | Self::Intersect
                | Self::Connect
                | Self::Start
                | Self::Join
                | Self::On
                | Self::Into
                | Self::Values
                | Self::Set
        )
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    /// Numeric literal (e.g., 42, 3.14, 1e10, 2.5f)
    Number,
    /// String literal (e.g., 'hello', N'text', q'[it's]')
    String,

    // Identifiers and keywords
    /// Identifier (e.g., employees, v_count$, dbms_output)
    Identifier,
    /// Quoted identifier (e.g., "Mixed Case")
    QuotedIdentifier,
    /// Bind or substitution variable (e.g., :id, :1, &name)
    BindVariable,
    /// Keyword the parser dispatches on
    Keyword(Keyword),

    // Operators
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// **
    Power,
    /// / inside a line
    Slash,
    /// / alone on its line, the SQL*Plus batch terminator
    BatchSlash,
    /// %
    Percent,
    /// =
    Eq,
    /// !=, <>, ^=, ~=
    NotEq,
    /// <
    Lt,
    /// <=
    LtEq,
    /// >
    Gt,
    /// >=
    GtEq,
    /// ||
    Concat,
    /// :=
    Assign,
    /// =>
    Arrow,
    /// <<
    LabelStart,
    /// >>
    LabelEnd,

    // Delimiters
    /// (
    LeftParen,
    /// )
    RightParen,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// .
    Dot,
    /// ..
    DoubleDot,
    /// :
    Colon,
    /// @
    At,

    // Special
    /// End of input
    Eof,
    /// Text the lexer could not recognize, with the reason
    Error(String),
}

/// A token with its location in the source code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The byte range in the source code.
    pub span: Span,
    /// Line and column of the first character.
    pub location: Location,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span, location: Location) -> Self {
        Self {
            kind,
            span,
            location,
        }
    }

    /// Returns the 1-based line of the token.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.location.line
    }

    /// Returns the 0-based column of the token.
    #[must_use]
    pub const fn column(&self) -> usize {
        self.location.column
    }

    /// Returns true if this is an EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Returns the keyword if this is a keyword token.
    #[must_use]
    pub const fn as_keyword(&self) -> Option<Keyword> {
        match &self.kind {
            TokenKind::Keyword(kw) => Some(*kw),
            _ => None,
        }
    }

    /// Returns true if this token can stand where a name is expected.
    ///
    /// Keywords count unless they are clause keywords.
    #[must_use]
    pub const fn is_name(&self) -> bool {
        match &self.kind {
            TokenKind::Identifier | TokenKind::QuotedIdentifier | TokenKind::BindVariable => true,
            TokenKind::Keyword(kw) => !kw.is_clause_keyword(),
            _ => false,
        }
    }
}
