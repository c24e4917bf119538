//! Statement type tags and the text classifier that assigns them.

use core::convert::Infallible;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Canonical statement type tag.
///
/// Serialized as its tag string (e.g. `"CREATE_PACKAGE_BODY"`). Parsing is
/// case-insensitive and maps unknown strings to [`StatementType::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatementType {
    #[default]
    Unknown,
    Select,
    Insert,
    Update,
    Delete,
    Merge,
    CreateTable,
    CreateView,
    CreateIndex,
    CreateSequence,
    CreateProcedure,
    CreateFunction,
    CreatePackage,
    CreatePackageBody,
    CreateTrigger,
    CreateType,
    CreateTypeBody,
    CreateMaterializedView,
    CreateSynonym,
    CreateDatabaseLink,
    Create,
    AlterTable,
    AlterIndex,
    AlterProcedure,
    AlterFunction,
    AlterPackage,
    AlterTrigger,
    AlterSequence,
    Alter,
    DropTable,
    DropIndex,
    DropProcedure,
    DropFunction,
    DropPackage,
    DropTrigger,
    DropSequence,
    DropView,
    Drop,
    Truncate,
    Grant,
    Revoke,
    Commit,
    Rollback,
    Savepoint,
    Transaction,
    PlsqlBlock,
    Slash,
    ExplainPlan,
    Comment,
    SetTransaction,
    LockTable,
    Execute,
    Show,
    Describe,
}

/// Object keywords after `CREATE`, most specific first.
const CREATE_OBJECTS: &[(&str, StatementType)] = &[
    ("PACKAGE BODY", StatementType::CreatePackageBody),
    ("PACKAGE", StatementType::CreatePackage),
    ("PROCEDURE", StatementType::CreateProcedure),
    ("FUNCTION", StatementType::CreateFunction),
    ("TRIGGER", StatementType::CreateTrigger),
    ("TABLE", StatementType::CreateTable),
    ("VIEW", StatementType::CreateView),
    ("INDEX", StatementType::CreateIndex),
    ("SEQUENCE", StatementType::CreateSequence),
    ("TYPE BODY", StatementType::CreateTypeBody),
    ("TYPE", StatementType::CreateType),
    ("MATERIALIZED VIEW", StatementType::CreateMaterializedView),
    ("SYNONYM", StatementType::CreateSynonym),
    ("DATABASE LINK", StatementType::CreateDatabaseLink),
];

const ALTER_OBJECTS: &[(&str, StatementType)] = &[
    ("TABLE", StatementType::AlterTable),
    ("INDEX", StatementType::AlterIndex),
    ("PROCEDURE", StatementType::AlterProcedure),
    ("FUNCTION", StatementType::AlterFunction),
    ("PACKAGE", StatementType::AlterPackage),
    ("TRIGGER", StatementType::AlterTrigger),
    ("SEQUENCE", StatementType::AlterSequence),
];

const DROP_OBJECTS: &[(&str, StatementType)] = &[
    ("TABLE", StatementType::DropTable),
    ("INDEX", StatementType::DropIndex),
    ("PROCEDURE", StatementType::DropProcedure),
    ("FUNCTION", StatementType::DropFunction),
    ("PACKAGE", StatementType::DropPackage),
    ("TRIGGER", StatementType::DropTrigger),
    ("SEQUENCE", StatementType::DropSequence),
    ("VIEW", StatementType::DropView),
];

/// Leading keywords checked after CREATE, ALTER and DROP, in order.
const PREFIXES: &[(&str, StatementType)] = &[
    ("SELECT", StatementType::Select),
    ("INSERT", StatementType::Insert),
    ("UPDATE", StatementType::Update),
    ("DELETE", StatementType::Delete),
    ("MERGE", StatementType::Merge),
    ("TRUNCATE", StatementType::Truncate),
    ("GRANT", StatementType::Grant),
    ("REVOKE", StatementType::Revoke),
    ("COMMIT", StatementType::Commit),
    ("ROLLBACK", StatementType::Rollback),
    ("SAVEPOINT", StatementType::Savepoint),
    ("BEGIN", StatementType::PlsqlBlock),
    ("DECLARE", StatementType::PlsqlBlock),
    ("EXPLAIN PLAN", StatementType::ExplainPlan),
    ("COMMENT ON", StatementType::Comment),
    ("SET TRANSACTION", StatementType::SetTransaction),
    ("LOCK TABLE", StatementType::LockTable),
    ("EXEC", StatementType::Execute),
    ("SHOW", StatementType::Show),
    ("DESC", StatementType::Describe),
];

impl StatementType {
    /// Every tag, in declaration order.
    pub const ALL: [Self; 54] = [
        Self::Unknown,
        Self::Select,
        Self::Insert,
        Self::Update,
        Self::Delete,
        Self::Merge,
        Self::CreateTable,
        Self::CreateView,
        Self::CreateIndex,
        Self::CreateSequence,
        Self::CreateProcedure,
        Self::CreateFunction,
        Self::CreatePackage,
        Self::CreatePackageBody,
        Self::CreateTrigger,
        Self::CreateType,
        Self::CreateTypeBody,
        Self::CreateMaterializedView,
        Self::CreateSynonym,
        Self::CreateDatabaseLink,
        Self::Create,
        Self::AlterTable,
        Self::AlterIndex,
        Self::AlterProcedure,
        Self::AlterFunction,
        Self::AlterPackage,
        Self::AlterTrigger,
        Self::AlterSequence,
        Self::Alter,
        Self::DropTable,
        Self::DropIndex,
        Self::DropProcedure,
        Self::DropFunction,
        Self::DropPackage,
        Self::DropTrigger,
        Self::DropSequence,
        Self::DropView,
        Self::Drop,
        Self::Truncate,
        Self::Grant,
        Self::Revoke,
        Self::Commit,
        Self::Rollback,
        Self::Savepoint,
        Self::Transaction,
        Self::PlsqlBlock,
        Self::Slash,
        Self::ExplainPlan,
        Self::Comment,
        Self::SetTransaction,
        Self::LockTable,
        Self::Execute,
        Self::Show,
        Self::Describe,
    ];

    /// Returns the tag string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Merge => "MERGE",
            Self::CreateTable => "CREATE_TABLE",
            Self::CreateView => "CREATE_VIEW",
            Self::CreateIndex => "CREATE_INDEX",
            Self::CreateSequence => "CREATE_SEQUENCE",
            Self::CreateProcedure => "CREATE_PROCEDURE",
            Self::CreateFunction => "CREATE_FUNCTION",
            Self::CreatePackage => "CREATE_PACKAGE",
            Self::CreatePackageBody => "CREATE_PACKAGE_BODY",
            Self::CreateTrigger => "CREATE_TRIGGER",
            Self::CreateType => "CREATE_TYPE",
            Self::CreateTypeBody => "CREATE_TYPE_BODY",
            Self::CreateMaterializedView => "CREATE_MATERIALIZED_VIEW",
            Self::CreateSynonym => "CREATE_SYNONYM",
            Self::CreateDatabaseLink => "CREATE_DATABASE_LINK",
            Self::Create => "CREATE",
            Self::AlterTable => "ALTER_TABLE",
            Self::AlterIndex => "ALTER_INDEX",
            Self::AlterProcedure => "ALTER_PROCEDURE",
            Self::AlterFunction => "ALTER_FUNCTION",
            Self::AlterPackage => "ALTER_PACKAGE",
            Self::AlterTrigger => "ALTER_TRIGGER",
            Self::AlterSequence => "ALTER_SEQUENCE",
            Self::Alter => "ALTER",
            Self::DropTable => "DROP_TABLE",
            Self::DropIndex => "DROP_INDEX",
            Self::DropProcedure => "DROP_PROCEDURE",
            Self::DropFunction => "DROP_FUNCTION",
            Self::DropPackage => "DROP_PACKAGE",
            Self::DropTrigger => "DROP_TRIGGER",
            Self::DropSequence => "DROP_SEQUENCE",
            Self::DropView => "DROP_VIEW",
            Self::Drop => "DROP",
            Self::Truncate => "TRUNCATE",
            Self::Grant => "GRANT",
            Self::Revoke => "REVOKE",
            Self::Commit => "COMMIT",
            Self::Rollback => "ROLLBACK",
            Self::Savepoint => "SAVEPOINT",
            Self::Transaction => "TRANSACTION",
            Self::PlsqlBlock => "PLSQL_BLOCK",
            Self::Slash => "SLASH",
            Self::ExplainPlan => "EXPLAIN_PLAN",
            Self::Comment => "COMMENT",
            Self::SetTransaction => "SET_TRANSACTION",
            Self::LockTable => "LOCK_TABLE",
            Self::Execute => "EXECUTE",
            Self::Show => "SHOW",
            Self::Describe => "DESCRIBE",
        }
    }

    /// Parses a tag string, ignoring case. Unknown strings give `Unknown`.
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(tag))
            .unwrap_or_default()
    }

    /// Classifies a statement from its text.
    ///
    /// The text is trimmed and upper-cased, then matched by leading keyword.
    /// `CREATE`, `ALTER` and `DROP` look for an object keyword anywhere in
    /// the text. Never fails; unrecognised text is `Unknown`.
    #[must_use]
    pub fn classify(text: &str) -> Self {
        let text = text.trim().to_uppercase();

        let compound = [
            ("CREATE", CREATE_OBJECTS, Self::Create),
            ("ALTER", ALTER_OBJECTS, Self::Alter),
            ("DROP", DROP_OBJECTS, Self::Drop),
        ];
        for (verb, objects, fallback) in compound {
            if text.starts_with(verb) {
                return objects
                    .iter()
                    .find(|(object, _)| text.contains(object))
                    .map_or(fallback, |&(_, ty)| ty);
            }
        }

        if text == "/" {
            return Self::Slash;
        }

        PREFIXES
            .iter()
            .find(|(prefix, _)| text.starts_with(prefix))
            .map_or(Self::Unknown, |&(_, ty)| ty)
    }

    /// Returns true for queries.
    #[must_use]
    pub const fn is_query(&self) -> bool {
        matches!(self, Self::Select)
    }

    /// Returns true for data manipulation, queries included.
    #[must_use]
    pub const fn is_dml(&self) -> bool {
        matches!(
            self,
            Self::Select | Self::Insert | Self::Update | Self::Delete | Self::Merge
        )
    }

    /// Returns true for data definition, grants and revokes included.
    #[must_use]
    pub fn is_ddl(&self) -> bool {
        let tag = self.as_str();
        tag.starts_with("CREATE")
            || tag.starts_with("ALTER")
            || tag.starts_with("DROP")
            || matches!(self, Self::Truncate | Self::Grant | Self::Revoke)
    }

    /// Returns true for transaction control.
    #[must_use]
    pub const fn is_transactional(&self) -> bool {
        matches!(
            self,
            Self::Commit
                | Self::Rollback
                | Self::Savepoint
                | Self::Transaction
                | Self::SetTransaction
        )
    }

    /// Returns true for anonymous blocks and stored PL/SQL units.
    #[must_use]
    pub const fn is_plsql(&self) -> bool {
        matches!(
            self,
            Self::PlsqlBlock
                | Self::CreateProcedure
                | Self::CreateFunction
                | Self::CreatePackage
                | Self::CreatePackageBody
                | Self::CreateTrigger
                | Self::CreateType
                | Self::CreateTypeBody
        )
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for StatementType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StatementType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::parse(&tag))
    }
}
