#![allow(dead_code)]

use plsql_split_core::{
    parse_script, split_str, ParseOutcome, SplitError, Statement, StatementType,
    SyntaxErrorReport,
};

pub fn split(sql: &str) -> Vec<Statement> {
    split_str(sql).unwrap_or_else(|e| panic!("Failed to split: {sql}\nError: {e}"))
}

pub fn split_err(sql: &str) -> SyntaxErrorReport {
    match split_str(sql) {
        Err(SplitError::Syntax(report)) => report,
        other => panic!("Expected syntax error for: {sql}\nGot: {other:?}"),
    }
}

pub fn types(sql: &str) -> Vec<StatementType> {
    split(sql).iter().map(|s| s.statement_type).collect()
}

pub fn contents(sql: &str) -> Vec<String> {
    split(sql).into_iter().map(|s| s.content).collect()
}

/// Parses with every error kept and a one-line context radius.
pub fn outcome(sql: &str) -> ParseOutcome {
    parse_script(sql, 0, 1)
}

/// Checks that statements are sorted by start and do not overlap.
pub fn assert_ordered_and_disjoint(statements: &[Statement]) {
    for pair in statements.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            (a.end_line, a.end_column) <= (b.start_line, b.start_column),
            "statements overlap or are out of order:\n  {a:?}\n  {b:?}"
        );
    }
}
