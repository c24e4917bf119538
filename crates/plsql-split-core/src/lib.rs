//! # plsql-split-core
//!
//! Splits Oracle SQL and PL/SQL scripts into individual statements.
//!
//! This crate provides:
//! - A lexer for the SQL, PL/SQL and SQL*Plus dialect mix found in scripts
//! - A structural recursive descent parser with listener-based tree walking
//! - Boundary resolution that keeps PL/SQL bodies in one piece
//! - Statement type classification and syntax errors with source context
//!
//! ## Splitting a script
//!
//! ```rust
//! use plsql_split_core::{split_str, StatementType};
//!
//! let script = "\
//! CREATE OR REPLACE PROCEDURE greet IS
//! BEGIN
//!   DBMS_OUTPUT.PUT_LINE('hello');
//! END;
//! /
//! SELECT * FROM employees;
//! ";
//!
//! let statements = split_str(script).unwrap();
//! assert_eq!(statements.len(), 2);
//! assert_eq!(statements[0].statement_type, StatementType::CreateProcedure);
//! assert_eq!(statements[1].content, "SELECT * FROM employees");
//! assert_eq!((statements[1].start_line, statements[1].start_column), (6, 0));
//! ```
//!
//! ## Syntax errors
//!
//! Errors carry their position and a rendered excerpt of the script:
//!
//! ```rust
//! use plsql_split_core::{split_str, SplitError};
//!
//! let Err(SplitError::Syntax(report)) = split_str("SELECT * FROM;") else {
//!     panic!("expected a syntax error");
//! };
//! assert_eq!((report.line, report.column), (1, 13));
//! assert!(report.context.contains('^'));
//! ```
//!
//! [`parse_script`] returns statements and errors together when partial
//! results are wanted.

pub mod error;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod script;
pub mod splitter;
pub mod statement;

pub use error::{Result, SplitError};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{ParseOptions, Parser, SyntaxError};
pub use resolver::StatementSpan;
pub use script::{parse_script, parse_script_with, ParseOutcome, ScriptOptions};
pub use splitter::{split_file, split_reader, split_str, Splitter, Statement, SyntaxErrorReport};
pub use statement::StatementType;
