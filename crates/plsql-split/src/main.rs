//! plsql-split CLI
//!
//! Command-line tool that splits Oracle SQL and PL/SQL scripts into
//! statements.

mod error;
mod output;

use std::path::PathBuf;

use anyhow::bail;
use clap::{ArgAction, Parser};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use plsql_split_core::{SplitError, Splitter};

use crate::output::{render_json, render_text, write_output, Format, TextOptions};

/// Script split when no file is given.
const DEMO_SCRIPT: &str = "
-- Simple SQL statements
SELECT * FROM employees;
INSERT INTO employees (id, name) VALUES (1, 'John');

-- PL/SQL block
BEGIN
    FOR emp IN (SELECT * FROM employees) LOOP
        DBMS_OUTPUT.PUT_LINE('Employee: ' || emp.name);
    END LOOP;
END;
/

-- Another SQL statement
UPDATE employees SET salary = salary * 1.1;
";

/// Split Oracle SQL and PL/SQL scripts into individual statements.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Parser)]
#[command(name = "plsql-split")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Script to split. A demo script is split when omitted.
    file: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, env = "PLSQL_SPLIT_FORMAT", default_value = "text")]
    format: Format,

    /// Don't include position information.
    #[arg(long)]
    no_position: bool,

    /// Report several errors at once instead of the first one.
    #[arg(long)]
    verbose_errors: bool,

    /// Maximum number of errors to report.
    #[arg(long, default_value_t = 5)]
    max_errors: usize,

    /// Report every error, ignoring --max-errors.
    #[arg(long)]
    all_errors: bool,

    /// Include source context lines with errors.
    #[arg(long)]
    error_context: bool,

    /// Number of context lines shown before and after an error.
    #[arg(long, env = "PLSQL_SPLIT_CONTEXT_LINES", default_value_t = 3)]
    context_lines: usize,

    /// Include the offending statement line with errors.
    #[arg(long)]
    error_statement: bool,

    /// Write the output to a file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print statement contents in text output.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    print_statements: bool,

    /// Print statement types in text output.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    print_types: bool,

    /// Pretty print JSON output.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pretty: bool,

    /// Indentation for pretty JSON output.
    #[arg(long, default_value = "  ")]
    indent: String,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn splitter(&self) -> Splitter {
        let max_errors = if self.all_errors {
            0
        } else if self.max_errors > 0 {
            self.max_errors
        } else {
            1
        };
        Splitter::new()
            .with_position_info(!self.no_position)
            .with_verbose_errors(self.verbose_errors)
            .with_max_errors(max_errors)
            .with_error_context(self.error_context)
            .with_error_context_lines(self.context_lines)
            .with_error_statement(self.error_statement)
    }

    fn text_options(&self) -> TextOptions {
        TextOptions {
            print_statements: self.print_statements,
            print_types: self.print_types,
        }
    }

    /// Formats a split failure the way it is shown to the user.
    fn describe_error(&self, err: &SplitError) -> String {
        match err.as_syntax() {
            Some(report) if self.verbose_errors || self.error_context => {
                format!("Syntax error:\n{report}")
            }
            Some(report) => format!(
                "Syntax error at line {}, column {}: {}",
                report.line, report.column, report.message
            ),
            None => format!("Error splitting file: {err}"),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let splitter = cli.splitter();
    debug!(?splitter, "splitter configured");

    let result = match &cli.file {
        Some(path) => {
            if !path.exists() {
                bail!("File not found: {}", path.display());
            }
            info!("Splitting SQL statements from file: {}", path.display());
            splitter.split_file(path)
        }
        None => {
            info!("No file given, splitting the demo script");
            splitter.split_str(DEMO_SCRIPT)
        }
    };
    let statements = match result {
        Ok(statements) => statements,
        Err(err) => bail!(cli.describe_error(&err)),
    };

    let rendered = match cli.format {
        Format::Json => render_json(&statements, cli.pretty, &cli.indent)?,
        Format::Text => render_text(&statements, cli.text_options()),
    };
    write_output(&rendered, cli.format, cli.output.as_deref())?;

    Ok(())
}
