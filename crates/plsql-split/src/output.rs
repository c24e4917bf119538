//! Rendering of split results as text or JSON.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use clap::ValueEnum;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::debug;

use plsql_split_core::Statement;

use crate::error::{OutputError, Result};

/// Statement text longer than this is shortened in text output.
const MAX_CONTENT_CHARS: usize = 100;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Human-readable listing.
    Text,
    /// JSON array of statements.
    Json,
}

impl Format {
    const fn label(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Json => "JSON",
        }
    }
}

/// What the text listing shows for each statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextOptions {
    /// Print the statement content.
    pub print_statements: bool,
    /// Print the statement type next to its number.
    pub print_types: bool,
}

/// Shortens `content` to at most 100 characters, ending in `...`.
#[must_use]
pub fn truncate_content(content: &str) -> Cow<'_, str> {
    if content.chars().count() <= MAX_CONTENT_CHARS {
        return Cow::Borrowed(content);
    }
    let mut short: String = content.chars().take(MAX_CONTENT_CHARS - 3).collect();
    short.push_str("...");
    Cow::Owned(short)
}

/// Renders the text listing.
#[must_use]
pub fn render_text(statements: &[Statement], options: TextOptions) -> String {
    let mut out = format!("Found {} statements:\n\n", statements.len());
    for (index, statement) in statements.iter().enumerate() {
        out.push_str(&format!("Statement {}", index + 1));
        if options.print_types {
            out.push_str(&format!(" ({})", statement.statement_type));
        }
        out.push_str(":\n");
        out.push_str(&format!(
            "  Position: {}:{} to {}:{}\n",
            statement.start_line, statement.start_column, statement.end_line, statement.end_column
        ));
        if options.print_statements {
            out.push_str(&format!("  Content: {}\n", truncate_content(&statement.content)));
        }
        out.push('\n');
    }
    out
}

/// Renders the statements as JSON, indented with `indent` when `pretty`.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(statements: &[Statement], pretty: bool, indent: &str) -> Result<String> {
    if !pretty {
        return Ok(serde_json::to_string(statements)?);
    }
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    statements.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Writes rendered output to `path`, or to stdout when there is none.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_output(rendered: &str, format: Format, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), bytes = rendered.len(), "writing output file");
            fs::write(path, rendered).map_err(|source| OutputError::Write {
                path: path.to_path_buf(),
                source,
            })?;
            println!("{} output written to {}", format.label(), path.display());
        }
        None => match format {
            Format::Text => print!("{rendered}"),
            Format::Json => println!("{rendered}"),
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plsql_split_core::StatementType;

    fn statement(content: &str, statement_type: StatementType) -> Statement {
        Statement {
            content: content.to_string(),
            start_line: 1,
            end_line: 1,
            start_column: 0,
            end_column: content.chars().count(),
            statement_type,
        }
    }

    #[test]
    fn test_truncate_content() {
        assert_eq!(truncate_content("short"), "short");
        let exact = "x".repeat(100);
        assert_eq!(truncate_content(&exact), exact.as_str());
        let long = "é".repeat(150);
        let short = truncate_content(&long);
        assert_eq!(short.chars().count(), 100);
        assert!(short.ends_with("..."));
    }

    #[test]
    fn test_render_text() {
        let statements = vec![statement("COMMIT", StatementType::Commit)];
        let options = TextOptions {
            print_statements: true,
            print_types: true,
        };
        assert_eq!(
            render_text(&statements, options),
            "Found 1 statements:\n\nStatement 1 (COMMIT):\n  Position: 1:0 to 1:6\n  Content: COMMIT\n\n"
        );
    }

    #[test]
    fn test_render_text_without_types_or_content() {
        let statements = vec![statement("COMMIT", StatementType::Commit)];
        let options = TextOptions {
            print_statements: false,
            print_types: false,
        };
        assert_eq!(
            render_text(&statements, options),
            "Found 1 statements:\n\nStatement 1:\n  Position: 1:0 to 1:6\n\n"
        );
    }

    #[test]
    fn test_render_json_compact() {
        let statements = vec![statement("COMMIT", StatementType::Commit)];
        assert_eq!(
            render_json(&statements, false, "  ").unwrap(),
            r#"[{"content":"COMMIT","startLine":1,"endLine":1,"startColumn":0,"endColumn":6,"type":"COMMIT"}]"#
        );
    }

    #[test]
    fn test_render_json_pretty_indent() {
        let statements = vec![statement("COMMIT", StatementType::Commit)];
        let json = render_json(&statements, true, "\t").unwrap();
        assert!(json.starts_with("[\n\t{\n\t\t\"content\": \"COMMIT\","));
        assert_eq!(render_json(&[], true, "  ").unwrap(), "[]");
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_output("hello\n", Format::Text, Some(&path)).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_write_output_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");
        let err = write_output("[]", Format::Json, Some(&path)).unwrap_err();
        assert!(err.to_string().contains("out.json"));
    }
}
