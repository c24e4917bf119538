//! Source excerpts for syntax error reports.

/// Renders the lines around `line` with a caret marker under `column`.
///
/// The window is `[line - radius, line + radius]` clamped to the document.
/// Each line is prefixed with its right-aligned number and ` | `. The marker
/// line follows the error line; when `column` falls outside the line the
/// caret sits at the start of the content.
///
/// Returns an empty string when `source` is empty or `line` is not a line
/// of `source`.
#[must_use]
pub fn render_context(source: &str, line: usize, column: usize, radius: usize) -> String {
    if source.is_empty() {
        return String::new();
    }
    let lines: Vec<&str> = source.split('\n').collect();
    if line == 0 || line > lines.len() {
        return String::new();
    }

    let first = line.saturating_sub(radius).max(1);
    let last = line.saturating_add(radius).min(lines.len());
    let width = digit_count(last);

    let mut out = String::new();
    for (index, content) in lines.iter().enumerate().take(last).skip(first - 1) {
        let number = index + 1;
        out.push_str(&format!("{number:>width$} | {content}\n"));
        if number == line {
            let indent = if column > 0 && column <= content.chars().count() {
                width + 3 + column - 1
            } else {
                width + 3
            };
            out.push_str(&" ".repeat(indent));
            out.push_str("^\n");
        }
    }
    out
}

const fn digit_count(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}
