//! Merging of statement spans reported more than once.

use std::collections::HashMap;

use tracing::debug;

use super::StatementSpan;
use crate::statement::StatementType;

/// Collapses spans with the same position and sorts them by start position.
///
/// The first span seen for a position wins, except that an `Unknown` span
/// gives way to a later typed one. Applying this twice changes nothing.
#[must_use]
pub fn deduplicate(spans: Vec<StatementSpan>) -> Vec<StatementSpan> {
    let total = spans.len();
    let mut index: HashMap<(usize, usize, usize, usize), usize> = HashMap::with_capacity(total);
    let mut unique: Vec<StatementSpan> = Vec::with_capacity(total);

    for span in spans {
        match index.get(&span.key()) {
            Some(&slot) => {
                if unique[slot].statement_type == StatementType::Unknown
                    && span.statement_type != StatementType::Unknown
                {
                    unique[slot] = span;
                }
            }
            None => {
                index.insert(span.key(), unique.len());
                unique.push(span);
            }
        }
    }

    unique.sort_by_key(|span| (span.start_line, span.start_column));
    debug!(total, unique = unique.len(), "deduplicated statements");
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(key: (usize, usize, usize, usize), statement_type: StatementType) -> StatementSpan {
        StatementSpan {
            content: format!("{key:?}"),
            start_line: key.0,
            start_column: key.1,
            end_line: key.2,
            end_column: key.3,
            statement_type,
        }
    }

    #[test]
    fn test_empty() {
        assert!(deduplicate(Vec::new()).is_empty());
    }

    #[test]
    fn test_typed_span_replaces_unknown() {
        let spans = vec![
            span((1, 0, 3, 4), StatementType::Unknown),
            span((1, 0, 3, 4), StatementType::PlsqlBlock),
        ];
        let result = deduplicate(spans);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].statement_type, StatementType::PlsqlBlock);
    }

    #[test]
    fn test_first_typed_span_wins() {
        let spans = vec![
            span((1, 0, 1, 6), StatementType::Commit),
            span((1, 0, 1, 6), StatementType::Unknown),
            span((1, 0, 1, 6), StatementType::Transaction),
        ];
        let result = deduplicate(spans);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].statement_type, StatementType::Commit);
    }

    #[test]
    fn test_sorted_by_start() {
        let spans = vec![
            span((3, 0, 3, 7), StatementType::Unknown),
            span((1, 4, 1, 9), StatementType::Unknown),
            span((1, 0, 1, 3), StatementType::Unknown),
        ];
        let starts: Vec<(usize, usize)> = deduplicate(spans)
            .iter()
            .map(|s| (s.start_line, s.start_column))
            .collect();
        assert_eq!(starts, vec![(1, 0), (1, 4), (3, 0)]);
    }

    #[test]
    fn test_same_start_different_end_are_distinct() {
        let spans = vec![
            span((1, 0, 1, 10), StatementType::Unknown),
            span((1, 0, 2, 3), StatementType::Unknown),
        ];
        assert_eq!(deduplicate(spans).len(), 2);
    }

    #[test]
    fn test_idempotent() {
        let spans = vec![
            span((2, 0, 2, 5), StatementType::Unknown),
            span((1, 0, 1, 5), StatementType::Select),
            span((2, 0, 2, 5), StatementType::Delete),
        ];
        let once = deduplicate(spans);
        let twice = deduplicate(once.clone());
        assert_eq!(once, twice);
    }
}
