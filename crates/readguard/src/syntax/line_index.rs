//! Offset to line/column conversion.

// Line and column numbers are stored as u32 for compactness.
// This is safe for practical source files (no file has 4 billion lines).
#![allow(clippy::cast_possible_truncation)]

use rowan::TextRange;

use crate::types::Span;

/// Start offsets of every line in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Index the line starts of `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { line_starts }
    }

    /// 1-indexed line and byte column of `offset`.
    #[must_use]
    pub fn line_col(&self, offset: usize) -> (u32, u32) {
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let column = offset - self.line_starts[line];
        (line as u32 + 1, column as u32 + 1)
    }

    /// Convert a byte range into a `Span`.
    #[must_use]
    pub fn span(&self, range: TextRange) -> Span {
        let (start_line, start_col) = self.line_col(usize::from(range.start()));
        let (end_line, end_col) = self.line_col(usize::from(range.end()));

        Span::new(start_line, start_col, end_line, end_col).unwrap_or_else(|| {
            tracing::warn!(
                start_line,
                start_col,
                end_line,
                end_col,
                "Range produced an inverted span, using fallback"
            );
            // Fallback: single-character span at start position
            Span::new(start_line, start_col, start_line, start_col + 1)
                .expect("fallback span is always valid")
        })
    }

    /// Number of lines in the text.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::first_byte(0, (1, 1))]
    #[case::end_of_first_line(3, (1, 4))]
    #[case::start_of_second_line(4, (2, 1))]
    #[case::inside_third_line(10, (3, 2))]
    fn line_col_is_one_indexed(#[case] offset: usize, #[case] expected: (u32, u32)) {
        let index = LineIndex::new("abc\ndefg\nhij");
        assert_eq!(index.line_col(offset), expected);
    }

    #[test]
    fn span_covers_multiple_lines() {
        let index = LineIndex::new("abc\ndefg\nhij");
        let span = index.span(TextRange::new(1.into(), 6.into()));

        assert_eq!(span.start_line(), 1);
        assert_eq!(span.start_column(), 2);
        assert_eq!(span.end_line(), 2);
        assert_eq!(span.end_column(), 3);
    }

    #[test]
    fn empty_text_has_one_line() {
        let index = LineIndex::new("");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_col(0), (1, 1));
    }
}
