//! Shared tree-sitter utilities for language front ends.
//!
//! Provides common functions for extracting text and diagnostics from
//! tree-sitter nodes while lowering them into readguard syntax trees.

use std::ops::Range;

/// Get the text covered by a byte range of the source.
///
/// Returns `None` if the range does not fall on UTF-8 boundaries.
pub fn byte_text(content: &[u8], range: Range<usize>) -> Option<&str> {
    let bytes = content.get(range.clone())?;
    match std::str::from_utf8(bytes) {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::trace!(
                byte_range = ?range,
                error = %e,
                "Failed to decode source range as UTF-8"
            );
            None
        }
    }
}

/// Count `ERROR` and missing nodes below `node`.
///
/// Tree-sitter recovers from syntax errors, so a non-zero count is worth a log
/// line but never stops analysis. Subtrees without errors are skipped.
pub fn error_count(node: &tree_sitter::Node) -> usize {
    let mut count = 0;
    let mut cursor = node.walk();
    'walk: loop {
        let current = cursor.node();
        if current.has_error() {
            count += usize::from(current.is_error() || current.is_missing());
            if cursor.goto_first_child() {
                continue;
            }
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }
    count
}
