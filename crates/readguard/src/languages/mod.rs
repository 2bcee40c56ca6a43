//! Language front ends.
//!
//! A front end turns source text into a readguard `SyntaxTree`. The rule and
//! the semantic model only ever see that tree, never tree-sitter types, so the
//! grammar can be swapped without touching analysis code.
//!
//! C# is the only language the rule applies to.

pub mod csharp;
mod tree_sitter_utils;

use std::path::Path;

/// Whether `path` has an extension handled by a front end.
#[must_use]
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            csharp::EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}
