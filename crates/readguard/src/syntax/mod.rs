//! Full-fidelity persistent syntax trees, on top of rowan.
//!
//! Trees are split in two layers:
//!
//! - **Green** (`GreenNode`, `GreenToken`): immutable, shared storage with no
//!   absolute positions. Every byte of source, whitespace included, lives in
//!   some token, so printing a tree reproduces its source exactly.
//! - **Red** (`SyntaxNode`, `SyntaxToken`): cursors that add parent links and
//!   absolute offsets on top of green nodes.
//!
//! Red cursors are not `Send`; a `SyntaxTree` keeps only the green root and
//! builds cursors on demand, so trees themselves move freely between threads.
//!
//! Rewrites never mutate: `SyntaxTree::replace` builds a new root that copies
//! only the path to the replaced node and shares everything else.

mod kind;
mod line_index;

pub use kind::{CSharp, SyntaxKind};
pub use line_index::LineIndex;
pub use rowan::{GreenNode, GreenToken, NodeOrToken, TextRange, TextSize};

use std::sync::Arc;

use crate::types::Span;

/// A node in a C# syntax tree.
pub type SyntaxNode = rowan::SyntaxNode<CSharp>;
/// A token in a C# syntax tree.
pub type SyntaxToken = rowan::SyntaxToken<CSharp>;

/// Field-aware lookups on nodes.
pub trait SyntaxNodeExt {
    /// Grammar field this node fills in its parent, if any.
    fn field(&self) -> Option<&'static str>;

    /// First child node filling the given grammar field.
    fn child_by_field(&self, field: &str) -> Option<SyntaxNode>;

    /// Whether a direct child token has exactly this text.
    fn has_token(&self, text: &str) -> bool;
}

impl SyntaxNodeExt for SyntaxNode {
    fn field(&self) -> Option<&'static str> {
        self.kind().field()
    }

    fn child_by_field(&self, field: &str) -> Option<SyntaxNode> {
        self.children().find(|child| child.field() == Some(field))
    }

    fn has_token(&self, text: &str) -> bool {
        self.children_with_tokens()
            .any(|element| element.as_token().is_some_and(|token| token.text() == text))
    }
}

/// An immutable syntax tree plus the line index of its text.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    green: Arc<GreenNode>,
    line_index: Arc<LineIndex>,
}

impl SyntaxTree {
    /// Wrap a green root.
    #[must_use]
    pub fn new(green: GreenNode) -> Self {
        let text = SyntaxNode::new_root(green.clone()).text().to_string();
        Self {
            green: Arc::new(green),
            line_index: Arc::new(LineIndex::new(&text)),
        }
    }

    /// Red cursor for the root node.
    #[must_use]
    pub fn root(&self) -> SyntaxNode {
        SyntaxNode::new_root(GreenNode::clone(&self.green))
    }

    /// The green root, for identity checks and sharing.
    #[must_use]
    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    /// Full text of the tree.
    #[must_use]
    pub fn text(&self) -> String {
        self.root().text().to_string()
    }

    /// Length of the tree's text in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.green.text_len())
    }

    /// Whether the tree has no text at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Line/column span of a byte range in this tree.
    #[must_use]
    pub fn span(&self, range: TextRange) -> Span {
        self.line_index.span(range)
    }

    /// Every node of the given kind, in source order.
    pub fn nodes_of_kind(&self, kind: &'static str) -> impl Iterator<Item = SyntaxNode> + use<> {
        self.root()
            .descendants()
            .filter(move |node| node.kind().name() == kind)
    }

    /// A new tree with `node` replaced by `replacement`.
    ///
    /// `node` must come from this tree. The receiver is left untouched.
    #[must_use]
    pub fn replace(&self, node: &SyntaxNode, replacement: GreenNode) -> Self {
        Self::new(node.replace_with(replacement))
    }
}

impl Drop for SyntaxTree {
    /// Frees the green tree breadth-first. Freeing a green node frees its
    /// children recursively, which overflows the stack on deeply nested
    /// expressions.
    fn drop(&mut self) {
        let Some(green) = Arc::get_mut(&mut self.green) else {
            return;
        };
        let mut pending = vec![std::mem::replace(
            green,
            GreenNode::new(SyntaxKind::TRIVIA.into(), Vec::new()),
        )];
        while let Some(node) = pending.pop() {
            pending.extend(
                node.children()
                    .filter_map(NodeOrToken::into_node)
                    .map(ToOwned::to_owned),
            );
        }
    }
}
