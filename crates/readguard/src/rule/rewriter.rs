//! The "Capture return value" fix.
//!
//! Rewrites the statement holding a flagged call,
//!
//! ```text
//! ms.Read(buf, 0, 1);
//! ```
//!
//! into a declaration that keeps the byte count:
//!
//! ```text
//! var readCount = ms.Read(buf, 0, 1);
//! ```
//!
//! The call's green children are reused verbatim, so its arguments, comments
//! and spacing survive untouched. When the statement is the embedded body of a
//! construct such as an unbraced `if`, the declaration is wrapped in a block,
//! since C# does not allow a declaration there.

use tracing::debug;

use crate::error::FixError;
use crate::languages::csharp::node_kinds::{
    BLOCK, EXPRESSION_STATEMENT, GLOBAL_STATEMENT, IDENTIFIER, IMPLICIT_TYPE,
    INVOCATION_EXPRESSION, LOCAL_DECLARATION_STATEMENT, SWITCH_SECTION, VARIABLE_DECLARATION,
    VARIABLE_DECLARATOR,
};
use crate::syntax::{GreenNode, GreenToken, NodeOrToken, SyntaxKind, SyntaxNode, SyntaxTree};
use crate::types::{Finding, TextRange};

type GreenElement = NodeOrToken<GreenNode, GreenToken>;

/// Name of the local the fix introduces.
///
/// Not checked against names already in scope.
pub const BINDING_NAME: &str = "readCount";

/// A computed fix: which statement to replace, and with what.
#[derive(Debug, Clone)]
pub struct FixPlan {
    statement: SyntaxNode,
    replacement: GreenNode,
}

impl FixPlan {
    /// The statement being replaced.
    #[must_use]
    pub fn statement(&self) -> &SyntaxNode {
        &self.statement
    }

    /// Byte range of the statement being replaced.
    #[must_use]
    pub fn range(&self) -> TextRange {
        self.statement.text_range()
    }

    /// The replacement node.
    #[must_use]
    pub fn replacement(&self) -> &GreenNode {
        &self.replacement
    }

    /// Source text of the replacement.
    #[must_use]
    pub fn replacement_text(&self) -> String {
        SyntaxNode::new_root(self.replacement.clone())
            .text()
            .to_string()
    }

    /// Apply the plan to the tree it was computed against.
    #[must_use]
    pub fn apply(&self, tree: &SyntaxTree) -> SyntaxTree {
        tree.replace(&self.statement, self.replacement.clone())
    }
}

/// Compute the fix for `finding` without building a new tree.
pub fn plan_fix(finding: &Finding, tree: &SyntaxTree) -> Result<FixPlan, FixError> {
    let range = finding.range;
    let call = find_call(range, tree)?;

    let statement = match call.parent() {
        Some(parent) if parent.kind().name() == EXPRESSION_STATEMENT => parent,
        Some(parent) => {
            return Err(FixError::NotAStatement {
                range,
                parent: parent.kind().name(),
            });
        }
        None => {
            return Err(FixError::NotAStatement {
                range,
                parent: "none",
            });
        }
    };

    let declaration = declaration_for(&call, &statement);
    // Statements in a block fill no field; an embedded one hands its field to the block.
    let replacement = if is_embedded(&statement) {
        block_around(declaration, statement.kind())
    } else {
        declaration
    };

    Ok(FixPlan {
        statement,
        replacement,
    })
}

/// Produce a new tree in which the flagged call's result is captured.
///
/// The input tree is never modified.
pub fn apply_fix(finding: &Finding, tree: &SyntaxTree) -> Result<SyntaxTree, FixError> {
    let plan = plan_fix(finding, tree)?;
    debug!(range = ?plan.range(), "Captured discarded read result");
    Ok(plan.apply(tree))
}

/// Locate the invocation whose range is exactly `range`.
fn find_call(range: TextRange, tree: &SyntaxTree) -> Result<SyntaxNode, FixError> {
    let len = tree.len();
    let start = usize::from(range.start());
    let out_of_range = FixError::OffsetOutOfRange { offset: start, len };
    if start >= len || usize::from(range.end()) > len {
        return Err(out_of_range);
    }
    let token = tree
        .root()
        .token_at_offset(range.start())
        .right_biased()
        .ok_or(out_of_range)?;
    token
        .parent_ancestors()
        .find(|node| node.kind().name() == INVOCATION_EXPRESSION && node.text_range() == range)
        .ok_or(FixError::CallNotFound { range })
}

/// `var readCount = <call>` followed by whatever trailed the call (`;`, spacing).
fn declaration_for(call: &SyntaxNode, statement: &SyntaxNode) -> GreenNode {
    let declarator = GreenNode::new(
        SyntaxKind::named(VARIABLE_DECLARATOR).into(),
        vec![
            node(leaf(SyntaxKind::named(IDENTIFIER).in_field("name"), BINDING_NAME)),
            trivia(" "),
            token("=", "="),
            trivia(" "),
            node(retag(call, call.kind().without_field())),
        ],
    );
    let variable_declaration = GreenNode::new(
        SyntaxKind::named(VARIABLE_DECLARATION).into(),
        vec![
            node(leaf(SyntaxKind::named(IMPLICIT_TYPE).in_field("type"), "var")),
            trivia(" "),
            node(declarator),
        ],
    );

    let children: Vec<GreenElement> = statement
        .green()
        .children()
        .enumerate()
        .map(|(index, child)| {
            if index == call.index() {
                node(variable_declaration.clone())
            } else {
                owned(child)
            }
        })
        .collect();
    GreenNode::new(SyntaxKind::named(LOCAL_DECLARATION_STATEMENT).into(), children)
}

/// `{ <statement> }`, filling the field of the statement it replaces.
fn block_around(statement: GreenNode, replaced: SyntaxKind) -> GreenNode {
    GreenNode::new(
        SyntaxKind::named(BLOCK).with_field_of(replaced).into(),
        vec![
            token("{", "{"),
            trivia(" "),
            node(statement),
            trivia(" "),
            token("}", "}"),
        ],
    )
}

/// `node`'s green subtree under a different kind.
fn retag(source: &SyntaxNode, kind: SyntaxKind) -> GreenNode {
    let children: Vec<GreenElement> = source.green().children().map(owned).collect();
    GreenNode::new(kind.into(), children)
}

/// A named leaf: a node wrapping one token of the same symbol.
fn leaf(kind: SyntaxKind, text: &str) -> GreenNode {
    GreenNode::new(
        kind.into(),
        vec![NodeOrToken::Token(GreenToken::new(
            kind.without_field().into(),
            text,
        ))],
    )
}

fn node(green: GreenNode) -> GreenElement {
    NodeOrToken::Node(green)
}

fn token(kind: &str, text: &str) -> GreenElement {
    NodeOrToken::Token(GreenToken::new(SyntaxKind::anonymous(kind).into(), text))
}

fn trivia(text: &str) -> GreenElement {
    NodeOrToken::Token(GreenToken::new(SyntaxKind::TRIVIA.into(), text))
}

fn owned(child: NodeOrToken<&rowan::GreenNodeData, &rowan::GreenTokenData>) -> GreenElement {
    match child {
        NodeOrToken::Node(node) => NodeOrToken::Node(node.to_owned()),
        NodeOrToken::Token(token) => NodeOrToken::Token(token.to_owned()),
    }
}

/// Whether a declaration cannot stand where `statement` stands.
fn is_embedded(statement: &SyntaxNode) -> bool {
    statement.parent().is_some_and(|parent| {
        !matches!(parent.kind().name(), BLOCK | SWITCH_SECTION | GLOBAL_STATEMENT)
    })
}
