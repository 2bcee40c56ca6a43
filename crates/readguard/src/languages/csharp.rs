//! C# front end.
//!
//! Parses C# with tree-sitter-c-sharp and lowers the result into a
//! full-fidelity rowan `SyntaxTree`:
//!
//! - named tree-sitter nodes become green nodes of the same symbol, with the
//!   grammar field they fill packed into their kind;
//! - named leaves (identifiers, predefined types, literals) become a node
//!   wrapping a single token, so every expression is addressable as a node;
//! - anonymous leaves (punctuation, keywords) become tokens;
//! - bytes between tokens become trivia tokens.
//!
//! Printing the lowered tree reproduces the source byte for byte. Lowering
//! walks the tree-sitter tree with a cursor and never recurses, so nesting
//! depth is bounded by memory rather than by the stack.

use std::num::NonZeroU16;

use rowan::GreenNodeBuilder;
use tracing::debug;

use super::tree_sitter_utils::{byte_text, error_count};
use crate::error::{Error, Result};
use crate::syntax::{SyntaxKind, SyntaxTree};

/// File extensions handled by the C# front end.
pub const EXTENSIONS: &[&str] = &["cs"];

/// Tree-sitter node kind constants for C# grammar.
///
/// These match the node types defined in tree-sitter-c-sharp. Using constants
/// prevents typos and makes supported node types explicit.
#[allow(missing_docs)]
pub mod node_kinds {
    // Compilation structure
    pub const COMPILATION_UNIT: &str = "compilation_unit";
    pub const GLOBAL_STATEMENT: &str = "global_statement";
    pub const NAMESPACE_DECLARATION: &str = "namespace_declaration";
    pub const FILE_SCOPED_NAMESPACE_DECLARATION: &str = "file_scoped_namespace_declaration";
    pub const USING_DIRECTIVE: &str = "using_directive";

    // Type declarations
    pub const CLASS_DECLARATION: &str = "class_declaration";
    pub const STRUCT_DECLARATION: &str = "struct_declaration";
    pub const INTERFACE_DECLARATION: &str = "interface_declaration";
    pub const RECORD_DECLARATION: &str = "record_declaration";
    pub const BASE_LIST: &str = "base_list";
    pub const PRIMARY_CONSTRUCTOR_BASE_TYPE: &str = "primary_constructor_base_type";

    // Members
    pub const METHOD_DECLARATION: &str = "method_declaration";
    pub const CONSTRUCTOR_DECLARATION: &str = "constructor_declaration";
    pub const PROPERTY_DECLARATION: &str = "property_declaration";
    pub const FIELD_DECLARATION: &str = "field_declaration";
    pub const PARAMETER_LIST: &str = "parameter_list";
    pub const PARAMETER: &str = "parameter";

    // Statements
    pub const BLOCK: &str = "block";
    pub const EXPRESSION_STATEMENT: &str = "expression_statement";
    pub const LOCAL_DECLARATION_STATEMENT: &str = "local_declaration_statement";
    pub const LOCAL_FUNCTION_STATEMENT: &str = "local_function_statement";
    pub const VARIABLE_DECLARATION: &str = "variable_declaration";
    pub const VARIABLE_DECLARATOR: &str = "variable_declarator";
    pub const EQUALS_VALUE_CLAUSE: &str = "equals_value_clause";
    pub const IF_STATEMENT: &str = "if_statement";
    pub const WHILE_STATEMENT: &str = "while_statement";
    pub const DO_STATEMENT: &str = "do_statement";
    pub const FOR_STATEMENT: &str = "for_statement";
    pub const FOREACH_STATEMENT: &str = "foreach_statement";
    pub const USING_STATEMENT: &str = "using_statement";
    pub const SWITCH_SECTION: &str = "switch_section";

    // Expressions
    pub const INVOCATION_EXPRESSION: &str = "invocation_expression";
    pub const MEMBER_ACCESS_EXPRESSION: &str = "member_access_expression";
    pub const OBJECT_CREATION_EXPRESSION: &str = "object_creation_expression";
    pub const ASSIGNMENT_EXPRESSION: &str = "assignment_expression";
    pub const CONDITIONAL_EXPRESSION: &str = "conditional_expression";
    pub const CAST_EXPRESSION: &str = "cast_expression";
    pub const PARENTHESIZED_EXPRESSION: &str = "parenthesized_expression";
    pub const LAMBDA_EXPRESSION: &str = "lambda_expression";
    pub const ARGUMENT_LIST: &str = "argument_list";
    pub const ARGUMENT: &str = "argument";

    // Types & identifiers
    pub const IDENTIFIER: &str = "identifier";
    pub const IMPLICIT_TYPE: &str = "implicit_type";
}

/// Get the tree-sitter language for parsing C#.
#[must_use]
pub fn tree_sitter_language() -> tree_sitter::Language {
    tree_sitter_c_sharp::LANGUAGE.into()
}

/// Parse C# source into a lowered syntax tree.
///
/// Syntax errors do not fail the parse; tree-sitter recovers and the
/// recovered tree is analyzed. Only parser infrastructure failures are errors.
pub fn parse(source: &str) -> Result<SyntaxTree> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_language())
        .map_err(|e| Error::Parser(e.to_string()))?;
    let tree = parser
        .parse(source, None)
        .ok_or_else(|| Error::Parser("tree-sitter produced no tree".to_string()))?;
    lower(&tree, source)
}

/// Lower a tree-sitter tree into a `SyntaxTree`.
///
/// `source` must be the text `tree` was parsed from.
pub fn lower(tree: &tree_sitter::Tree, source: &str) -> Result<SyntaxTree> {
    let root = tree.root_node();
    let errors = error_count(&root);
    if errors > 0 {
        debug!(errors, "C# source has syntax errors, analyzing recovered tree");
    }

    let content = source.as_bytes();
    let mut lowering = Lowering {
        builder: GreenNodeBuilder::new(),
        content,
        pos: 0,
    };
    // End offset of every open node; the root always covers the whole text.
    let mut ends = vec![content.len()];
    lowering
        .builder
        .start_node(SyntaxKind::from_tree_sitter(root.kind_id(), None).into());

    let mut cursor = root.walk();
    if cursor.goto_first_child() {
        'walk: loop {
            let node = cursor.node();
            // Children that overlap bytes already emitted are dropped.
            if node.start_byte() >= lowering.pos {
                lowering.trivia(node.start_byte())?;
                let kind = SyntaxKind::from_tree_sitter(
                    node.kind_id(),
                    cursor.field_id().map(NonZeroU16::get),
                );
                if cursor.goto_first_child() {
                    lowering.builder.start_node(kind.into());
                    ends.push(node.end_byte());
                    continue;
                }
                lowering.leaf(&node, kind)?;
            }
            while !cursor.goto_next_sibling() {
                if !cursor.goto_parent() {
                    break 'walk;
                }
                let end = ends.pop().unwrap_or(lowering.pos);
                lowering.close(end)?;
            }
        }
    } else {
        lowering.close(content.len())?;
    }

    Ok(SyntaxTree::new(lowering.builder.finish()))
}

/// Green tree under construction plus how many source bytes it covers.
struct Lowering<'a> {
    builder: GreenNodeBuilder<'static>,
    content: &'a [u8],
    pos: usize,
}

impl Lowering<'_> {
    /// Emit the bytes up to `end` as one trivia token.
    fn trivia(&mut self, end: usize) -> Result<()> {
        if end > self.pos {
            let text = source_text(self.content, self.pos, end)?;
            self.builder.token(SyntaxKind::TRIVIA.into(), text);
            self.pos = end;
        }
        Ok(())
    }

    /// Leaves that are named, or that fill a field (such as `this` as a
    /// receiver), become nodes so field lookups can see them.
    fn leaf(&mut self, node: &tree_sitter::Node, kind: SyntaxKind) -> Result<()> {
        let text = source_text(self.content, node.start_byte(), node.end_byte())?;
        if node.is_named() || kind.has_field() {
            self.builder.start_node(kind.into());
            self.builder.token(kind.without_field().into(), text);
            self.builder.finish_node();
        } else {
            self.builder.token(kind.into(), text);
        }
        self.pos = self.pos.max(node.end_byte());
        Ok(())
    }

    /// Cover the rest of the open node up to `end` and close it.
    fn close(&mut self, end: usize) -> Result<()> {
        self.trivia(end)?;
        self.builder.finish_node();
        Ok(())
    }
}

fn source_text(content: &[u8], start: usize, end: usize) -> Result<&str> {
    byte_text(content, start..end)
        .ok_or_else(|| Error::Parser(format!("source range {start}..{end} is not valid UTF-8")))
}
