//! Node and token kinds.
//!
//! A kind packs a tree-sitter-c-sharp symbol id together with the grammar
//! field the element fills in its parent. Keeping the field inside the kind
//! means a green node carries everything field lookups need, and path-copied
//! trees keep their field names without a side table.
//!
//! Raw layout (16 bits): `field << 10 | symbol`. Field `0` means "no field".

use std::fmt;
use std::num::NonZeroU16;
use std::sync::LazyLock;

use crate::languages::csharp::tree_sitter_language;

static LANGUAGE: LazyLock<tree_sitter::Language> = LazyLock::new(tree_sitter_language);

const SYMBOL_BITS: u16 = 10;
const SYMBOL_MASK: u16 = (1 << SYMBOL_BITS) - 1;
const TRIVIA_SYMBOL: u16 = SYMBOL_MASK;
const ERROR_SYMBOL: u16 = SYMBOL_MASK - 1;
const MAX_FIELD: u16 = u16::MAX >> SYMBOL_BITS;

/// The kind of a node or token: grammar symbol plus the field it fills.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SyntaxKind {
    symbol: u16,
    field: u16,
}

impl SyntaxKind {
    /// Whitespace and other bytes between grammar tokens.
    pub const TRIVIA: Self = Self {
        symbol: TRIVIA_SYMBOL,
        field: 0,
    };

    /// Kind for a tree-sitter symbol id and optional field id.
    ///
    /// Symbols outside the grammar's table (tree-sitter's `ERROR`) collapse
    /// into one error kind.
    #[must_use]
    pub fn from_tree_sitter(symbol: u16, field: Option<u16>) -> Self {
        Self {
            symbol: symbol.min(ERROR_SYMBOL),
            field: field.filter(|&id| id <= MAX_FIELD).unwrap_or(0),
        }
    }

    /// Kind of a named grammar node, e.g. `"block"`.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self::from_tree_sitter(LANGUAGE.id_for_node_kind(name, true), None)
    }

    /// Kind of an anonymous token, e.g. `"="`.
    #[must_use]
    pub fn anonymous(text: &str) -> Self {
        Self::from_tree_sitter(LANGUAGE.id_for_node_kind(text, false), None)
    }

    /// The same symbol filling the given grammar field.
    #[must_use]
    pub fn in_field(self, field: &str) -> Self {
        let field = LANGUAGE.field_id_for_name(field).map(NonZeroU16::get);
        Self::from_tree_sitter(self.symbol, field)
    }

    /// The same symbol, filling whatever field `other` fills.
    #[must_use]
    pub fn with_field_of(self, other: Self) -> Self {
        Self {
            field: other.field,
            ..self
        }
    }

    /// The same symbol, outside any field.
    #[must_use]
    pub fn without_field(self) -> Self {
        Self { field: 0, ..self }
    }

    /// Grammar name of the symbol (`"invocation_expression"`, `";"`, ...).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self.symbol {
            TRIVIA_SYMBOL => "trivia",
            ERROR_SYMBOL => "ERROR",
            symbol => LANGUAGE.node_kind_for_id(symbol).unwrap_or("unknown"),
        }
    }

    /// Grammar field this element fills in its parent, if any.
    #[must_use]
    pub fn field(self) -> Option<&'static str> {
        if self.field == 0 {
            return None;
        }
        LANGUAGE.field_name_for_id(self.field)
    }

    /// Whether the element fills a grammar field.
    #[must_use]
    pub fn has_field(self) -> bool {
        self.field != 0
    }

    fn from_raw(raw: rowan::SyntaxKind) -> Self {
        Self {
            symbol: raw.0 & SYMBOL_MASK,
            field: raw.0 >> SYMBOL_BITS,
        }
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self((kind.field << SYMBOL_BITS) | kind.symbol)
    }
}

impl fmt::Debug for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field() {
            Some(field) => write!(f, "{}:{}", field, self.name()),
            None => f.write_str(self.name()),
        }
    }
}

/// The C# language tag for rowan trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CSharp {}

impl rowan::Language for CSharp {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        SyntaxKind::from_raw(raw)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}
