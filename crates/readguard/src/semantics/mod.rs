//! Symbol and type resolution.
//!
//! The rule never embeds a type system. It asks a `Resolver` two questions:
//! "which method does this call bind to?" and "what is the next ancestor of
//! this type?". Anything that can answer them can drive the rule: the
//! per-file `SemanticModel` here, or a hand-built resolver in tests.
//!
//! ## Resolution Model
//!
//! | Concept | Type | Notes |
//! |---------|------|-------|
//! | Type handle | `TypeId` | Index into the resolver's own table |
//! | Type facts | `DeclaredType` | Simple name, namespace path, base type |
//! | Call target | `MethodSymbol` | Return type plus containing type |
//! | Type reference | `TypeRef` | Special, declared, or unresolved |

pub mod catalog;
mod model;

pub use model::SemanticModel;

use std::fmt;

use crate::syntax::SyntaxNode;

/// A strongly-typed handle to a type known by a resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Extract the raw u32 value.
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// The handle as a table index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for TypeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Built-in types with dedicated keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialType {
    /// `void` / `System.Void`
    Void,
    /// `object` / `System.Object`
    Object,
    /// `bool` / `System.Boolean`
    Boolean,
    /// `char` / `System.Char`
    Char,
    /// `sbyte` / `System.SByte`
    SByte,
    /// `byte` / `System.Byte`
    Byte,
    /// `short` / `System.Int16`
    Int16,
    /// `ushort` / `System.UInt16`
    UInt16,
    /// `int` / `System.Int32`
    Int32,
    /// `uint` / `System.UInt32`
    UInt32,
    /// `long` / `System.Int64`
    Int64,
    /// `ulong` / `System.UInt64`
    UInt64,
    /// `float` / `System.Single`
    Single,
    /// `double` / `System.Double`
    Double,
    /// `decimal` / `System.Decimal`
    Decimal,
    /// `string` / `System.String`
    String,
}

impl SpecialType {
    /// Map a C# keyword (`int`, `void`, ...) to its special type.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "void" => Some(Self::Void),
            "object" => Some(Self::Object),
            "bool" => Some(Self::Boolean),
            "char" => Some(Self::Char),
            "sbyte" => Some(Self::SByte),
            "byte" => Some(Self::Byte),
            "short" => Some(Self::Int16),
            "ushort" => Some(Self::UInt16),
            "int" => Some(Self::Int32),
            "uint" => Some(Self::UInt32),
            "long" => Some(Self::Int64),
            "ulong" => Some(Self::UInt64),
            "float" => Some(Self::Single),
            "double" => Some(Self::Double),
            "decimal" => Some(Self::Decimal),
            "string" => Some(Self::String),
            _ => None,
        }
    }

    /// Map a metadata name in `System` (`Int32`, `Void`, ...) to its special type.
    #[must_use]
    pub fn from_metadata_name(name: &str) -> Option<Self> {
        match name {
            "Void" => Some(Self::Void),
            "Object" => Some(Self::Object),
            "Boolean" => Some(Self::Boolean),
            "Char" => Some(Self::Char),
            "SByte" => Some(Self::SByte),
            "Byte" => Some(Self::Byte),
            "Int16" => Some(Self::Int16),
            "UInt16" => Some(Self::UInt16),
            "Int32" => Some(Self::Int32),
            "UInt32" => Some(Self::UInt32),
            "Int64" => Some(Self::Int64),
            "UInt64" => Some(Self::UInt64),
            "Single" => Some(Self::Single),
            "Double" => Some(Self::Double),
            "Decimal" => Some(Self::Decimal),
            "String" => Some(Self::String),
            _ => None,
        }
    }
}

/// A reference to a type as written in source, after resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A keyword type such as `int`
    Special(SpecialType),
    /// A type the resolver knows about
    Declared(TypeId),
    /// A type name nothing could resolve (kept for diagnostics)
    Unresolved(String),
}

impl TypeRef {
    /// Whether this is exactly the 32-bit signed integer type.
    #[must_use]
    pub fn is_int32(&self) -> bool {
        matches!(self, Self::Special(SpecialType::Int32))
    }

    /// The declared type handle, if any.
    #[must_use]
    pub fn declared(&self) -> Option<TypeId> {
        match self {
            Self::Declared(id) => Some(*id),
            _ => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Special(special) => write!(f, "{special:?}"),
            Self::Declared(id) => write!(f, "type#{}", id.0),
            Self::Unresolved(name) => write!(f, "{name}?"),
        }
    }
}

/// What sort of type declaration a `DeclaredType` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// `class`
    Class,
    /// `struct`
    Struct,
    /// `interface`
    Interface,
    /// `record` / `record class` / `record struct`
    Record,
}

impl TypeKind {
    /// Whether a type of this kind can be another type's base class.
    #[must_use]
    pub fn can_be_base(self) -> bool {
        matches!(self, Self::Class | Self::Record)
    }
}

/// Facts about one type: its name, where it lives, and what it extends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredType {
    /// Simple name (e.g. `Stream`)
    pub name: String,
    /// Enclosing namespace path, outermost first (e.g. `["System", "IO"]`)
    pub namespace: Vec<String>,
    /// Declaration kind
    pub kind: TypeKind,
    /// Base class, or `None` when the chain ends here
    pub base: Option<TypeId>,
}

impl DeclaredType {
    /// Fully qualified name (e.g. `System.IO.Stream`).
    #[must_use]
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace.join("."), self.name)
        }
    }

    /// Exact match on simple name and every namespace segment.
    #[must_use]
    pub fn is(&self, name: &str, namespace: &[&str]) -> bool {
        self.name == name
            && self.namespace.len() == namespace.len()
            && self
                .namespace
                .iter()
                .zip(namespace)
                .all(|(actual, expected)| actual == expected)
    }
}

/// The method a call expression binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSymbol {
    /// Method name
    pub name: String,
    /// Declared return type
    pub return_type: TypeRef,
    /// Type that declares (or overrides) the method
    pub containing_type: TypeId,
}

/// Symbol and type resolution, keyed by syntax nodes.
///
/// Implementations must be shareable across threads: the driver may evaluate
/// call sites concurrently against one resolver.
pub trait Resolver: Sync {
    /// Resolve an `invocation_expression` to the method it calls.
    ///
    /// Returns `None` when the target cannot be determined.
    fn resolve_method(&self, call: &SyntaxNode) -> Option<MethodSymbol>;

    /// Look up the facts for a type handle.
    fn declared_type(&self, id: TypeId) -> Option<&DeclaredType>;

    /// Next ancestor of a type, or `None` when the chain ends.
    fn base_type(&self, id: TypeId) -> Option<TypeId> {
        self.declared_type(id)?.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn stream() -> DeclaredType {
        DeclaredType {
            name: "Stream".to_string(),
            namespace: vec!["System".to_string(), "IO".to_string()],
            kind: TypeKind::Class,
            base: None,
        }
    }

    #[rstest]
    #[case::exact("Stream", &["System", "IO"], true)]
    #[case::wrong_name("MemoryStream", &["System", "IO"], false)]
    #[case::too_short("Stream", &["IO"], false)]
    #[case::too_long("Stream", &["My", "System", "IO"], false)]
    #[case::prefix_only("Stream", &["System", "I"], false)]
    fn is_matches_exact_namespace_path(
        #[case] name: &str,
        #[case] namespace: &[&str],
        #[case] expected: bool,
    ) {
        assert_eq!(stream().is(name, namespace), expected);
    }

    #[test]
    fn qualified_name_joins_namespace() {
        assert_eq!(stream().qualified_name(), "System.IO.Stream");
    }

    #[rstest]
    #[case::keyword("int", Some(SpecialType::Int32))]
    #[case::void("void", Some(SpecialType::Void))]
    #[case::not_a_keyword("Int32", None)]
    fn keywords_map_to_special_types(#[case] text: &str, #[case] expected: Option<SpecialType>) {
        assert_eq!(SpecialType::from_keyword(text), expected);
    }

    #[test]
    fn only_int32_counts_as_byte_count_type() {
        assert!(TypeRef::Special(SpecialType::Int32).is_int32());
        assert!(!TypeRef::Special(SpecialType::Int64).is_int32());
        assert!(!TypeRef::Declared(TypeId(0)).is_int32());
        assert!(!TypeRef::Unresolved("int".to_string()).is_int32());
    }
}
