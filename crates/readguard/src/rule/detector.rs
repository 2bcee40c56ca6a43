//! Per-call detection.
//!
//! `evaluate` runs four gates against a single call site, cheapest first:
//!
//! 1. the callee's member name is `Read` (syntax only);
//! 2. the bound method returns exactly `int`;
//! 3. the method's containing type is, or descends from, `System.IO.Stream`;
//! 4. the call's result is discarded.
//!
//! Every gate that cannot be decided fails closed: a missing symbol, an
//! unreadable callee or an unexpected parent shape all mean "no finding".

use std::collections::HashSet;

use tracing::trace;

use super::{MESSAGE, RULE_ID, TARGET_MEMBER, TARGET_NAMESPACE, TARGET_TYPE};
use crate::languages::csharp::node_kinds::{
    ASSIGNMENT_EXPRESSION, CONDITIONAL_EXPRESSION, DO_STATEMENT, EQUALS_VALUE_CLAUSE,
    EXPRESSION_STATEMENT, FOR_STATEMENT, IDENTIFIER, IF_STATEMENT, INVOCATION_EXPRESSION,
    MEMBER_ACCESS_EXPRESSION, VARIABLE_DECLARATOR, WHILE_STATEMENT,
};
use crate::semantics::{Resolver, TypeId};
use crate::syntax::{SyntaxNode, SyntaxNodeExt, SyntaxTree};
use crate::types::{Finding, Severity, Span, TextRange};

/// One `invocation_expression` in a tree, with its location.
#[derive(Debug, Clone)]
pub struct CallSite {
    node: SyntaxNode,
    span: Span,
}

impl CallSite {
    /// Wrap an invocation node. Returns `None` for any other node kind.
    #[must_use]
    pub fn new(node: SyntaxNode, tree: &SyntaxTree) -> Option<Self> {
        if node.kind().name() != INVOCATION_EXPRESSION {
            return None;
        }
        let span = tree.span(node.text_range());
        Some(Self { node, span })
    }

    /// The invocation node.
    #[must_use]
    pub fn node(&self) -> &SyntaxNode {
        &self.node
    }

    /// Byte range of the whole call.
    #[must_use]
    pub fn range(&self) -> TextRange {
        self.node.text_range()
    }

    /// Line/column span of the whole call.
    #[must_use]
    pub fn span(&self) -> Span {
        self.span
    }

    /// Name of the called member: `Read` in both `s.Read(..)` and `Read(..)`.
    ///
    /// `None` for callee shapes without a plain member name.
    #[must_use]
    pub fn member_name(&self) -> Option<String> {
        let function = self.node.child_by_field("function")?;
        match function.kind().name() {
            MEMBER_ACCESS_EXPRESSION => function
                .child_by_field("name")
                .map(|n| n.text().to_string()),
            IDENTIFIER => Some(function.text().to_string()),
            _ => None,
        }
    }

    /// Where the call sits relative to its parent and grandparent.
    #[must_use]
    pub fn role(&self) -> SyntacticRole {
        SyntacticRole::of(&self.node)
    }

    /// How the call's result is used.
    #[must_use]
    pub fn context(&self) -> SyntacticContext {
        self.role().context()
    }
}

/// How a call's result is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntacticContext {
    /// Bound to a variable, directly or through a cast or comparison.
    Assigned,
    /// Part of a branch or loop condition.
    Compared,
    /// Evaluated only for its side effects.
    Unused,
    /// Any other position (argument, return value, lambda body).
    Other,
}

impl SyntacticContext {
    /// Whether the result is observed. Only `Unused` is reported.
    #[must_use]
    pub fn is_observed(self) -> bool {
        !matches!(self, Self::Unused)
    }
}

/// The syntactic position of a call, derived once from its ancestors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntacticRole {
    /// The call is the root of its tree.
    Detached,
    /// The call is the whole expression of a statement.
    Statement,
    /// The call is directly bound: initializer or assignment right-hand side.
    Binding,
    /// The call is one step below a binding (cast, comparison, conditional).
    NestedInBinding,
    /// The call is one step below a branch or loop construct: part of its
    /// condition, or the whole of an unbraced body.
    BranchCondition,
    /// Anything else.
    Nested,
}

impl SyntacticRole {
    /// Classify `node` by its parent and grandparent kinds.
    ///
    /// Bindings and branches are checked before the bare-statement case, so
    /// a statement that is the unbraced body of an `if` or loop counts as part
    /// of that construct.
    #[must_use]
    pub fn of(node: &SyntaxNode) -> Self {
        let Some(parent) = node.parent() else {
            return Self::Detached;
        };
        if binds_child(&parent, node) {
            return Self::Binding;
        }
        if let Some(grandparent) = parent.parent() {
            if binds_child(&grandparent, &parent) {
                return Self::NestedInBinding;
            }
            if is_branch(grandparent.kind().name()) {
                return Self::BranchCondition;
            }
        }
        if parent.kind().name() == EXPRESSION_STATEMENT {
            return Self::Statement;
        }
        Self::Nested
    }

    /// Map the position to a result-usage context.
    #[must_use]
    pub fn context(self) -> SyntacticContext {
        match self {
            Self::Detached | Self::Statement => SyntacticContext::Unused,
            Self::Binding | Self::NestedInBinding => SyntacticContext::Assigned,
            Self::BranchCondition => SyntacticContext::Compared,
            Self::Nested => SyntacticContext::Other,
        }
    }
}

/// Whether `parent` binds the value of `child` to a name.
fn binds_child(parent: &SyntaxNode, child: &SyntaxNode) -> bool {
    match parent.kind().name() {
        VARIABLE_DECLARATOR | EQUALS_VALUE_CLAUSE => true,
        ASSIGNMENT_EXPRESSION => child.field() != Some("left"),
        _ => false,
    }
}

fn is_branch(kind: &str) -> bool {
    matches!(
        kind,
        IF_STATEMENT | WHILE_STATEMENT | DO_STATEMENT | FOR_STATEMENT | CONDITIONAL_EXPRESSION
    )
}

/// Decide whether `call` is a stream read with a discarded result.
pub fn evaluate<R: Resolver + ?Sized>(call: &CallSite, resolver: &R) -> Option<Finding> {
    if call.member_name().as_deref() != Some(TARGET_MEMBER) {
        return None;
    }

    let range = call.range();
    let Some(method) = resolver.resolve_method(call.node()) else {
        trace!(?range, "Read call did not resolve to a method");
        return None;
    };
    if !method.return_type.is_int32() {
        trace!(?range, return_type = %method.return_type, "Read does not return int");
        return None;
    }
    if !declared_on_stream(method.containing_type, resolver) {
        trace!(?range, "Read is not declared on a System.IO.Stream type");
        return None;
    }

    let context = call.context();
    if context.is_observed() {
        trace!(?range, ?context, "Read result is observed");
        return None;
    }

    Some(Finding {
        rule_id: RULE_ID,
        severity: Severity::Warning,
        message: MESSAGE,
        range,
        span: call.span(),
    })
}

/// Walk the declaring-type chain looking for `System.IO.Stream`.
fn declared_on_stream<R: Resolver + ?Sized>(start: TypeId, resolver: &R) -> bool {
    let mut visited = HashSet::new();
    let mut current = Some(start);
    while let Some(id) = current {
        if !visited.insert(id) {
            trace!(type_id = id.as_u32(), "Cyclic base type chain");
            return false;
        }
        let Some(ty) = resolver.declared_type(id) else {
            return false;
        };
        if ty.is(TARGET_TYPE, TARGET_NAMESPACE) {
            return true;
        }
        current = resolver.base_type(id);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::csharp;
    use crate::semantics::{DeclaredType, MethodSymbol, SpecialType, TypeKind, TypeRef};
    use rstest::rstest;

    /// Resolves every call to one fixed symbol.
    struct FixedResolver {
        types: Vec<DeclaredType>,
        symbol: Option<MethodSymbol>,
    }

    impl Resolver for FixedResolver {
        fn resolve_method(&self, _call: &SyntaxNode) -> Option<MethodSymbol> {
            self.symbol.clone()
        }

        fn declared_type(&self, id: TypeId) -> Option<&DeclaredType> {
            self.types.get(id.index())
        }
    }

    fn declared(name: &str, namespace: &[&str], base: Option<u32>) -> DeclaredType {
        DeclaredType {
            name: name.to_string(),
            namespace: namespace.iter().map(|s| (*s).to_string()).collect(),
            kind: TypeKind::Class,
            base: base.map(TypeId),
        }
    }

    fn read_on(containing: u32, return_type: TypeRef) -> Option<MethodSymbol> {
        Some(MethodSymbol {
            name: "Read".to_string(),
            return_type,
            containing_type: TypeId(containing),
        })
    }

    fn int32() -> TypeRef {
        TypeRef::Special(SpecialType::Int32)
    }

    /// `System.IO.Stream` at 0 and `MemoryStream : Stream` at 1.
    fn stream_resolver() -> FixedResolver {
        FixedResolver {
            types: vec![
                declared("Stream", &["System", "IO"], None),
                declared("MemoryStream", &["System", "IO"], Some(0)),
            ],
            symbol: read_on(1, int32()),
        }
    }

    fn wrap(body: &str) -> String {
        format!("class A {{ int M() {{ {body} }} }}")
    }

    fn calls(code: &str) -> (SyntaxTree, Vec<CallSite>) {
        let tree = csharp::parse(code).expect("parse should succeed");
        let sites = tree
            .nodes_of_kind(INVOCATION_EXPRESSION)
            .filter_map(|node| CallSite::new(node, &tree))
            .collect();
        (tree, sites)
    }

    fn read_call(code: &str) -> CallSite {
        let (_, sites) = calls(code);
        sites
            .into_iter()
            .find(|site| site.member_name().as_deref() == Some("Read"))
            .expect("code should contain a Read call")
    }

    #[test]
    fn discarded_stream_read_is_reported_at_call_range() {
        let code = wrap("ms.Read(buf, 0, 1);");
        let site = read_call(&code);

        let finding = evaluate(&site, &stream_resolver()).expect("finding");

        assert_eq!(finding.rule_id, "StreamNoDiscardAnalyzer");
        assert_eq!(finding.severity, Severity::Warning);
        assert_eq!(
            finding.message,
            "Stream read call should not discard return value of actual bytes read"
        );
        let start = code.find("ms.Read").expect("call text");
        let end = start + "ms.Read(buf, 0, 1)".len();
        assert_eq!(&code[finding.range], "ms.Read(buf, 0, 1)");
        assert_eq!(usize::from(finding.range.start()), start);
        assert_eq!(usize::from(finding.range.end()), end);
        assert_eq!(finding.span.start_line(), 1);
        assert_eq!(finding.span.start_column(), u32::try_from(start + 1).expect("small"));
    }

    #[rstest]
    #[case::int64(TypeRef::Special(SpecialType::Int64))]
    #[case::void(TypeRef::Special(SpecialType::Void))]
    #[case::declared(TypeRef::Declared(TypeId(0)))]
    #[case::unresolved(TypeRef::Unresolved("int".to_string()))]
    fn non_int32_return_is_ignored(#[case] return_type: TypeRef) {
        let mut resolver = stream_resolver();
        resolver.symbol = read_on(1, return_type);
        let site = read_call(&wrap("ms.Read(buf, 0, 1);"));

        assert!(evaluate(&site, &resolver).is_none());
    }

    #[test]
    fn unresolved_call_is_ignored() {
        let mut resolver = stream_resolver();
        resolver.symbol = None;
        let site = read_call(&wrap("ms.Read(buf, 0, 1);"));

        assert!(evaluate(&site, &resolver).is_none());
    }

    #[rstest]
    #[case::unrelated_type(declared("FakeStream", &["My", "IO"], None))]
    #[case::stream_in_other_namespace(declared("Stream", &["My", "IO"], None))]
    #[case::longer_namespace(declared("Stream", &["My", "System", "IO"], None))]
    #[case::shorter_namespace(declared("Stream", &["IO"], None))]
    fn non_stream_declaring_type_is_ignored(#[case] ty: DeclaredType) {
        let resolver = FixedResolver {
            types: vec![ty],
            symbol: read_on(0, int32()),
        };
        let site = read_call(&wrap("ms.Read(buf, 0, 1);"));

        assert!(evaluate(&site, &resolver).is_none());
    }

    #[test]
    fn deep_descendant_of_stream_is_reported() {
        let resolver = FixedResolver {
            types: vec![
                declared("Stream", &["System", "IO"], None),
                declared("MemoryStream", &["System", "IO"], Some(0)),
                declared("PooledStream", &["App"], Some(1)),
                declared("TracingStream", &["App"], Some(2)),
            ],
            symbol: read_on(3, int32()),
        };
        let site = read_call(&wrap("ms.Read(buf, 0, 1);"));

        assert!(evaluate(&site, &resolver).is_some());
    }

    #[test]
    fn cyclic_hierarchy_terminates_without_finding() {
        let resolver = FixedResolver {
            types: vec![declared("A", &["App"], Some(1)), declared("B", &["App"], Some(0))],
            symbol: read_on(0, int32()),
        };
        let site = read_call(&wrap("ms.Read(buf, 0, 1);"));

        assert!(evaluate(&site, &resolver).is_none());
    }

    #[rstest]
    #[case::other_member("ms.Write(buf, 0, 1);")]
    #[case::read_prefix("ms.ReadByte();")]
    #[case::lowercase("ms.read(buf, 0, 1);")]
    fn other_member_names_never_resolve(#[case] body: &str) {
        let (_, sites) = calls(&wrap(body));
        let resolver = stream_resolver();

        assert!(sites.iter().all(|site| evaluate(site, &resolver).is_none()));
    }

    #[test]
    fn bare_identifier_callee_is_named() {
        let site = read_call(&wrap("Read(buf, 0, 1);"));
        assert_eq!(site.member_name().as_deref(), Some("Read"));
        assert!(evaluate(&site, &stream_resolver()).is_some());
    }

    #[rstest]
    #[case::statement("ms.Read(buf, 0, 1);", SyntacticContext::Unused)]
    #[case::block_body("if (flag) { ms.Read(buf, 0, 1); }", SyntacticContext::Unused)]
    #[case::unbraced_if_body("if (flag) ms.Read(buf, 0, 1);", SyntacticContext::Compared)]
    #[case::unbraced_else_body("if (flag) { } else ms.Read(buf, 0, 1);", SyntacticContext::Compared)]
    #[case::unbraced_while_body("while (flag) ms.Read(buf, 0, 1);", SyntacticContext::Compared)]
    #[case::unbraced_for_body("for (;;) ms.Read(buf, 0, 1);", SyntacticContext::Compared)]
    #[case::initializer("var n = ms.Read(buf, 0, 1);", SyntacticContext::Assigned)]
    #[case::assignment("n = ms.Read(buf, 0, 1);", SyntacticContext::Assigned)]
    #[case::discard("_ = ms.Read(buf, 0, 1);", SyntacticContext::Assigned)]
    #[case::cast_in_initializer("var n = (long) ms.Read(buf, 0, 1);", SyntacticContext::Assigned)]
    #[case::comparison_in_initializer("var done = ms.Read(buf, 0, 1) == 0;", SyntacticContext::Assigned)]
    #[case::if_comparison("if (x > ms.Read(buf, 0, 1)) return 0;", SyntacticContext::Compared)]
    #[case::while_comparison("while (ms.Read(buf, 0, 1) > 0) { }", SyntacticContext::Compared)]
    #[case::argument("Consume(ms.Read(buf, 0, 1));", SyntacticContext::Other)]
    #[case::returned("return ms.Read(buf, 0, 1);", SyntacticContext::Other)]
    #[case::lambda_body("Run(() => ms.Read(buf, 0, 1));", SyntacticContext::Other)]
    fn classifies_result_usage(#[case] body: &str, #[case] expected: SyntacticContext) {
        let site = read_call(&wrap(body));
        assert_eq!(site.context(), expected);
    }

    #[rstest]
    #[case::unused("ms.Read(buf, 0, 1);", true)]
    #[case::assigned("var n = ms.Read(buf, 0, 1);", false)]
    #[case::compared("if (x > ms.Read(buf, 0, 1)) return 0;", false)]
    #[case::other("Consume(ms.Read(buf, 0, 1));", false)]
    #[case::returned("return ms.Read(buf, 0, 1);", false)]
    #[case::lambda_body("Run(() => ms.Read(buf, 0, 1));", false)]
    #[case::unbraced_if_body("if (flag) ms.Read(buf, 0, 1);", false)]
    #[case::unbraced_while_body("while (flag) ms.Read(buf, 0, 1);", false)]
    fn only_unused_results_are_reported(#[case] body: &str, #[case] reported: bool) {
        let site = read_call(&wrap(body));
        assert_eq!(evaluate(&site, &stream_resolver()).is_some(), reported);
    }

    #[test]
    fn evaluation_is_repeatable() {
        let code = wrap("ms.Read(buf, 0, 1); ms.Read(buf, 0, 2);");
        let (_, sites) = calls(&code);
        let resolver = stream_resolver();

        let first: Vec<_> = sites.iter().filter_map(|s| evaluate(s, &resolver)).collect();
        let second: Vec<_> = sites.iter().filter_map(|s| evaluate(s, &resolver)).collect();

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn call_site_rejects_other_node_kinds() {
        let tree = csharp::parse("class A { }").expect("parse");
        assert!(CallSite::new(tree.root(), &tree).is_none());
    }

    #[test]
    fn detached_call_is_unused() {
        let tree = csharp::parse(&wrap("ms.Read(buf, 0, 1);")).expect("parse");
        let call = tree.nodes_of_kind(INVOCATION_EXPRESSION).next().expect("call");
        let detached = SyntaxTree::new(call.green().into_owned());
        let site = CallSite::new(detached.root(), &detached).expect("invocation root");

        assert_eq!(site.role(), SyntacticRole::Detached);
        assert_eq!(site.context(), SyntacticContext::Unused);
    }
}
