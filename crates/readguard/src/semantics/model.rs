//! Per-file semantic model.
//!
//! Built once per syntax tree. Registers the well-known framework types and
//! every type declared in the file, resolves base classes and member types,
//! then answers call-binding questions by walking scopes on demand.
//!
//! Resolution is deliberately partial: anything it cannot pin down yields
//! `None`, and callers treat `None` as "not a match".

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use super::catalog::{self, CatalogType};
use super::{DeclaredType, MethodSymbol, Resolver, SpecialType, TypeId, TypeKind, TypeRef};
use crate::languages::csharp::node_kinds::{
    ARGUMENT, ARGUMENT_LIST, BASE_LIST, BLOCK, CAST_EXPRESSION, CLASS_DECLARATION,
    COMPILATION_UNIT, CONSTRUCTOR_DECLARATION, EQUALS_VALUE_CLAUSE, FIELD_DECLARATION,
    FILE_SCOPED_NAMESPACE_DECLARATION, FOREACH_STATEMENT, FOR_STATEMENT, GLOBAL_STATEMENT,
    IDENTIFIER, INTERFACE_DECLARATION, INVOCATION_EXPRESSION, LAMBDA_EXPRESSION,
    LOCAL_DECLARATION_STATEMENT, LOCAL_FUNCTION_STATEMENT, MEMBER_ACCESS_EXPRESSION,
    METHOD_DECLARATION, NAMESPACE_DECLARATION, OBJECT_CREATION_EXPRESSION, PARAMETER,
    PARAMETER_LIST, PARENTHESIZED_EXPRESSION, PRIMARY_CONSTRUCTOR_BASE_TYPE,
    PROPERTY_DECLARATION, RECORD_DECLARATION, STRUCT_DECLARATION, SWITCH_SECTION,
    USING_DIRECTIVE, USING_STATEMENT, VARIABLE_DECLARATION, VARIABLE_DECLARATOR,
};
use crate::syntax::{NodeOrToken, SyntaxNode, SyntaxNodeExt, SyntaxTree, TextSize};

/// Nested inference steps allowed before giving up on an expression.
const MAX_INFERENCE_DEPTH: usize = 32;

const PARAMETER_ARRAY: &str = "parameter_array";
const DECLARATION_LIST: &str = "declaration_list";

#[derive(Debug, Clone)]
struct MethodEntry {
    name: String,
    return_type: TypeRef,
    min_arity: usize,
    max_arity: usize,
}

impl MethodEntry {
    fn accepts(&self, arity: usize) -> bool {
        (self.min_arity..=self.max_arity).contains(&arity)
    }
}

#[derive(Debug, Clone)]
struct ValueEntry {
    name: String,
    ty: TypeRef,
}

#[derive(Debug)]
struct TypeEntry {
    declared: DeclaredType,
    from_source: bool,
    methods: Vec<MethodEntry>,
    values: Vec<ValueEntry>,
}

/// Name-based view of a type before cross-references are resolved.
#[derive(Debug)]
struct RawType {
    name: String,
    namespace: Vec<String>,
    kind: TypeKind,
    base: Option<String>,
    methods: Vec<RawMethod>,
    values: Vec<(String, String)>,
    declaration: Option<TextSize>,
}

#[derive(Debug)]
struct RawMethod {
    name: String,
    returns: String,
    min_arity: usize,
    max_arity: usize,
}

impl RawType {
    fn from_catalog(ty: &CatalogType) -> Self {
        Self {
            name: ty.name.to_string(),
            namespace: ty.namespace.iter().map(|s| (*s).to_string()).collect(),
            kind: TypeKind::Class,
            base: ty.base.map(str::to_string),
            methods: ty
                .methods
                .iter()
                .map(|m| RawMethod {
                    name: m.name.to_string(),
                    returns: m.returns.to_string(),
                    min_arity: m.min_arity,
                    max_arity: m.max_arity,
                })
                .collect(),
            values: ty
                .properties
                .iter()
                .map(|(name, ty)| ((*name).to_string(), (*ty).to_string()))
                .collect(),
            declaration: None,
        }
    }
}

/// Using directives in effect for the file.
#[derive(Debug, Default)]
struct Imports {
    namespaces: Vec<String>,
    aliases: HashMap<String, String>,
}

/// What a name in scope is bound to.
#[derive(Debug)]
enum Binding {
    Typed(TypeRef),
    /// Declared, but its type cannot be inferred (e.g. `var` of an unknown call).
    Untyped,
}

/// Symbol tables for one C# file plus the framework catalog.
#[derive(Debug)]
pub struct SemanticModel {
    types: Vec<TypeEntry>,
    by_name: HashMap<String, TypeId>,
    /// Type declaration start offset to the type it declares.
    declarations: HashMap<TextSize, TypeId>,
    imports: Imports,
}

impl SemanticModel {
    /// Build the model for a parsed file.
    #[must_use]
    pub fn build(tree: &SyntaxTree) -> Self {
        let root = tree.root();
        let mut raw: Vec<RawType> = catalog::WELL_KNOWN_TYPES
            .iter()
            .map(RawType::from_catalog)
            .collect();
        let catalog_len = raw.len();

        let mut imports = Imports::default();
        for node in root.descendants() {
            match node.kind().name() {
                USING_DIRECTIVE => imports.add(&node.text().to_string()),
                kind if is_type_declaration(kind) => {
                    if let Some(ty) = raw_type_from_declaration(&node) {
                        raw.push(ty);
                    }
                }
                _ => {}
            }
        }

        debug!(
            source_types = raw.len() - catalog_len,
            namespaces = imports.namespaces.len(),
            aliases = imports.aliases.len(),
            "Built semantic model"
        );
        Self::from_raw(raw, imports)
    }

    fn from_raw(raw: Vec<RawType>, imports: Imports) -> Self {
        let mut model = Self {
            types: Vec::with_capacity(raw.len()),
            by_name: HashMap::with_capacity(raw.len()),
            declarations: HashMap::new(),
            imports,
        };

        // Register every name first so members can refer to types declared later.
        let mut ids = Vec::with_capacity(raw.len());
        for ty in &raw {
            let qualified = qualify(&ty.namespace, &ty.name);
            let existing = model.by_name.get(&qualified).copied();
            let id = match existing {
                // Partial declarations of one source type merge.
                Some(id) if ty.declaration.is_some() && model.types[id.index()].from_source => id,
                _ => {
                    let Ok(raw_id) = u32::try_from(model.types.len()) else {
                        break;
                    };
                    let id = TypeId(raw_id);
                    model.types.push(TypeEntry {
                        declared: DeclaredType {
                            name: ty.name.clone(),
                            namespace: ty.namespace.clone(),
                            kind: ty.kind,
                            base: None,
                        },
                        from_source: ty.declaration.is_some(),
                        methods: Vec::new(),
                        values: Vec::new(),
                    });
                    model.by_name.insert(qualified, id);
                    id
                }
            };
            if let Some(offset) = ty.declaration {
                model.declarations.insert(offset, id);
            }
            ids.push(id);
        }

        for (ty, &id) in raw.iter().zip(&ids) {
            let base = ty
                .base
                .as_deref()
                .and_then(|text| model.resolve_type_name(text, &ty.namespace).declared())
                .filter(|&base| {
                    base != id && model.types[base.index()].declared.kind.can_be_base()
                });
            let methods: Vec<MethodEntry> = ty
                .methods
                .iter()
                .map(|m| MethodEntry {
                    name: m.name.clone(),
                    return_type: model.resolve_type_name(&m.returns, &ty.namespace),
                    min_arity: m.min_arity,
                    max_arity: m.max_arity,
                })
                .collect();
            let values: Vec<ValueEntry> = ty
                .values
                .iter()
                .map(|(name, text)| ValueEntry {
                    name: name.clone(),
                    ty: model.resolve_type_name(text, &ty.namespace),
                })
                .collect();

            let entry = &mut model.types[id.index()];
            if entry.declared.base.is_none() {
                entry.declared.base = base;
            }
            entry.methods.extend(methods);
            entry.values.extend(values);
        }

        model
    }

    /// Look up a type by its fully qualified name (e.g. `System.IO.Stream`).
    #[must_use]
    pub fn lookup_type(&self, qualified: &str) -> Option<TypeId> {
        self.by_name.get(qualified).copied()
    }

    /// Number of types known to the model, catalog included.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Infer the static type of an expression node.
    #[must_use]
    pub fn type_of(&self, expr: &SyntaxNode) -> Option<TypeRef> {
        self.infer(expr, 0)
    }

    // ========================================================================
    // Type names
    // ========================================================================

    /// Resolve type text relative to a namespace path.
    fn resolve_type_name(&self, text: &str, context: &[String]) -> TypeRef {
        let cleaned = normalize_type_text(text);
        if let Some(special) = SpecialType::from_keyword(&cleaned) {
            return TypeRef::Special(special);
        }
        // Arrays and tuples are never declared types.
        if cleaned.is_empty() || cleaned.ends_with(']') || cleaned.starts_with('(') {
            return TypeRef::Unresolved(cleaned);
        }
        let lookup = cleaned.split('<').next().unwrap_or_default();

        let resolved = if lookup.contains('.') {
            self.resolve_qualified(lookup, context)
        } else {
            self.resolve_simple(lookup, context)
        };
        resolved.unwrap_or(TypeRef::Unresolved(cleaned))
    }

    fn resolve_qualified(&self, lookup: &str, context: &[String]) -> Option<TypeRef> {
        if let Some(found) = self.lookup_absolute(lookup) {
            return Some(found);
        }
        if let Some((head, tail)) = lookup.split_once('.') {
            if let Some(target) = self.imports.aliases.get(head) {
                if let Some(found) = self.lookup_absolute(&format!("{target}.{tail}")) {
                    return Some(found);
                }
            }
        }
        (1..=context.len())
            .rev()
            .find_map(|depth| self.by_name.get(&qualify(&context[..depth], lookup)))
            .map(|&id| TypeRef::Declared(id))
    }

    fn resolve_simple(&self, lookup: &str, context: &[String]) -> Option<TypeRef> {
        // Innermost enclosing namespace wins over usings.
        if let Some(&id) = (0..=context.len())
            .rev()
            .find_map(|depth| self.by_name.get(&qualify(&context[..depth], lookup)))
        {
            return Some(TypeRef::Declared(id));
        }
        if let Some(target) = self.imports.aliases.get(lookup) {
            return self.lookup_absolute(target);
        }
        if let Some(&id) = self
            .imports
            .namespaces
            .iter()
            .find_map(|ns| self.by_name.get(&format!("{ns}.{lookup}")))
        {
            return Some(TypeRef::Declared(id));
        }
        let system_in_scope = context.first().is_some_and(|ns| ns == "System")
            || self.imports.namespaces.iter().any(|ns| ns == "System");
        if system_in_scope {
            return SpecialType::from_metadata_name(lookup).map(TypeRef::Special);
        }
        None
    }

    /// Resolve a fully qualified name without consulting scope.
    fn lookup_absolute(&self, qualified: &str) -> Option<TypeRef> {
        let qualified = qualified.strip_prefix("global::").unwrap_or(qualified);
        if let Some(&id) = self.by_name.get(qualified) {
            return Some(TypeRef::Declared(id));
        }
        qualified
            .strip_prefix("System.")
            .and_then(SpecialType::from_metadata_name)
            .map(TypeRef::Special)
    }

    /// Resolve type text as written at `at`.
    fn resolve_at(&self, text: &str, at: &SyntaxNode) -> TypeRef {
        self.resolve_type_name(text, &namespace_of(at))
    }

    // ========================================================================
    // Members
    // ========================================================================

    /// Find a method by name and argument count along the base chain.
    ///
    /// The most derived type with a matching overload decides. If its
    /// matching overloads disagree on return type, the call is ambiguous.
    fn find_method(&self, start: TypeId, name: &str, arity: usize) -> Option<MethodSymbol> {
        for id in self.chain(start) {
            let entry = self.types.get(id.index())?;
            let mut matches = entry
                .methods
                .iter()
                .filter(|m| m.name == name && m.accepts(arity));
            let Some(first) = matches.next() else {
                continue;
            };
            if matches.any(|m| m.return_type != first.return_type) {
                trace!(method = name, arity, "Ambiguous overloads, leaving call unresolved");
                return None;
            }
            return Some(MethodSymbol {
                name: first.name.clone(),
                return_type: first.return_type.clone(),
                containing_type: id,
            });
        }
        None
    }

    /// Find a field or property along the base chain.
    fn find_value(&self, start: TypeId, name: &str) -> Option<TypeRef> {
        self.chain(start).into_iter().find_map(|id| {
            self.types
                .get(id.index())?
                .values
                .iter()
                .find(|v| v.name == name)
                .map(|v| v.ty.clone())
        })
    }

    /// `start` and its ancestors, stopping at the first repeat.
    fn chain(&self, start: TypeId) -> Vec<TypeId> {
        let mut visited = HashSet::new();
        let mut chain = Vec::new();
        let mut current = Some(start);
        while let Some(id) = current {
            if !visited.insert(id) {
                break;
            }
            chain.push(id);
            current = self.types.get(id.index()).and_then(|t| t.declared.base);
        }
        chain
    }

    fn enclosing_type(&self, node: &SyntaxNode) -> Option<TypeId> {
        node.ancestors()
            .skip(1)
            .find(|a| is_type_declaration(a.kind().name()))
            .and_then(|decl| self.declarations.get(&decl.text_range().start()).copied())
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn method_at(&self, call: &SyntaxNode, depth: usize) -> Option<MethodSymbol> {
        if depth > MAX_INFERENCE_DEPTH {
            return None;
        }
        let function = call.child_by_field("function")?;
        let arity = argument_count(call);
        let (owner, name) = match function.kind().name() {
            MEMBER_ACCESS_EXPRESSION => {
                let name = function.child_by_field("name")?.text().to_string();
                let receiver = function.child_by_field("expression")?;
                (self.infer(&receiver, depth + 1)?.declared()?, name)
            }
            IDENTIFIER => (self.enclosing_type(call)?, function.text().to_string()),
            _ => return None,
        };
        let symbol = self.find_method(owner, &name, arity);
        trace!(
            method = %name,
            arity,
            resolved = symbol.is_some(),
            "Resolved call target"
        );
        symbol
    }

    fn infer(&self, expr: &SyntaxNode, depth: usize) -> Option<TypeRef> {
        if depth > MAX_INFERENCE_DEPTH {
            return None;
        }
        match expr.kind().name() {
            IDENTIFIER => {
                let name = expr.text().to_string();
                match self.lookup_variable(expr, &name, depth) {
                    Some(Binding::Typed(ty)) => Some(ty),
                    Some(Binding::Untyped) => None,
                    // Not a variable: maybe a type used as a static receiver.
                    None => self.resolve_at(&name, expr).declared().map(TypeRef::Declared),
                }
            }
            MEMBER_ACCESS_EXPRESSION => {
                let name = expr.child_by_field("name")?.text().to_string();
                let receiver = expr.child_by_field("expression")?;
                if let Some(owner) = self.infer(&receiver, depth + 1).and_then(|t| t.declared()) {
                    if let Some(ty) = self.find_value(owner, &name) {
                        return Some(ty);
                    }
                }
                self.resolve_at(&expr.text().to_string(), expr)
                    .declared()
                    .map(TypeRef::Declared)
            }
            INVOCATION_EXPRESSION => self.method_at(expr, depth + 1).map(|m| m.return_type),
            OBJECT_CREATION_EXPRESSION | CAST_EXPRESSION => {
                let ty = expr.child_by_field("type")?;
                Some(self.resolve_at(&ty.text().to_string(), expr))
            }
            PARENTHESIZED_EXPRESSION => {
                let inner = expr.children().next()?;
                self.infer(&inner, depth + 1)
            }
            _ => match expr.text().to_string().as_str() {
                "this" => self.enclosing_type(expr).map(TypeRef::Declared),
                "base" => {
                    let own = self.enclosing_type(expr)?;
                    self.types.get(own.index())?.declared.base.map(TypeRef::Declared)
                }
                _ => None,
            },
        }
    }

    // ========================================================================
    // Scopes
    // ========================================================================

    /// Find the nearest declaration of `name` visible from `at`.
    fn lookup_variable(&self, at: &SyntaxNode, name: &str, depth: usize) -> Option<Binding> {
        let mut child = at.clone();
        for scope in at.ancestors().skip(1) {
            let found = match scope.kind().name() {
                BLOCK | SWITCH_SECTION | COMPILATION_UNIT => {
                    self.local_before(&scope, child.index(), name, depth)
                }
                USING_STATEMENT | FOR_STATEMENT => scope
                    .children()
                    .filter(|c| c.kind().name() == VARIABLE_DECLARATION)
                    .find_map(|decl| self.declarator_binding(&decl, name, depth)),
                FOREACH_STATEMENT => self.foreach_binding(&scope, name),
                METHOD_DECLARATION | CONSTRUCTOR_DECLARATION | LOCAL_FUNCTION_STATEMENT
                | LAMBDA_EXPRESSION => self.parameter_binding(&scope, name),
                kind if is_type_declaration(kind) => self
                    .parameter_binding(&scope, name)
                    .or_else(|| self.member_binding(&scope, name)),
                _ => None,
            };
            if found.is_some() {
                return found;
            }
            child = scope;
        }
        None
    }

    /// Locals declared by statements of `scope` before child slot `before`.
    fn local_before(
        &self,
        scope: &SyntaxNode,
        before: usize,
        name: &str,
        depth: usize,
    ) -> Option<Binding> {
        let preceding: Vec<SyntaxNode> = scope
            .children()
            .take_while(|statement| statement.index() < before)
            .collect();
        preceding.iter().rev().find_map(|statement| {
            let statement = if statement.kind().name() == GLOBAL_STATEMENT {
                statement.children().next()?
            } else {
                statement.clone()
            };
            if statement.kind().name() != LOCAL_DECLARATION_STATEMENT {
                return None;
            }
            statement
                .children()
                .filter(|c| c.kind().name() == VARIABLE_DECLARATION)
                .find_map(|decl| self.declarator_binding(&decl, name, depth))
        })
    }

    fn declarator_binding(&self, decl: &SyntaxNode, name: &str, depth: usize) -> Option<Binding> {
        let declarator = decl
            .children()
            .filter(|c| c.kind().name() == VARIABLE_DECLARATOR)
            .find(|d| declarator_name(d).as_deref() == Some(name))?;
        let ty = decl
            .child_by_field("type")
            .or_else(|| decl.children().next())?;

        if is_var(&ty) {
            let inferred = declarator_initializer(&declarator)
                .and_then(|init| self.infer(&init, depth + 1));
            return Some(inferred.map_or(Binding::Untyped, Binding::Typed));
        }
        Some(Binding::Typed(self.resolve_at(&ty.text().to_string(), decl)))
    }

    fn foreach_binding(&self, scope: &SyntaxNode, name: &str) -> Option<Binding> {
        let left = scope.child_by_field("left")?;
        if left.text() != name {
            return None;
        }
        match scope.child_by_field("type") {
            Some(ty) if !is_var(&ty) => {
                Some(Binding::Typed(self.resolve_at(&ty.text().to_string(), scope)))
            }
            _ => Some(Binding::Untyped),
        }
    }

    fn parameter_binding(&self, scope: &SyntaxNode, name: &str) -> Option<Binding> {
        let list = scope
            .child_by_field("parameters")
            .or_else(|| scope.children().find(|c| c.kind().name() == PARAMETER_LIST))?;
        // `x => ...` binds a bare identifier.
        if list.kind().name() == IDENTIFIER {
            return (list.text() == name).then_some(Binding::Untyped);
        }
        let parameter = list
            .children()
            .filter(|p| matches!(p.kind().name(), PARAMETER | PARAMETER_ARRAY))
            .find(|p| parameter_name(p).as_deref() == Some(name))?;
        Some(match parameter.child_by_field("type") {
            Some(ty) => Binding::Typed(self.resolve_at(&ty.text().to_string(), &parameter)),
            None => Binding::Untyped,
        })
    }

    fn member_binding(&self, scope: &SyntaxNode, name: &str) -> Option<Binding> {
        let id = self.declarations.get(&scope.text_range().start())?;
        self.find_value(*id, name).map(Binding::Typed)
    }
}

impl Resolver for SemanticModel {
    fn resolve_method(&self, call: &SyntaxNode) -> Option<MethodSymbol> {
        self.method_at(call, 0)
    }

    fn declared_type(&self, id: TypeId) -> Option<&DeclaredType> {
        self.types.get(id.index()).map(|t| &t.declared)
    }
}

impl Imports {
    /// Record a `using` directive from its source text.
    fn add(&mut self, directive: &str) {
        let body = directive.trim().trim_end_matches(';').trim();
        let body = body.strip_prefix("global ").map_or(body, str::trim_start);
        let Some(body) = body.strip_prefix("using") else {
            return;
        };
        let body = body.trim();
        // `using static` imports members, not types.
        if body.starts_with("static ") {
            return;
        }
        match body.split_once('=') {
            Some((alias, target)) => {
                self.aliases
                    .insert(alias.trim().to_string(), normalize_type_text(target));
            }
            None => self.namespaces.push(normalize_type_text(body)),
        }
    }
}

// ============================================================================
// Declaration helpers
// ============================================================================

fn is_type_declaration(kind: &str) -> bool {
    matches!(
        kind,
        CLASS_DECLARATION | STRUCT_DECLARATION | INTERFACE_DECLARATION | RECORD_DECLARATION
    )
}

fn type_kind(kind: &str) -> TypeKind {
    match kind {
        STRUCT_DECLARATION => TypeKind::Struct,
        INTERFACE_DECLARATION => TypeKind::Interface,
        RECORD_DECLARATION => TypeKind::Record,
        _ => TypeKind::Class,
    }
}

fn raw_type_from_declaration(node: &SyntaxNode) -> Option<RawType> {
    let name = node.child_by_field("name")?.text().to_string();
    let base = node
        .children()
        .find(|c| c.kind().name() == BASE_LIST)
        .and_then(|list| list.children().next())
        .and_then(|first| {
            if first.kind().name() == PRIMARY_CONSTRUCTOR_BASE_TYPE {
                first.children().next()
            } else {
                Some(first)
            }
        })
        .map(|ty| ty.text().to_string());

    let mut methods = Vec::new();
    let mut values = Vec::new();

    if node.kind().name() == RECORD_DECLARATION {
        if let Some(list) = node.children().find(|c| c.kind().name() == PARAMETER_LIST) {
            for parameter in list.children().filter(|p| p.kind().name() == PARAMETER) {
                if let (Some(name), Some(ty)) =
                    (parameter_name(&parameter), parameter.child_by_field("type"))
                {
                    values.push((name, ty.text().to_string()));
                }
            }
        }
    }

    let body = node
        .child_by_field("body")
        .or_else(|| node.children().find(|c| c.kind().name() == DECLARATION_LIST));
    let members: Vec<SyntaxNode> = body.map(|b| b.children().collect()).unwrap_or_default();
    for member in members {
        match member.kind().name() {
            METHOD_DECLARATION => {
                if let Some(method) = raw_method(&member) {
                    methods.push(method);
                }
            }
            PROPERTY_DECLARATION => {
                if let (Some(name), Some(ty)) =
                    (member.child_by_field("name"), member.child_by_field("type"))
                {
                    values.push((name.text().to_string(), ty.text().to_string()));
                }
            }
            FIELD_DECLARATION => {
                let declarations = member
                    .children()
                    .filter(|c| c.kind().name() == VARIABLE_DECLARATION);
                for decl in declarations {
                    let Some(ty) = decl.child_by_field("type").or_else(|| decl.children().next())
                    else {
                        continue;
                    };
                    let declarators = decl
                        .children()
                        .filter(|c| c.kind().name() == VARIABLE_DECLARATOR);
                    for declarator in declarators {
                        if let Some(name) = declarator_name(&declarator) {
                            values.push((name, ty.text().to_string()));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    Some(RawType {
        name,
        namespace: namespace_of(node),
        kind: type_kind(node.kind().name()),
        base,
        methods,
        values,
        declaration: Some(node.text_range().start()),
    })
}

fn raw_method(member: &SyntaxNode) -> Option<RawMethod> {
    let name = member.child_by_field("name")?.text().to_string();
    let returns = member
        .child_by_field("returns")
        .or_else(|| member.child_by_field("type"))?
        .text()
        .to_string();
    let (min_arity, max_arity) = member
        .child_by_field("parameters")
        .or_else(|| member.children().find(|c| c.kind().name() == PARAMETER_LIST))
        .map_or((0, 0), |list| parameter_arity(&list));
    Some(RawMethod {
        name,
        returns,
        min_arity,
        max_arity,
    })
}

/// Accepted argument counts for a parameter list.
fn parameter_arity(list: &SyntaxNode) -> (usize, usize) {
    let mut required = 0;
    let mut total = 0;
    let mut variadic = false;
    for parameter in list.children() {
        let kind = parameter.kind().name();
        let params = parameter.text().to_string().trim_start().starts_with("params ");
        if kind == PARAMETER_ARRAY || params {
            variadic = true;
        } else if kind == PARAMETER {
            total += 1;
            let optional = parameter.has_token("=")
                || parameter.children().any(|c| c.kind().name() == EQUALS_VALUE_CLAUSE);
            if !optional {
                required += 1;
            }
        }
    }
    (required, if variadic { usize::MAX } else { total })
}

fn argument_count(call: &SyntaxNode) -> usize {
    call.child_by_field("arguments")
        .or_else(|| call.children().find(|c| c.kind().name() == ARGUMENT_LIST))
        .map_or(0, |list| list.children().filter(|c| c.kind().name() == ARGUMENT).count())
}

fn declarator_name(declarator: &SyntaxNode) -> Option<String> {
    declarator
        .child_by_field("name")
        .or_else(|| declarator.children().find(|c| c.kind().name() == IDENTIFIER))
        .map(|n| n.text().to_string())
}

fn parameter_name(parameter: &SyntaxNode) -> Option<String> {
    parameter
        .child_by_field("name")
        .or_else(|| parameter.children().filter(|c| c.kind().name() == IDENTIFIER).last())
        .map(|n| n.text().to_string())
}

/// The expression after `=` in a declarator, in either grammar shape.
fn declarator_initializer(declarator: &SyntaxNode) -> Option<SyntaxNode> {
    if let Some(clause) = declarator
        .children()
        .find(|c| c.kind().name() == EQUALS_VALUE_CLAUSE)
    {
        return clause.children().next();
    }
    let mut after_equals = false;
    for element in declarator.children_with_tokens() {
        match element {
            NodeOrToken::Token(token) if token.text() == "=" => after_equals = true,
            NodeOrToken::Node(node) if after_equals => return Some(node),
            _ => {}
        }
    }
    None
}

fn is_var(ty: &SyntaxNode) -> bool {
    ty.text() == "var"
}

/// Enclosing namespace path of `node`, outermost first.
fn namespace_of(node: &SyntaxNode) -> Vec<String> {
    let start = node.text_range().start();
    let mut names = Vec::new();
    let mut saw_file_scoped = false;
    for ancestor in node.ancestors().skip(1) {
        match ancestor.kind().name() {
            NAMESPACE_DECLARATION | FILE_SCOPED_NAMESPACE_DECLARATION => {
                saw_file_scoped |= ancestor.kind().name() == FILE_SCOPED_NAMESPACE_DECLARATION;
                if let Some(name) = ancestor.child_by_field("name") {
                    names.push(name.text().to_string());
                }
            }
            // A file-scoped namespace may precede its members as a sibling.
            COMPILATION_UNIT if !saw_file_scoped => {
                if let Some(name) = ancestor
                    .children()
                    .find(|c| {
                        c.kind().name() == FILE_SCOPED_NAMESPACE_DECLARATION
                            && c.text_range().start() <= start
                    })
                    .and_then(|ns| ns.child_by_field("name"))
                {
                    names.push(name.text().to_string());
                }
            }
            _ => {}
        }
    }
    names
        .iter()
        .rev()
        .flat_map(|name| normalize_type_text(name).split('.').map(str::to_string).collect::<Vec<_>>())
        .filter(|segment| !segment.is_empty())
        .collect()
}

fn qualify(namespace: &[String], name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{name}", namespace.join("."))
    }
}

/// Strip whitespace, `global::` and nullable markers from type text.
fn normalize_type_text(text: &str) -> String {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let compact = compact.strip_prefix("global::").unwrap_or(&compact);
    compact.trim_end_matches('?').to_string()
}
