//! Types of value symbols, signature return types, type-parameter
//! constraints and class/interface heritage.
//!
//! Every lazily computed fact is stored on the symbol it belongs to and
//! guarded by the symbol's `ResolutionState`; re-entering a symbol that is
//! still `Resolving` is a circular definition and yields `any`.

use pullc_binder::{DeclId, DeclKind, ResolutionState, SignatureKind, SymbolId, SymbolKind, UnitId};
use pullc_solver::{ParamInfo, SignatureInfo, TypeClass, TypeResolver, best_common_type, widen};
use pullc_syntax::{NodeArena, NodeData, NodeIndex, SyntaxKind};
use tracing::trace;

use super::PullTypeResolver;

/// Type annotation of a declaration node, if it has one.
pub(crate) fn annotation_of(arena: &NodeArena, node: NodeIndex) -> NodeIndex {
    let Some(n) = arena.get(node) else {
        return NodeIndex::NONE;
    };
    match &n.data {
        NodeData::VariableDeclaration(d) => d.type_annotation,
        NodeData::Parameter(p) => p.type_annotation,
        NodeData::Property(p) => p.type_annotation,
        NodeData::Function(f) => f.type_annotation,
        _ => NodeIndex::NONE,
    }
}

/// Initializer expression of a declaration node, if it has one.
pub(crate) fn initializer_of(arena: &NodeArena, node: NodeIndex) -> NodeIndex {
    let Some(n) = arena.get(node) else {
        return NodeIndex::NONE;
    };
    match &n.data {
        NodeData::VariableDeclaration(d) => d.initializer,
        NodeData::Parameter(p) => p.initializer,
        NodeData::Property(p) => p.initializer,
        NodeData::PropertyAssignment(p) => p.initializer,
        NodeData::EnumMember(m) => m.initializer,
        _ => NodeIndex::NONE,
    }
}

/// Expressions of the `return` statements of a body, not descending into
/// nested functions. Returns whether any `return` was found.
pub(crate) fn collect_return_expressions(arena: &NodeArena, node: NodeIndex, out: &mut Vec<NodeIndex>) -> bool {
    let Some(n) = arena.get(node) else {
        return false;
    };
    let statements = |list: &pullc_syntax::NodeList, out: &mut Vec<NodeIndex>| {
        list.iter().fold(false, |found, s| collect_return_expressions(arena, s, out) | found)
    };
    match &n.data {
        NodeData::Wrapped(w) if n.kind == SyntaxKind::ReturnStatement => {
            if w.expression.is_some() {
                out.push(w.expression);
            }
            true
        }
        NodeData::Block(b) => statements(&b.statements, out),
        NodeData::If(s) => {
            let a = collect_return_expressions(arena, s.then_statement, out);
            collect_return_expressions(arena, s.else_statement, out) | a
        }
        NodeData::Loop(s) => collect_return_expressions(arena, s.statement, out),
        NodeData::ForIn(s) => collect_return_expressions(arena, s.statement, out),
        NodeData::Labeled(s) => collect_return_expressions(arena, s.statement, out),
        NodeData::With(s) => collect_return_expressions(arena, s.statement, out),
        NodeData::Switch(s) => s
            .clauses
            .iter()
            .fold(false, |found, c| collect_return_expressions(arena, c, out) | found),
        NodeData::CaseClause(c) => statements(&c.statements, out),
        NodeData::Try(t) => {
            let a = collect_return_expressions(arena, t.try_block, out);
            let b = collect_return_expressions(arena, t.catch_clause, out);
            collect_return_expressions(arena, t.finally_block, out) | a | b
        }
        NodeData::CatchClause(c) => collect_return_expressions(arena, c.block, out),
        _ => false,
    }
}

impl PullTypeResolver<'_> {
    // =========================================================================
    // Value symbols
    // =========================================================================

    /// Type of a symbol: the declared or inferred type of a value symbol,
    /// the symbol itself for a type.
    pub fn type_of_symbol(&mut self, symbol: SymbolId) -> SymbolId {
        let Some(sym) = self.symbol(symbol) else {
            return self.primitives.error;
        };
        match &sym.kind {
            SymbolKind::Function | SymbolKind::Method { .. } => {
                return if sym.type_id.is_some() { sym.type_id } else { self.primitives.any };
            }
            SymbolKind::Alias { .. } => {
                let target = self.resolve_alias(symbol);
                return if target.is_some() {
                    self.type_of_symbol(target)
                } else {
                    self.primitives.error
                };
            }
            SymbolKind::Signature(_) => return self.primitives.any,
            kind if kind.is_type() => return symbol,
            _ => {}
        }
        match sym.resolution {
            ResolutionState::Resolved if sym.type_id.is_some() => return sym.type_id,
            ResolutionState::Resolving => {
                trace!(symbol = symbol.0, name = %sym.name, "circular symbol type");
                return self.primitives.any;
            }
            ResolutionState::Error => return self.primitives.error,
            _ => {}
        }
        let kind = sym.kind.clone();
        let decl = sym.first_declaration();
        let container = sym.container;

        self.set_resolution(symbol, ResolutionState::Resolving);
        let ty = match kind {
            SymbolKind::Variable => self.variable_type(decl),
            SymbolKind::Parameter { rest, .. } => self.parameter_type(decl, rest),
            SymbolKind::Property { .. } => self.property_type(decl),
            SymbolKind::EnumMember => container,
            SymbolKind::Accessor { getter, setter } => self.accessor_type(getter, setter),
            _ => self.primitives.any,
        };
        let ty = if ty.is_none() { self.primitives.any } else { ty };
        if let Some(sym) = self.chain.symbols.get_mut(symbol) {
            // A contextual assignment made while resolving wins.
            if sym.resolution == ResolutionState::Resolving {
                sym.type_id = ty;
                sym.resolution = ResolutionState::Resolved;
            }
            return sym.type_id;
        }
        ty
    }

    /// Record a type for a value symbol computed elsewhere (contextual
    /// typing, object literal members).
    pub(crate) fn assign_symbol_type(&mut self, symbol: SymbolId, ty: SymbolId) {
        if let Some(sym) = self.chain.symbols.get_mut(symbol) {
            sym.type_id = ty;
            sym.resolution = ResolutionState::Resolved;
        }
    }

    pub(crate) fn is_symbol_resolved(&self, symbol: SymbolId) -> bool {
        self.symbol(symbol)
            .is_some_and(|s| s.resolution == ResolutionState::Resolved && s.type_id.is_some())
    }

    /// Type of a symbol used as a value expression: a class's constructor
    /// type, a module's or enum's instance type. `NONE` when the symbol has
    /// no value side.
    pub fn value_type_of(&mut self, symbol: SymbolId) -> SymbolId {
        let Some(sym) = self.symbol(symbol) else {
            return SymbolId::NONE;
        };
        match &sym.kind {
            SymbolKind::Class(shape) | SymbolKind::Enum(shape) | SymbolKind::Container(shape) => shape.associated,
            SymbolKind::FunctionType(_) | SymbolKind::ConstructorType(_) | SymbolKind::ObjectType(_) => symbol,
            SymbolKind::Alias { .. } => {
                let target = self.resolve_alias(symbol);
                if target.is_some() { self.value_type_of(target) } else { self.primitives.error }
            }
            SymbolKind::Signature(_) => SymbolId::NONE,
            kind if kind.is_type() => SymbolId::NONE,
            _ => self.type_of_symbol(symbol),
        }
    }

    fn decl_site(&self, decl: DeclId) -> Option<(UnitId, NodeIndex)> {
        self.decl(decl).map(|d| (d.unit, d.node))
    }

    fn variable_type(&mut self, decl: DeclId) -> SymbolId {
        let Some((unit, node)) = self.decl_site(decl) else {
            return self.primitives.any;
        };
        let Some(arena) = self.arena(unit) else {
            return self.primitives.any;
        };
        // The catch clause variable.
        if arena.kind(node) == Some(SyntaxKind::Identifier) {
            return self.primitives.any;
        }
        let annotation = annotation_of(&arena, node);
        if annotation.is_some() {
            return self.resolve_type_node(unit, annotation);
        }
        let initializer = initializer_of(&arena, node);
        if initializer.is_some() {
            let ty = self.resolve_expression(unit, initializer, None);
            return widen(self, ty);
        }
        self.primitives.any
    }

    fn parameter_type(&mut self, decl: DeclId, rest: bool) -> SymbolId {
        let Some((unit, node)) = self.decl_site(decl) else {
            return self.primitives.any;
        };
        let Some(arena) = self.arena(unit) else {
            return self.primitives.any;
        };
        let annotation = annotation_of(&arena, node);
        if annotation.is_some() {
            return self.resolve_type_node(unit, annotation);
        }
        let initializer = initializer_of(&arena, node);
        if initializer.is_some() {
            let ty = self.resolve_expression(unit, initializer, None);
            return widen(self, ty);
        }
        if rest {
            return self.chain.array_type(self.primitives.any);
        }
        self.primitives.any
    }

    fn property_type(&mut self, decl: DeclId) -> SymbolId {
        let Some((unit, node)) = self.decl_site(decl) else {
            return self.primitives.any;
        };
        let Some(arena) = self.arena(unit) else {
            return self.primitives.any;
        };
        if arena.kind(node) == Some(SyntaxKind::Parameter) {
            let rest = self.decl(decl).is_some_and(|d| d.flags.contains(pullc_binder::DeclFlags::REST));
            return self.parameter_type(decl, rest);
        }
        let annotation = annotation_of(&arena, node);
        if annotation.is_some() {
            return self.resolve_type_node(unit, annotation);
        }
        let initializer = initializer_of(&arena, node);
        if initializer.is_some() {
            let ty = self.resolve_expression(unit, initializer, None);
            return widen(self, ty);
        }
        self.primitives.any
    }

    /// Getter annotation, then setter parameter annotation, then the
    /// getter's inferred return type.
    fn accessor_type(&mut self, getter: SymbolId, setter: SymbolId) -> SymbolId {
        let getter_sig = self.first_call_signature(getter);
        let setter_sig = self.first_call_signature(setter);
        if getter_sig.is_some() && self.signature_has_annotation(getter_sig) {
            return self.return_type_of(getter_sig);
        }
        if setter_sig.is_some() {
            let param = self
                .chain
                .symbols
                .signature(setter_sig)
                .and_then(|s| s.parameters.first().copied())
                .unwrap_or(SymbolId::NONE);
            let annotated = self
                .symbol(param)
                .map(|p| p.first_declaration())
                .and_then(|d| self.decl_site(d))
                .and_then(|(unit, node)| self.arena(unit).map(|a| annotation_of(&a, node)))
                .is_some_and(|a| a.is_some());
            if annotated {
                return self.type_of_symbol(param);
            }
        }
        if getter_sig.is_some() {
            return self.return_type_of(getter_sig);
        }
        self.primitives.any
    }

    pub(crate) fn first_call_signature(&self, function_type: SymbolId) -> SymbolId {
        self.chain
            .symbols
            .shape(function_type)
            .and_then(|s| s.call_signatures.first().copied())
            .unwrap_or(SymbolId::NONE)
    }

    /// Whether the declaration of `signature` has a return type annotation.
    pub fn signature_has_annotation(&self, signature: SymbolId) -> bool {
        let Some(decl) = self.symbol(signature).map(|s| s.first_declaration()) else {
            return false;
        };
        let Some((unit, node)) = self.decl_site(decl) else {
            return false;
        };
        match self.decl_kind(decl) {
            Some(DeclKind::Class) => false,
            _ => self.arena(unit).is_some_and(|a| annotation_of(&a, node).is_some()),
        }
    }

    // =========================================================================
    // Signatures
    // =========================================================================

    /// Declared or inferred return type of a signature.
    pub fn return_type_of(&mut self, signature: SymbolId) -> SymbolId {
        let Some(sym) = self.symbol(signature) else {
            return self.primitives.error;
        };
        let Some(data) = sym.signature() else {
            return self.primitives.error;
        };
        if data.return_type.is_some() {
            return data.return_type;
        }
        match sym.resolution {
            ResolutionState::Resolving => return self.primitives.any,
            ResolutionState::Error => return self.primitives.error,
            _ => {}
        }
        let decl = sym.first_declaration();
        self.set_resolution(signature, ResolutionState::Resolving);
        let ty = self.compute_return_type(signature, decl);
        let ty = if ty.is_none() { self.primitives.any } else { ty };
        if let Some(sym) = self.chain.symbols.get_mut(signature) {
            if let Some(data) = sym.signature_mut() {
                data.return_type = ty;
            }
            sym.resolution = ResolutionState::Resolved;
        }
        ty
    }

    fn compute_return_type(&mut self, signature: SymbolId, decl: DeclId) -> SymbolId {
        let Some(d) = self.decl(decl) else {
            return self.primitives.any;
        };
        let (kind, unit, node, parent) = (d.kind, d.unit, d.node, d.parent);
        match kind {
            // The synthesized default constructor is declared by its class.
            DeclKind::Class => return d.symbol,
            DeclKind::Constructor => return self.chain.decls.symbol(parent),
            DeclKind::SetAccessor => return self.primitives.void,
            _ => {}
        }
        let Some(arena) = self.arena(unit) else {
            return self.primitives.any;
        };
        let annotation = annotation_of(&arena, node);
        if annotation.is_some() {
            return self.resolve_type_node(unit, annotation);
        }
        let body = arena
            .get(node)
            .and_then(|n| arena.get_function(n))
            .map_or(NodeIndex::NONE, |f| f.body);
        if body.is_none() {
            return self.primitives.any;
        }
        let contextual = self.contextual_returns.get(&signature).copied();
        if arena.kind(body) != Some(SyntaxKind::Block) {
            let ty = self.resolve_expression(unit, body, contextual);
            return widen(self, ty);
        }
        let mut expressions = Vec::new();
        collect_return_expressions(&arena, body, &mut expressions);
        if expressions.is_empty() {
            return self.primitives.void;
        }
        let mut candidates = Vec::with_capacity(expressions.len());
        for expression in expressions {
            let ty = self.resolve_expression(unit, expression, contextual);
            candidates.push(widen(self, ty));
        }
        best_common_type(self, &candidates).unwrap_or(self.primitives.empty_object)
    }

    /// Resolved view of a signature symbol for the solver.
    pub fn signature_info(&mut self, signature: SymbolId) -> Option<SignatureInfo> {
        let data = self.chain.symbols.signature(signature)?.clone();
        let mut parameters = Vec::with_capacity(data.parameters.len());
        let mut rest_element = None;
        for &param in &data.parameters {
            let (name, optional, rest) = match self.symbol(param) {
                Some(p) => match p.kind {
                    SymbolKind::Parameter { optional, rest } => (p.name.clone(), optional, rest),
                    _ => (p.name.clone(), false, false),
                },
                None => continue,
            };
            let type_id = self.type_of_symbol(param);
            if rest {
                rest_element = Some(match self.classify(type_id) {
                    TypeClass::Array(element) => element,
                    _ => self.primitives.any,
                });
            }
            parameters.push(ParamInfo {
                name,
                type_id,
                optional,
                rest,
            });
        }
        let return_type = self.return_type_of(signature);
        Some(SignatureInfo {
            symbol: signature,
            kind: data.kind,
            type_parameters: data.type_parameters,
            parameters,
            return_type,
            rest_element,
            is_definition: data.is_definition,
        })
    }

    /// Live signatures of `kind` declared directly on a shaped symbol.
    pub(crate) fn own_signatures(&self, ty: SymbolId, kind: SignatureKind) -> Vec<SymbolId> {
        let Some(shape) = self.chain.symbols.shape(ty) else {
            return Vec::new();
        };
        let list = match kind {
            SignatureKind::Call => &shape.call_signatures,
            SignatureKind::Construct => &shape.construct_signatures,
            SignatureKind::Index => &shape.index_signatures,
        };
        list.iter().copied().filter(|&s| self.chain.is_live(s)).collect()
    }

    // =========================================================================
    // Type parameters
    // =========================================================================

    /// Constraint of a type parameter, `NONE` when unconstrained.
    pub fn constraint_of(&mut self, type_parameter: SymbolId) -> SymbolId {
        let Some(sym) = self.symbol(type_parameter) else {
            return SymbolId::NONE;
        };
        let SymbolKind::TypeParameter { constraint } = sym.kind else {
            return SymbolId::NONE;
        };
        if constraint.is_some() {
            return constraint;
        }
        match sym.resolution {
            ResolutionState::Resolved | ResolutionState::Resolving | ResolutionState::Error => {
                return SymbolId::NONE;
            }
            ResolutionState::Unresolved => {}
        }
        let decl = sym.first_declaration();
        self.set_resolution(type_parameter, ResolutionState::Resolving);
        let node = self.decl_site(decl).and_then(|(unit, node)| {
            let arena = self.arena(unit)?;
            let n = arena.get(node)?;
            arena.get_type_parameter(n).map(|tp| (unit, tp.constraint))
        });
        let resolved = match node {
            Some((unit, constraint)) if constraint.is_some() => self.resolve_type_node(unit, constraint),
            _ => SymbolId::NONE,
        };
        if let Some(sym) = self.chain.symbols.get_mut(type_parameter) {
            if let SymbolKind::TypeParameter { constraint } = &mut sym.kind {
                *constraint = resolved;
            }
            sym.resolution = ResolutionState::Resolved;
        }
        resolved
    }

    // =========================================================================
    // Heritage
    // =========================================================================

    /// Resolve the `extends` and `implements` clauses of a class or
    /// interface into its shape, once per invalidation.
    pub fn resolve_heritage(&mut self, ty: SymbolId) {
        let Some(sym) = self.symbol(ty) else {
            return;
        };
        if !matches!(sym.kind, SymbolKind::Class(_) | SymbolKind::Interface(_)) {
            return;
        }
        if sym.shape().is_some_and(|s| s.heritage_resolved) {
            return;
        }
        let declarations: Vec<DeclId> = sym.declarations.iter().copied().collect();
        if let Some(shape) = self.chain.symbols.shape_mut(ty) {
            shape.heritage_resolved = true;
        }

        let mut extends = Vec::new();
        let mut implements = Vec::new();
        for decl in declarations {
            let Some((kind, unit, node)) = self.decl(decl).map(|d| (d.kind, d.unit, d.node)) else {
                continue;
            };
            let Some(arena) = self.arena(unit) else {
                continue;
            };
            let Some(n) = arena.get(node) else {
                continue;
            };
            let (extends_nodes, implements_nodes): (Vec<NodeIndex>, Vec<NodeIndex>) = match (kind, &n.data) {
                (DeclKind::Class, NodeData::Class(c)) => (
                    if c.extends.is_some() { vec![c.extends] } else { Vec::new() },
                    c.implements.iter().collect(),
                ),
                (DeclKind::Interface, NodeData::Interface(i)) => (i.extends.iter().collect(), Vec::new()),
                _ => continue,
            };
            for base in extends_nodes {
                let resolved = self.resolve_type_node(unit, base);
                if resolved != self.primitives.error && !extends.contains(&resolved) {
                    extends.push(resolved);
                }
            }
            for base in implements_nodes {
                let resolved = self.resolve_type_node(unit, base);
                if resolved != self.primitives.error && !implements.contains(&resolved) {
                    implements.push(resolved);
                }
            }
        }
        trace!(ty = ty.0, extends = extends.len(), implements = implements.len(), "heritage resolved");
        if let Some(shape) = self.chain.symbols.shape_mut(ty) {
            shape.extends = extends;
            shape.implements = implements;
        }
    }

    /// Resolved `extends` targets of a class or interface.
    pub fn base_types(&mut self, ty: SymbolId) -> Vec<SymbolId> {
        self.resolve_heritage(ty);
        self.chain.symbols.shape(ty).map(|s| s.extends.clone()).unwrap_or_default()
    }

    /// Resolved `implements` targets of a class.
    pub fn implemented_types(&mut self, ty: SymbolId) -> Vec<SymbolId> {
        self.resolve_heritage(ty);
        self.chain.symbols.shape(ty).map(|s| s.implements.clone()).unwrap_or_default()
    }

    /// The declaration symbol behind a possibly instantiated type.
    pub fn generic_target(&self, ty: SymbolId) -> SymbolId {
        match self.symbol(ty).map(|s| &s.kind) {
            Some(SymbolKind::Instantiation { target, .. }) => *target,
            _ => ty,
        }
    }

    /// Bases usable for member inheritance: classes for a class, classes
    /// and interfaces for an interface.
    pub(crate) fn inheritable_bases(&mut self, ty: SymbolId) -> Vec<SymbolId> {
        let is_class = self.is_kind(ty, |k| matches!(k, SymbolKind::Class(_)));
        let bases = self.base_types(ty);
        bases
            .into_iter()
            .filter(|&base| {
                let target = self.generic_target(base);
                self.is_kind(target, |k| match k {
                    SymbolKind::Class(_) => true,
                    SymbolKind::Interface(_) => !is_class,
                    _ => false,
                })
            })
            .collect()
    }
}
