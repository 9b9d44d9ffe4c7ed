//! Privacy of exported declarations.
//!
//! A declaration visible outside its module may not mention, in its type,
//! a type that is not: a non-exported type of a module, or an exported
//! type reached only through a non-exported nested module.

use pullc_binder::{DeclId, DeclKind, SymbolId, SymbolKind};
use pullc_common::diagnostics::diagnostic_codes;
use pullc_syntax::NodeIndex;
use rustc_hash::FxHashSet;

use crate::state::CheckerState;

/// Why a type cannot be named outside its module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Inaccessible {
    PrivateName { name: String },
    PrivateModule { name: String, module: String },
}

/// Where an inaccessible type was found, selecting the diagnostic.
#[derive(Clone, Copy)]
enum Usage<'a> {
    Variable(&'a str),
    PublicProperty(&'a str),
    InterfaceProperty(&'a str),
    FunctionParameter(&'a str),
    MethodParameter(&'a str),
    FunctionReturn,
    MethodReturn,
}

impl CheckerState<'_> {
    // =========================================================================
    // Declarations
    // =========================================================================

    pub(crate) fn check_variable_privacy(&mut self, decl: DeclId, ty: SymbolId) {
        if !self.is_externally_visible(decl) {
            return;
        }
        let name = self.decl_name(decl);
        self.report_inaccessible(decl, ty, Usage::Variable(&name));
    }

    pub(crate) fn check_property_privacy(&mut self, decl: DeclId, ty: SymbolId) {
        let parent = self.resolver.chain().decls.parent(decl);
        let name = self.decl_name(decl);
        match self.resolver.decl_kind(parent) {
            Some(DeclKind::Class) => {
                let private = self.resolver.decl(decl).is_some_and(|d| d.is_private());
                if !private && self.is_externally_visible(parent) {
                    self.report_inaccessible(decl, ty, Usage::PublicProperty(&name));
                }
            }
            Some(DeclKind::Interface) if self.is_externally_visible(parent) => {
                self.report_inaccessible(decl, ty, Usage::InterfaceProperty(&name));
            }
            _ => {}
        }
    }

    /// Parameter and return types of an exported function or a public
    /// method of an exported class.
    pub(crate) fn check_signature_privacy(&mut self, decl: DeclId) {
        let Some((kind, parent, signature, private)) = self
            .resolver
            .decl(decl)
            .map(|d| (d.kind, d.parent, d.signature_symbol, d.is_private()))
        else {
            return;
        };
        let is_method = match kind {
            DeclKind::Function if self.is_externally_visible(decl) => false,
            DeclKind::Method
                if !private
                    && self.resolver.decl_kind(parent) == Some(DeclKind::Class)
                    && self.is_externally_visible(parent) =>
            {
                true
            }
            _ => return,
        };
        let parameters = self
            .resolver
            .chain()
            .symbols
            .signature(signature)
            .map(|s| s.parameters.clone())
            .unwrap_or_default();
        for parameter in parameters {
            let Some(site) = self.resolver.symbol(parameter).map(|p| p.first_declaration()) else {
                continue;
            };
            let name = self.symbol_name(parameter);
            let ty = self.resolver.type_of_symbol(parameter);
            let usage = if is_method { Usage::MethodParameter(&name) } else { Usage::FunctionParameter(&name) };
            self.report_inaccessible(site, ty, usage);
        }
        let return_type = self.resolver.return_type_of(signature);
        let usage = if is_method { Usage::MethodReturn } else { Usage::FunctionReturn };
        self.report_inaccessible(decl, return_type, usage);
    }

    /// Heritage clauses of an exported class or interface.
    pub(crate) fn check_heritage_privacy(&mut self, decl: DeclId, class_extends: NodeIndex, list: &[NodeIndex]) {
        if !self.is_externally_visible(decl) {
            return;
        }
        let is_interface = self.resolver.decl_kind(decl) == Some(DeclKind::Interface);
        let name = self.decl_name(decl);
        let (list_code, extends_code) = if is_interface {
            (
                diagnostic_codes::EXTENDS_CLAUSE_OF_INTERFACE_USES_PRIVATE_NAME,
                diagnostic_codes::EXTENDS_CLAUSE_OF_INTERFACE_USES_PRIVATE_NAME,
            )
        } else {
            (
                diagnostic_codes::IMPLEMENTS_CLAUSE_USES_PRIVATE_NAME,
                diagnostic_codes::EXTENDS_CLAUSE_OF_CLASS_USES_PRIVATE_NAME,
            )
        };
        let clauses = std::iter::once((class_extends, extends_code)).chain(list.iter().map(|&n| (n, list_code)));
        for (node, code) in clauses.collect::<Vec<_>>() {
            if node.is_none() {
                continue;
            }
            let unit = self.unit;
            let Some(ty) = self.resolver.resolved_type_node(unit, node) else {
                continue;
            };
            let mut visited = FxHashSet::default();
            let type_name = match self.find_inaccessible(ty, decl, &mut visited) {
                Some(Inaccessible::PrivateName { name }) => name,
                Some(Inaccessible::PrivateModule { name, .. }) => name,
                None => continue,
            };
            self.error_at_node(node, code, &[&name, &type_name]);
        }
    }

    fn report_inaccessible(&mut self, site: DeclId, ty: SymbolId, usage: Usage<'_>) {
        let mut visited = FxHashSet::default();
        let Some(found) = self.find_inaccessible(ty, site, &mut visited) else {
            return;
        };
        use diagnostic_codes as codes;
        match (usage, found) {
            (Usage::Variable(var), Inaccessible::PrivateName { name }) => {
                self.error_at_decl(site, codes::EXPORTED_VARIABLE_USES_PRIVATE_NAME, &[var, &name]);
            }
            (Usage::Variable(var), Inaccessible::PrivateModule { name, module }) => {
                self.error_at_decl(site, codes::EXPORTED_VARIABLE_USES_PRIVATE_MODULE, &[var, &name, &module]);
            }
            (Usage::PublicProperty(property), found) => {
                let name = found.type_name();
                self.error_at_decl(site, codes::PUBLIC_PROPERTY_USES_PRIVATE_NAME, &[property, &name]);
            }
            (Usage::InterfaceProperty(property), found) => {
                let name = found.type_name();
                self.error_at_decl(site, codes::INTERFACE_PROPERTY_USES_PRIVATE_NAME, &[property, &name]);
            }
            (Usage::FunctionParameter(parameter), Inaccessible::PrivateName { name }) => {
                self.error_at_decl(site, codes::PARAMETER_USES_PRIVATE_NAME, &[parameter, &name]);
            }
            (Usage::FunctionParameter(parameter), Inaccessible::PrivateModule { name, module }) => {
                self.error_at_decl(site, codes::PARAMETER_USES_PRIVATE_MODULE, &[parameter, &name, &module]);
            }
            (Usage::MethodParameter(parameter), found) => {
                let name = found.type_name();
                self.error_at_decl(site, codes::PUBLIC_METHOD_PARAMETER_USES_PRIVATE_NAME, &[parameter, &name]);
            }
            (Usage::FunctionReturn, Inaccessible::PrivateName { name }) => {
                self.error_at_decl(site, codes::RETURN_TYPE_USES_PRIVATE_NAME, &[&name]);
            }
            (Usage::FunctionReturn, Inaccessible::PrivateModule { name, module }) => {
                self.error_at_decl(site, codes::RETURN_TYPE_USES_PRIVATE_MODULE, &[&name, &module]);
            }
            (Usage::MethodReturn, found) => {
                let name = found.type_name();
                self.error_at_decl(site, codes::PUBLIC_METHOD_RETURN_TYPE_USES_PRIVATE_NAME, &[&name]);
            }
        }
    }

    // =========================================================================
    // Visibility
    // =========================================================================

    /// Exported from a module body.
    fn is_externally_visible(&self, decl: DeclId) -> bool {
        let Some(d) = self.resolver.decl(decl) else {
            return false;
        };
        d.is_exported() && self.resolver.decl_kind(d.parent) == Some(DeclKind::Container)
    }

    /// First type inside `ty` that `user` cannot expose. Named types end the
    /// walk; anonymous object and function types are searched structurally.
    pub(crate) fn find_inaccessible(
        &mut self,
        ty: SymbolId,
        user: DeclId,
        visited: &mut FxHashSet<SymbolId>,
    ) -> Option<Inaccessible> {
        if ty.is_none() || !visited.insert(ty) {
            return None;
        }
        enum Step {
            Named(SymbolId),
            Nested(Vec<SymbolId>),
            Structural,
            Done,
        }
        let step = match self.resolver.symbol(ty).map(|s| &s.kind) {
            Some(SymbolKind::Array { element }) => Step::Nested(vec![*element]),
            Some(SymbolKind::Instantiation { target, mapping }) => {
                let mut nested = vec![*target];
                nested.extend(mapping.iter().map(|&(_, argument)| argument));
                Step::Nested(nested)
            }
            Some(SymbolKind::Class(_) | SymbolKind::Interface(_) | SymbolKind::Enum(_) | SymbolKind::Container(_)) => {
                Step::Named(ty)
            }
            Some(SymbolKind::ContainerInstance { container }) => Step::Named(*container),
            Some(SymbolKind::ConstructorType(shape)) if shape.associated.is_some() => Step::Named(shape.associated),
            Some(SymbolKind::ObjectType(_) | SymbolKind::FunctionType(_) | SymbolKind::ConstructorType(_)) => {
                Step::Structural
            }
            _ => Step::Done,
        };
        match step {
            Step::Named(named) => self.named_type_access(named, user),
            Step::Nested(nested) => nested.into_iter().find_map(|t| self.find_inaccessible(t, user, visited)),
            Step::Structural => self.structural_inaccessible(ty, user, visited),
            Step::Done => None,
        }
    }

    fn structural_inaccessible(
        &mut self,
        ty: SymbolId,
        user: DeclId,
        visited: &mut FxHashSet<SymbolId>,
    ) -> Option<Inaccessible> {
        let (members, signatures) = {
            let shape = self.resolver.chain().symbols.shape(ty)?;
            let members: Vec<SymbolId> = shape.members.values.values().copied().collect();
            let signatures: Vec<SymbolId> = shape
                .call_signatures
                .iter()
                .chain(&shape.construct_signatures)
                .chain(&shape.index_signatures)
                .copied()
                .collect();
            (members, signatures)
        };
        for member in members {
            let member_type = self.resolver.value_type_of(member);
            if let Some(found) = self.find_inaccessible(member_type, user, visited) {
                return Some(found);
            }
        }
        for signature in signatures {
            let Some(info) = self.resolver.signature_info(signature) else {
                continue;
            };
            let types = info.parameters.iter().map(|p| p.type_id).chain([info.return_type]);
            for t in types.collect::<Vec<_>>() {
                if let Some(found) = self.find_inaccessible(t, user, visited) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn named_type_access(&self, named: SymbolId, user: DeclId) -> Option<Inaccessible> {
        let sym = self.resolver.symbol(named)?;
        let decls = &self.resolver.chain().decls;
        let declaration = decls.get(sym.first_declaration())?;
        let mut container = declaration.parent;
        if decls.kind(container) != Some(DeclKind::Container) {
            return None;
        }
        if !declaration.is_exported() {
            return Some(Inaccessible::PrivateName { name: sym.name.clone() });
        }
        while let Some(module) = decls.get(container).filter(|d| d.kind == DeclKind::Container) {
            let nested = decls.kind(module.parent) == Some(DeclKind::Container);
            let encloses_user = decls.find_ancestor(user, |d| d.id == container).is_some();
            if nested && !module.is_exported() && !encloses_user {
                return Some(Inaccessible::PrivateModule {
                    name: sym.name.clone(),
                    module: module.name.clone(),
                });
            }
            container = module.parent;
        }
        None
    }
}

impl Inaccessible {
    fn type_name(&self) -> String {
        match self {
            Inaccessible::PrivateName { name } | Inaccessible::PrivateModule { name, .. } => name.clone(),
        }
    }
}
