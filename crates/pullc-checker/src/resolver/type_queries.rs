//! `TypeResolver` over the symbol graph: apparent members, signatures and
//! index types of every type symbol, plus specialization of generics.

use pullc_binder::{DeclKind, Primitives, PrimitiveKind, SignatureKind, SymbolId, SymbolKind};
use pullc_solver::{
    MemberKind, PropertyInfo, SignatureInfo, TypeClass, TypeResolver, TypeSubstitution, instantiate_signature,
    instantiate_type, type_to_string,
};
use rustc_hash::FxHashSet;

use super::{PullTypeResolver, Walk};

impl PullTypeResolver<'_> {
    /// Resolved view of one member symbol.
    fn member_info(&mut self, member: SymbolId) -> Option<PropertyInfo> {
        let sym = self.symbol(member)?;
        let (optional, kind) = match sym.kind {
            SymbolKind::Property { optional } => (optional, MemberKind::Property),
            SymbolKind::Method { optional } => (optional, MemberKind::Method),
            SymbolKind::Function => (false, MemberKind::Method),
            SymbolKind::Accessor { .. } => (false, MemberKind::Accessor),
            _ => (false, MemberKind::Property),
        };
        let name = sym.name.clone();
        let private = sym.is_private();
        let type_id = self.value_type_of(member);
        if type_id.is_none() {
            return None;
        }
        Some(PropertyInfo {
            name,
            type_id,
            optional,
            private,
            origin: member,
            kind,
        })
    }

    /// Live value members of a shaped symbol's member table.
    fn value_members(&self, owner: SymbolId) -> Vec<SymbolId> {
        self.chain
            .symbols
            .shape(owner)
            .map(|s| s.members.values.values().copied().filter(|&m| self.chain.is_live(m)).collect())
            .unwrap_or_default()
    }

    fn push_members(&mut self, members: Vec<SymbolId>, out: &mut Vec<PropertyInfo>) {
        for member in members {
            let name = self.chain.symbols.name(member);
            if out.iter().any(|p| p.name == name) {
                continue;
            }
            if let Some(info) = self.member_info(member) {
                out.push(info);
            }
        }
    }

    fn push_inherited(&mut self, inherited: Vec<PropertyInfo>, out: &mut Vec<PropertyInfo>) {
        for info in inherited {
            if !out.iter().any(|p| p.name == info.name) {
                out.push(info);
            }
        }
    }

    /// The module merged into a class, function or enum, if any.
    fn merged_module(&self, symbol: SymbolId) -> SymbolId {
        let Some(sym) = self.symbol(symbol) else {
            return SymbolId::NONE;
        };
        match self.symbol(sym.merged).map(|m| &m.kind) {
            Some(SymbolKind::Container(_)) if sym.merged != symbol => sym.merged,
            _ => SymbolId::NONE,
        }
    }

    fn collect_properties(&mut self, ty: SymbolId) -> Vec<PropertyInfo> {
        let Some(sym) = self.symbol(ty) else {
            return Vec::new();
        };
        let kind = Header::of(&sym.kind);
        let container = sym.container;
        let mut out = Vec::new();
        match kind {
            Header::Class | Header::Interface => {
                let own = self.value_members(ty);
                self.push_members(own, &mut out);
                for base in self.inheritable_bases(ty) {
                    let inherited = self.properties_of(base);
                    self.push_inherited(inherited, &mut out);
                }
            }
            Header::ObjectType => {
                let own = self.value_members(ty);
                self.push_members(own, &mut out);
            }
            Header::FunctionType => {
                let module = self.merged_module(container);
                if module.is_some() {
                    let members = self.value_members(module);
                    self.push_members(members, &mut out);
                }
            }
            Header::ConstructorType { class } => {
                let own = self.value_members(ty);
                self.push_members(own, &mut out);
                let module = self.merged_module(class);
                if module.is_some() {
                    let members = self.value_members(module);
                    self.push_members(members, &mut out);
                }
                if class.is_some() {
                    for base in self.inheritable_bases(class) {
                        let base_class = self.generic_target(base);
                        let base_ctor = self.value_type_of(base_class);
                        if base_ctor.is_some() {
                            let inherited = self.properties_of(base_ctor);
                            self.push_inherited(inherited, &mut out);
                        }
                    }
                }
            }
            Header::ContainerInstance { container } => {
                let members = self.value_members(container);
                self.push_members(members, &mut out);
                let module = self.merged_module(container);
                if module.is_some() {
                    let members = self.value_members(module);
                    self.push_members(members, &mut out);
                }
            }
            Header::Array { .. } => {
                out.push(PropertyInfo {
                    name: "length".to_string(),
                    type_id: self.primitives.number,
                    optional: false,
                    private: false,
                    origin: SymbolId::NONE,
                    kind: MemberKind::Property,
                });
            }
            Header::Instantiation { target, mapping } => {
                let substitution = TypeSubstitution::from_pairs(&mapping);
                for mut info in self.properties_of(target) {
                    info.type_id = instantiate_type(self, info.type_id, &substitution);
                    out.push(info);
                }
            }
            Header::TypeParameter => {
                let constraint = self.constraint_of(ty);
                if constraint.is_some() {
                    out = self.properties_of(constraint);
                }
            }
            Header::Other => {}
        }
        out
    }

    /// Signature symbols visible to callers: overload declarations hide
    /// the implementation signature.
    fn visible_signatures(&self, owner: SymbolId, kind: SignatureKind) -> Vec<SymbolId> {
        let all = self.own_signatures(owner, kind);
        let has_overloads = all
            .iter()
            .any(|&s| self.chain.symbols.signature(s).is_some_and(|d| !d.is_definition));
        if !has_overloads {
            return all;
        }
        all.into_iter()
            .filter(|&s| self.chain.symbols.signature(s).is_some_and(|d| !d.is_definition))
            .collect()
    }

    fn resolve_signatures(&mut self, signatures: Vec<SymbolId>) -> Vec<SignatureInfo> {
        signatures.into_iter().filter_map(|s| self.signature_info(s)).collect()
    }

    fn collect_signatures(&mut self, ty: SymbolId, kind: SignatureKind) -> Vec<SignatureInfo> {
        let Some(sym) = self.symbol(ty) else {
            return Vec::new();
        };
        let header = Header::of(&sym.kind);
        match header {
            Header::Interface => {
                let own = self.visible_signatures(ty, kind);
                if !own.is_empty() {
                    return self.resolve_signatures(own);
                }
                let mut inherited = Vec::new();
                for base in self.inheritable_bases(ty) {
                    inherited.extend(self.signatures_of(base, kind));
                }
                inherited
            }
            Header::ObjectType | Header::FunctionType => {
                let own = self.visible_signatures(ty, kind);
                self.resolve_signatures(own)
            }
            Header::ConstructorType { class } => {
                let default_only = self.symbol(ty).and_then(|s| s.shape()).is_some_and(|s| s.has_default_constructor);
                if kind == SignatureKind::Construct && default_only && class.is_some() {
                    let inherited = self.inherited_constructors(class);
                    if !inherited.is_empty() {
                        return inherited;
                    }
                }
                let own = self.visible_signatures(ty, kind);
                self.resolve_signatures(own)
            }
            Header::Instantiation { target, mapping } => {
                let substitution = TypeSubstitution::from_pairs(&mapping);
                let signatures = self.signatures_of(target, kind);
                signatures
                    .iter()
                    .map(|s| instantiate_signature(self, s, &substitution))
                    .collect()
            }
            Header::TypeParameter => {
                let constraint = self.constraint_of(ty);
                if constraint.is_some() { self.signatures_of(constraint, kind) } else { Vec::new() }
            }
            _ => Vec::new(),
        }
    }

    /// Construct signatures a class without its own constructor takes from
    /// its base class, returning the derived class.
    fn inherited_constructors(&mut self, class: SymbolId) -> Vec<SignatureInfo> {
        let Some(base) = self.inheritable_bases(class).first().copied() else {
            return Vec::new();
        };
        let target = self.generic_target(base);
        let base_ctor = self.value_type_of(target);
        if base_ctor.is_none() {
            return Vec::new();
        }
        let mapping = match self.symbol(base).map(|s| &s.kind) {
            Some(SymbolKind::Instantiation { mapping, .. }) => mapping.clone(),
            _ => Vec::new(),
        };
        let substitution = TypeSubstitution::from_pairs(&mapping);
        let class_type_parameters = self.chain.symbols.shape(class).map(|s| s.type_parameters.clone()).unwrap_or_default();
        let base_signatures = self.signatures_of(base_ctor, SignatureKind::Construct);
        base_signatures
            .iter()
            .map(|s| {
                let mut signature = instantiate_signature(self, s, &substitution);
                signature.return_type = class;
                signature.type_parameters = class_type_parameters.clone();
                signature
            })
            .collect()
    }

    fn collect_index_type(&mut self, ty: SymbolId, numeric: bool) -> Option<SymbolId> {
        let header = Header::of(&self.symbol(ty)?.kind);
        match header {
            Header::Array { element } => numeric.then_some(element),
            Header::Instantiation { target, mapping } => {
                let index = self.index_type_of(target, numeric)?;
                let substitution = TypeSubstitution::from_pairs(&mapping);
                Some(instantiate_type(self, index, &substitution))
            }
            Header::TypeParameter => {
                let constraint = self.constraint_of(ty);
                if constraint.is_some() { self.index_type_of(constraint, numeric) } else { None }
            }
            Header::Class | Header::Interface | Header::ObjectType => {
                if let Some(own) = self.own_index_type(ty, numeric) {
                    return Some(own);
                }
                if matches!(header, Header::ObjectType) {
                    return None;
                }
                for base in self.inheritable_bases(ty) {
                    if let Some(inherited) = self.index_type_of(base, numeric) {
                        return Some(inherited);
                    }
                }
                None
            }
            Header::ConstructorType { .. } => self.own_index_type(ty, numeric),
            _ => None,
        }
    }

    /// Return type of the first own index signature of the given domain.
    pub(crate) fn own_index_type(&mut self, ty: SymbolId, numeric: bool) -> Option<SymbolId> {
        let signature = self.own_index_signatures(ty, numeric).first().copied()?;
        Some(self.return_type_of(signature))
    }

    /// Own index signatures whose parameter is `number` (`numeric`) or
    /// `string`.
    pub fn own_index_signatures(&mut self, ty: SymbolId, numeric: bool) -> Vec<SymbolId> {
        let mut found = Vec::new();
        for signature in self.own_signatures(ty, SignatureKind::Index) {
            let param = self
                .chain
                .symbols
                .signature(signature)
                .and_then(|d| d.parameters.first().copied())
                .unwrap_or(SymbolId::NONE);
            if param.is_none() {
                continue;
            }
            let param_type = self.type_of_symbol(param);
            let is_numeric = match self.classify(param_type) {
                TypeClass::Number => true,
                TypeClass::String => false,
                _ => continue,
            };
            if is_numeric == numeric {
                found.push(signature);
            }
        }
        found
    }

    /// Type parameters in scope at the declaration of an anonymous type.
    fn visible_type_parameters(&self, ty: SymbolId) -> FxHashSet<SymbolId> {
        let mut visible = FxHashSet::default();
        let mut decl = self.symbol(ty).map_or(pullc_binder::DeclId::NONE, |s| s.first_declaration());
        while decl.is_some() {
            let Some(d) = self.decl(decl) else {
                break;
            };
            if let Some(signature) = self.chain.symbols.signature(d.signature_symbol) {
                visible.extend(signature.type_parameters.iter().copied());
            }
            if matches!(d.kind, DeclKind::Class | DeclKind::Interface)
                && let Some(shape) = self.chain.symbols.shape(d.symbol)
            {
                visible.extend(shape.type_parameters.iter().copied());
            }
            decl = d.parent;
        }
        visible
    }
}

/// Kind tag of a symbol with just the data the member walks need.
enum Header {
    Class,
    Interface,
    ObjectType,
    FunctionType,
    ConstructorType { class: SymbolId },
    ContainerInstance { container: SymbolId },
    Array { element: SymbolId },
    Instantiation { target: SymbolId, mapping: Vec<(SymbolId, SymbolId)> },
    TypeParameter,
    Other,
}

impl Header {
    fn of(kind: &SymbolKind) -> Header {
        match kind {
            SymbolKind::Class(_) => Header::Class,
            SymbolKind::Interface(_) => Header::Interface,
            SymbolKind::ObjectType(_) => Header::ObjectType,
            SymbolKind::FunctionType(_) => Header::FunctionType,
            SymbolKind::ConstructorType(shape) => Header::ConstructorType { class: shape.associated },
            SymbolKind::ContainerInstance { container } => Header::ContainerInstance { container: *container },
            SymbolKind::Array { element } => Header::Array { element: *element },
            SymbolKind::Instantiation { target, mapping } => Header::Instantiation {
                target: *target,
                mapping: mapping.clone(),
            },
            SymbolKind::TypeParameter { .. } => Header::TypeParameter,
            _ => Header::Other,
        }
    }
}

impl TypeResolver for PullTypeResolver<'_> {
    fn primitives(&self) -> Primitives {
        self.primitives
    }

    fn classify(&mut self, ty: SymbolId) -> TypeClass {
        let Some(sym) = self.symbol(ty) else {
            return TypeClass::Any;
        };
        match &sym.kind {
            SymbolKind::Primitive(kind) => match kind {
                PrimitiveKind::Any => TypeClass::Any,
                PrimitiveKind::Number => TypeClass::Number,
                PrimitiveKind::String => TypeClass::String,
                PrimitiveKind::Boolean => TypeClass::Boolean,
                PrimitiveKind::Void => TypeClass::Void,
                PrimitiveKind::Null => TypeClass::Null,
                PrimitiveKind::Undefined => TypeClass::Undefined,
                PrimitiveKind::Error => TypeClass::Error,
            },
            SymbolKind::Enum(_) => TypeClass::Enum,
            SymbolKind::Array { element } => TypeClass::Array(*element),
            SymbolKind::TypeParameter { .. } => {
                let constraint = self.constraint_of(ty);
                TypeClass::TypeParameter { constraint }
            }
            kind if !kind.is_type() => TypeClass::Any,
            _ => TypeClass::Object,
        }
    }

    fn properties_of(&mut self, ty: SymbolId) -> Vec<PropertyInfo> {
        if !self.enter_walk(ty, Walk::Properties) {
            return Vec::new();
        }
        let properties = self.collect_properties(ty);
        self.leave_walk(ty, Walk::Properties);
        properties
    }

    fn signatures_of(&mut self, ty: SymbolId, kind: SignatureKind) -> Vec<SignatureInfo> {
        let walk = match kind {
            SignatureKind::Construct => Walk::ConstructSignatures,
            _ => Walk::CallSignatures,
        };
        if !self.enter_walk(ty, walk) {
            return Vec::new();
        }
        let signatures = self.collect_signatures(ty, kind);
        self.leave_walk(ty, walk);
        signatures
    }

    fn index_type_of(&mut self, ty: SymbolId, numeric: bool) -> Option<SymbolId> {
        if !self.enter_walk(ty, Walk::Index) {
            return None;
        }
        let index = self.collect_index_type(ty, numeric);
        self.leave_walk(ty, Walk::Index);
        index
    }

    fn array_of(&mut self, element: SymbolId) -> SymbolId {
        self.chain.array_type(element)
    }

    fn specialize(&mut self, ty: SymbolId, substitution: &TypeSubstitution) -> SymbolId {
        let Some(sym) = self.symbol(ty) else {
            return ty;
        };
        match &sym.kind {
            SymbolKind::Instantiation { target, mapping } => {
                let target = *target;
                let mapping = mapping.clone();
                let specialized: Vec<(SymbolId, SymbolId)> = mapping
                    .iter()
                    .map(|&(p, a)| (p, instantiate_type(self, a, substitution)))
                    .collect();
                if specialized == mapping {
                    return ty;
                }
                self.chain.instantiation(target, specialized)
            }
            SymbolKind::Class(shape) | SymbolKind::Interface(shape) => {
                if shape.type_parameters.is_empty() {
                    return ty;
                }
                let mapping: Vec<(SymbolId, SymbolId)> = shape
                    .type_parameters
                    .iter()
                    .map(|&tp| (tp, substitution.get(tp).unwrap_or(tp)))
                    .collect();
                if mapping.iter().all(|(p, a)| p == a) {
                    return ty;
                }
                self.chain.instantiation(ty, mapping)
            }
            SymbolKind::ObjectType(_) | SymbolKind::FunctionType(_) | SymbolKind::ConstructorType(_) => {
                if ty == self.primitives.empty_object {
                    return ty;
                }
                let visible = self.visible_type_parameters(ty);
                let mapping: Vec<(SymbolId, SymbolId)> = substitution
                    .pairs()
                    .iter()
                    .copied()
                    .filter(|(p, a)| p != a && visible.contains(p))
                    .collect();
                if mapping.is_empty() {
                    return ty;
                }
                self.chain.instantiation(ty, mapping)
            }
            _ => ty,
        }
    }

    fn is_named(&mut self, ty: SymbolId) -> bool {
        let Some(sym) = self.symbol(ty) else {
            return false;
        };
        match &sym.kind {
            SymbolKind::Class(_)
            | SymbolKind::Interface(_)
            | SymbolKind::Enum(_)
            | SymbolKind::Container(_)
            | SymbolKind::ContainerInstance { .. }
            | SymbolKind::TypeParameter { .. }
            | SymbolKind::Primitive(_) => true,
            SymbolKind::ConstructorType(shape) => shape.associated.is_some(),
            SymbolKind::Instantiation { target, .. } => {
                let target = *target;
                self.is_named(target)
            }
            _ => false,
        }
    }

    fn type_name(&mut self, ty: SymbolId) -> Option<String> {
        let sym = self.symbol(ty)?;
        match &sym.kind {
            SymbolKind::Primitive(kind) => Some(kind.name().to_string()),
            SymbolKind::Class(_)
            | SymbolKind::Interface(_)
            | SymbolKind::Enum(_)
            | SymbolKind::Container(_)
            | SymbolKind::TypeParameter { .. } => Some(sym.name.clone()),
            SymbolKind::ContainerInstance { container } => {
                Some(format!("typeof {}", self.chain.symbols.name(*container)))
            }
            SymbolKind::ConstructorType(shape) if shape.associated.is_some() => {
                Some(format!("typeof {}", self.chain.symbols.name(shape.associated)))
            }
            SymbolKind::Instantiation { target, mapping } => {
                let target = *target;
                let mapping = mapping.clone();
                let base = self.type_name(target)?;
                let arguments: Vec<String> = mapping.iter().map(|&(_, a)| type_to_string(self, a)).collect();
                Some(format!("{base}<{}>", arguments.join(", ")))
            }
            _ => None,
        }
    }

    fn reference_parts(&mut self, ty: SymbolId) -> Option<(SymbolId, Vec<SymbolId>)> {
        if !self.is_named(ty) {
            return None;
        }
        let sym = self.symbol(ty)?;
        match &sym.kind {
            SymbolKind::Instantiation { target, mapping } => {
                Some((*target, mapping.iter().map(|&(_, a)| a).collect()))
            }
            SymbolKind::Class(shape) | SymbolKind::Interface(shape) => Some((ty, shape.type_parameters.clone())),
            _ => Some((ty, Vec::new())),
        }
    }
}
