//! Symbol graph.
//!
//! Symbols are owned by a `SymbolArena`; everything else refers to them by
//! `SymbolId`. Type symbols and value symbols share the arena, and the
//! variant of `SymbolKind` says which is which. Ids are arena indices and
//! never reused, so comparing an id with a saved watermark tells whether the
//! symbol predates a rebind pass.

use bitflags::bitflags;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::Serialize;
use smallvec::SmallVec;

use crate::decl::{DeclId, DeclSpace};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub const NONE: SymbolId = SymbolId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        self != Self::NONE
    }
}

/// Defaults to `NONE`; id 0 is the `any` primitive.
impl Default for SymbolId {
    fn default() -> Self {
        Self::NONE
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
    pub struct SymbolFlags: u32 {
        const EXPORTED = 1 << 0;
        const AMBIENT = 1 << 1;
        const PRIVATE = 1 << 2;
        const PUBLIC = 1 << 3;
        const STATIC = 1 << 4;
        const OPTIONAL = 1 << 5;
        /// Freshly minted for a duplicate declaration; never registered.
        const DUPLICATE = 1 << 6;
        /// Created by the binder or resolver without a declaration of its own.
        const SYNTHESIZED = 1 << 7;
    }
}

/// Lazy resolution state, used to detect and break cycles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum ResolutionState {
    #[default]
    Unresolved,
    Resolving,
    Resolved,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PrimitiveKind {
    Any,
    Number,
    String,
    Boolean,
    Void,
    Null,
    Undefined,
    /// Placeholder produced by failed resolution; compatible with everything.
    Error,
}

impl PrimitiveKind {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Any => "any",
            PrimitiveKind::Number => "number",
            PrimitiveKind::String => "string",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Void => "void",
            PrimitiveKind::Null => "null",
            PrimitiveKind::Undefined => "undefined",
            PrimitiveKind::Error => "any",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SignatureKind {
    Call,
    Construct,
    Index,
}

/// Name-keyed member table split by name space. A symbol occupying both
/// spaces (class, enum, instantiated module) is entered in both maps.
#[derive(Clone, Debug, Default)]
pub struct MemberTable {
    pub values: IndexMap<String, SymbolId>,
    pub types: IndexMap<String, SymbolId>,
}

impl MemberTable {
    pub fn get(&self, name: &str, space: DeclSpace) -> Option<SymbolId> {
        match space {
            DeclSpace::Value => self.values.get(name).copied(),
            DeclSpace::Type => self.types.get(name).copied(),
        }
    }

    pub fn insert(&mut self, name: &str, space: DeclSpace, symbol: SymbolId) {
        match space {
            DeclSpace::Value => self.values.insert(name.to_string(), symbol),
            DeclSpace::Type => self.types.insert(name.to_string(), symbol),
        };
    }

    /// Keep only the entries whose symbol satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(SymbolId) -> bool) {
        self.values.retain(|_, s| keep(*s));
        self.types.retain(|_, s| keep(*s));
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.types.is_empty()
    }
}

/// Members, signatures and type parameters of a type symbol.
#[derive(Clone, Debug, Default)]
pub struct TypeShape {
    /// Exported (or, for classes and object types, all instance) members.
    pub members: MemberTable,
    /// Non-exported members of modules and locals of function bodies.
    pub enclosed: MemberTable,
    pub call_signatures: Vec<SymbolId>,
    pub construct_signatures: Vec<SymbolId>,
    pub index_signatures: Vec<SymbolId>,
    pub type_parameters: Vec<SymbolId>,
    /// Class ↔ constructor type, module/enum → instance type.
    pub associated: SymbolId,
    pub has_default_constructor: bool,
    /// Resolved `extends` clause, filled lazily by the resolver.
    pub extends: Vec<SymbolId>,
    /// Resolved `implements` clause, filled lazily by the resolver.
    pub implements: Vec<SymbolId>,
    pub heritage_resolved: bool,
    /// Known instantiations keyed by the type-parameter mapping. Kept across
    /// check passes; an instantiation is fully determined by its key.
    pub specializations: FxHashMap<Vec<(SymbolId, SymbolId)>, SymbolId>,
}

/// A call, construct or index signature.
#[derive(Clone, Debug)]
pub struct SignatureData {
    pub kind: SignatureKind,
    pub parameters: Vec<SymbolId>,
    /// Resolved lazily; `NONE` until then.
    pub return_type: SymbolId,
    pub type_parameters: Vec<SymbolId>,
    /// Implementation signature (has a body) as opposed to an overload.
    pub is_definition: bool,
    pub has_var_args: bool,
}

impl SignatureData {
    pub fn new(kind: SignatureKind) -> Self {
        Self {
            kind,
            parameters: Vec::new(),
            return_type: SymbolId::NONE,
            type_parameters: Vec::new(),
            is_definition: false,
            has_var_args: false,
        }
    }
}

/// The tagged variant of a symbol.
#[derive(Clone, Debug)]
pub enum SymbolKind {
    // Value symbols. Their type lives in `Symbol::type_id`.
    Variable,
    Parameter { optional: bool, rest: bool },
    Property { optional: bool },
    Function,
    Method { optional: bool },
    EnumMember,
    Accessor { getter: SymbolId, setter: SymbolId },
    /// `import x = A.B`; the target is resolved lazily.
    Alias { target: SymbolId },

    // Type symbols.
    Primitive(PrimitiveKind),
    Class(TypeShape),
    Interface(TypeShape),
    ObjectType(TypeShape),
    FunctionType(TypeShape),
    ConstructorType(TypeShape),
    Container(TypeShape),
    Enum(TypeShape),
    /// Value-side type of a module or enum; its members are the owner's
    /// exported value members.
    ContainerInstance { container: SymbolId },
    TypeParameter { constraint: SymbolId },
    Array { element: SymbolId },
    /// A generic (or anonymous type mentioning type parameters) with its
    /// type parameters substituted.
    Instantiation { target: SymbolId, mapping: Vec<(SymbolId, SymbolId)> },

    Signature(SignatureData),
}

impl SymbolKind {
    pub fn shape(&self) -> Option<&TypeShape> {
        match self {
            SymbolKind::Class(s)
            | SymbolKind::Interface(s)
            | SymbolKind::ObjectType(s)
            | SymbolKind::FunctionType(s)
            | SymbolKind::ConstructorType(s)
            | SymbolKind::Container(s)
            | SymbolKind::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn shape_mut(&mut self) -> Option<&mut TypeShape> {
        match self {
            SymbolKind::Class(s)
            | SymbolKind::Interface(s)
            | SymbolKind::ObjectType(s)
            | SymbolKind::FunctionType(s)
            | SymbolKind::ConstructorType(s)
            | SymbolKind::Container(s)
            | SymbolKind::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_type(&self) -> bool {
        !matches!(
            self,
            SymbolKind::Variable
                | SymbolKind::Parameter { .. }
                | SymbolKind::Property { .. }
                | SymbolKind::Function
                | SymbolKind::Method { .. }
                | SymbolKind::EnumMember
                | SymbolKind::Accessor { .. }
                | SymbolKind::Alias { .. }
                | SymbolKind::Signature(_)
        )
    }

    /// Short tag for logging and display.
    pub fn describe(&self) -> &'static str {
        match self {
            SymbolKind::Variable => "variable",
            SymbolKind::Parameter { .. } => "parameter",
            SymbolKind::Property { .. } => "property",
            SymbolKind::Function => "function",
            SymbolKind::Method { .. } => "method",
            SymbolKind::EnumMember => "enum member",
            SymbolKind::Accessor { .. } => "accessor",
            SymbolKind::Alias { .. } => "alias",
            SymbolKind::Primitive(_) => "primitive",
            SymbolKind::Class(_) => "class",
            SymbolKind::Interface(_) => "interface",
            SymbolKind::ObjectType(_) => "object type",
            SymbolKind::FunctionType(_) => "function type",
            SymbolKind::ConstructorType(_) => "constructor type",
            SymbolKind::Container(_) => "module",
            SymbolKind::Enum(_) => "enum",
            SymbolKind::ContainerInstance { .. } => "module instance",
            SymbolKind::TypeParameter { .. } => "type parameter",
            SymbolKind::Array { .. } => "array",
            SymbolKind::Instantiation { .. } => "instantiation",
            SymbolKind::Signature(_) => "signature",
        }
    }
}

/// A bound semantic entity.
#[derive(Clone, Debug)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub flags: SymbolFlags,
    pub kind: SymbolKind,
    pub declarations: SmallVec<[DeclId; 2]>,
    /// Non-owning back-reference to the containing symbol.
    pub container: SymbolId,
    /// Type of a value symbol (lazily resolved), or the symbol itself for types.
    pub type_id: SymbolId,
    /// Module merged with a class/function/enum of the same name, or the
    /// value symbol a type-only module was merged into.
    pub merged: SymbolId,
    pub binding_phase: u32,
    pub resolution: ResolutionState,
    /// Bumped on every invalidation; derived caches compare against it.
    pub generation: u32,
}

impl Symbol {
    pub fn is_exported(&self) -> bool {
        self.flags.contains(SymbolFlags::EXPORTED)
    }

    pub fn is_private(&self) -> bool {
        self.flags.contains(SymbolFlags::PRIVATE)
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(SymbolFlags::STATIC)
    }

    pub fn is_type(&self) -> bool {
        self.kind.is_type()
    }

    pub fn shape(&self) -> Option<&TypeShape> {
        self.kind.shape()
    }

    pub fn shape_mut(&mut self) -> Option<&mut TypeShape> {
        self.kind.shape_mut()
    }

    pub fn signature(&self) -> Option<&SignatureData> {
        match &self.kind {
            SymbolKind::Signature(sig) => Some(sig),
            _ => None,
        }
    }

    pub fn signature_mut(&mut self) -> Option<&mut SignatureData> {
        match &mut self.kind {
            SymbolKind::Signature(sig) => Some(sig),
            _ => None,
        }
    }

    pub fn first_declaration(&self) -> DeclId {
        self.declarations.first().copied().unwrap_or(DeclId::NONE)
    }

    pub fn add_declaration(&mut self, decl: DeclId) {
        if !self.declarations.contains(&decl) {
            self.declarations.push(decl);
        }
    }

    /// Forget every lazily computed fact about this symbol.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.resolution = ResolutionState::Unresolved;
        match &mut self.kind {
            SymbolKind::Variable
            | SymbolKind::Parameter { .. }
            | SymbolKind::Property { .. }
            | SymbolKind::EnumMember
            | SymbolKind::Accessor { .. } => self.type_id = SymbolId::NONE,
            SymbolKind::Alias { target } => *target = SymbolId::NONE,
            SymbolKind::TypeParameter { constraint } => *constraint = SymbolId::NONE,
            SymbolKind::Signature(sig) => sig.return_type = SymbolId::NONE,
            kind => {
                if let Some(shape) = kind.shape_mut() {
                    shape.extends.clear();
                    shape.implements.clear();
                    shape.heritage_resolved = false;
                }
            }
        }
    }
}

/// Owner of every symbol in a compilation.
#[derive(Debug, Default)]
pub struct SymbolArena {
    symbols: Vec<Symbol>,
}

impl SymbolArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> SymbolId {
        SymbolId(self.symbols.len() as u32)
    }

    pub fn alloc(&mut self, name: &str, kind: SymbolKind, flags: SymbolFlags) -> SymbolId {
        let id = self.next_id();
        let is_type = kind.is_type();
        let resolved = is_type && !matches!(kind, SymbolKind::TypeParameter { .. });
        self.symbols.push(Symbol {
            id,
            name: name.to_string(),
            flags,
            kind,
            declarations: SmallVec::new(),
            container: SymbolId::NONE,
            type_id: if is_type { id } else { SymbolId::NONE },
            merged: SymbolId::NONE,
            binding_phase: 0,
            resolution: if resolved {
                ResolutionState::Resolved
            } else {
                ResolutionState::Unresolved
            },
            generation: 0,
        });
        id
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        if id.is_none() {
            return None;
        }
        self.symbols.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        if id.is_none() {
            return None;
        }
        self.symbols.get_mut(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Symbol> {
        self.symbols.iter_mut()
    }

    pub fn name(&self, id: SymbolId) -> &str {
        self.get(id).map_or("", |s| s.name.as_str())
    }

    pub fn shape(&self, id: SymbolId) -> Option<&TypeShape> {
        self.get(id).and_then(Symbol::shape)
    }

    pub fn shape_mut(&mut self, id: SymbolId) -> Option<&mut TypeShape> {
        self.get_mut(id).and_then(Symbol::shape_mut)
    }

    pub fn signature(&self, id: SymbolId) -> Option<&SignatureData> {
        self.get(id).and_then(Symbol::signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shape_has_no_associated_symbol() {
        let shape = TypeShape::default();
        assert_eq!(shape.associated, SymbolId::NONE);
        assert!(shape.associated.is_none());
        assert_eq!(SymbolId::default(), SymbolId::NONE);
    }
}
