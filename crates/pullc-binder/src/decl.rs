//! Declaration tree.
//!
//! One `Decl` exists per syntactic declaration site. Decls of every unit live
//! in a single `DeclArena` owned by the semantic info chain; the arena index
//! is the decl id, so ids are strictly increasing for the lifetime of the
//! chain. A re-collected unit gets a fresh set of decls and the old ones are
//! simply no longer referenced by the unit (the rebind pass prunes them from
//! the symbols that still point at them).

use bitflags::bitflags;
use pullc_syntax::NodeIndex;
use serde::Serialize;

use crate::semantic_unit::UnitId;
use crate::symbols::SymbolId;

/// Identifier of a decl inside the chain's `DeclArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DeclId(pub u32);

impl DeclId {
    pub const NONE: DeclId = DeclId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        self != Self::NONE
    }
}

/// Declaration kinds produced by the decl collector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DeclKind {
    Script,
    Container,
    Enum,
    EnumMember,
    Class,
    Interface,
    Function,
    Variable,
    Property,
    Method,
    Constructor,
    GetAccessor,
    SetAccessor,
    Parameter,
    TypeParameter,
    CallSignature,
    ConstructSignature,
    IndexSignature,
    ObjectType,
    FunctionType,
    ConstructorType,
    FunctionExpression,
    ObjectLiteral,
    TypeAlias,
    CatchBlock,
    WithBlock,
}

/// Which name space a declaration occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DeclSpace {
    Value,
    Type,
}

impl DeclKind {
    /// Kinds whose children are bound by the owning decl's binder rather
    /// than through the dispatcher.
    pub fn is_owned_by_signature(self) -> bool {
        matches!(self, DeclKind::Parameter | DeclKind::TypeParameter)
    }

    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            DeclKind::Function
                | DeclKind::Method
                | DeclKind::Constructor
                | DeclKind::GetAccessor
                | DeclKind::SetAccessor
                | DeclKind::FunctionExpression
        )
    }

    pub fn is_signature(self) -> bool {
        matches!(
            self,
            DeclKind::CallSignature | DeclKind::ConstructSignature | DeclKind::IndexSignature
        )
    }

    /// Decls whose children are type members rather than lexical locals.
    pub fn is_type_body(self) -> bool {
        matches!(
            self,
            DeclKind::Class | DeclKind::Interface | DeclKind::ObjectType | DeclKind::ObjectLiteral | DeclKind::Enum
        )
    }

    pub fn occupies(self, space: DeclSpace, flags: DeclFlags) -> bool {
        match self {
            DeclKind::Class | DeclKind::Enum | DeclKind::TypeAlias => true,
            DeclKind::Container => match space {
                DeclSpace::Type => true,
                DeclSpace::Value => flags.contains(DeclFlags::INSTANTIATED),
            },
            DeclKind::Interface | DeclKind::TypeParameter => space == DeclSpace::Type,
            DeclKind::Variable
            | DeclKind::Function
            | DeclKind::Parameter
            | DeclKind::Property
            | DeclKind::Method
            | DeclKind::GetAccessor
            | DeclKind::SetAccessor
            | DeclKind::EnumMember
            | DeclKind::FunctionExpression => space == DeclSpace::Value,
            _ => false,
        }
    }
}

bitflags! {
    /// Flags recorded on a decl by the collector.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
    pub struct DeclFlags: u32 {
        const EXPORTED = 1 << 0;
        const AMBIENT = 1 << 1;
        const STATIC = 1 << 2;
        const PRIVATE = 1 << 3;
        const PUBLIC = 1 << 4;
        const OPTIONAL = 1 << 5;
        /// Function-like decl without a body (overload or ambient signature).
        const SIGNATURE = 1 << 6;
        const REST = 1 << 7;
        /// Container holding at least one value-producing statement.
        const INSTANTIATED = 1 << 8;
        /// Constructor parameter declared with an accessibility modifier.
        const PROPERTY_PARAMETER = 1 << 9;
        /// Enum piece whose first member has no initializer.
        const IMPLICIT_FIRST_MEMBER = 1 << 10;
        const HAS_INITIALIZER = 1 << 11;
        /// Arrow function; `this` is lexically bound.
        const ARROW = 1 << 12;
    }
}

/// A declaration site.
#[derive(Clone, Debug)]
pub struct Decl {
    pub id: DeclId,
    pub kind: DeclKind,
    pub flags: DeclFlags,
    pub name: String,
    pub unit: UnitId,
    pub script_name: String,
    pub parent: DeclId,
    pub children: Vec<DeclId>,
    /// AST node of the declaration.
    pub node: NodeIndex,
    /// AST node of the declaration's name, used as the diagnostic span.
    pub name_node: NodeIndex,
    /// Symbol the decl is bound to.
    pub symbol: SymbolId,
    /// Signature owned by a function-like or signature decl.
    pub signature_symbol: SymbolId,
    /// Shaped symbol holding this decl's member and local tables.
    pub scope: SymbolId,
    /// Paired declaration on the other side of a type/value split
    /// (a parameter property and its property decl).
    pub value_decl: DeclId,
    /// Cached lexical container-name path, innermost last.
    pub parent_path: Option<Vec<String>>,
    pub is_bound: bool,
}

impl Decl {
    pub fn is_exported(&self) -> bool {
        self.flags.contains(DeclFlags::EXPORTED)
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(DeclFlags::STATIC)
    }

    pub fn is_private(&self) -> bool {
        self.flags.contains(DeclFlags::PRIVATE)
    }

    pub fn is_ambient(&self) -> bool {
        self.flags.contains(DeclFlags::AMBIENT)
    }

    pub fn is_signature_only(&self) -> bool {
        self.flags.contains(DeclFlags::SIGNATURE)
    }

    pub fn occupies(&self, space: DeclSpace) -> bool {
        self.kind.occupies(space, self.flags)
    }
}

/// Append-only storage for every decl of every unit.
#[derive(Debug, Default)]
pub struct DeclArena {
    decls: Vec<Decl>,
}

impl DeclArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next allocated decl will receive.
    pub fn next_id(&self) -> DeclId {
        DeclId(self.decls.len() as u32)
    }

    pub fn alloc(
        &mut self,
        kind: DeclKind,
        flags: DeclFlags,
        name: String,
        unit: UnitId,
        script_name: &str,
        parent: DeclId,
        node: NodeIndex,
        name_node: NodeIndex,
    ) -> DeclId {
        let id = self.next_id();
        self.decls.push(Decl {
            id,
            kind,
            flags,
            name,
            unit,
            script_name: script_name.to_string(),
            parent,
            children: Vec::new(),
            node,
            name_node,
            symbol: SymbolId::NONE,
            signature_symbol: SymbolId::NONE,
            scope: SymbolId::NONE,
            value_decl: DeclId::NONE,
            parent_path: None,
            is_bound: false,
        });
        if let Some(parent) = self.get_mut(parent) {
            parent.children.push(id);
        }
        id
    }

    pub fn get(&self, id: DeclId) -> Option<&Decl> {
        if id.is_none() {
            return None;
        }
        self.decls.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: DeclId) -> Option<&mut Decl> {
        if id.is_none() {
            return None;
        }
        self.decls.get_mut(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn kind(&self, id: DeclId) -> Option<DeclKind> {
        self.get(id).map(|d| d.kind)
    }

    pub fn parent(&self, id: DeclId) -> DeclId {
        self.get(id).map_or(DeclId::NONE, |d| d.parent)
    }

    pub fn symbol(&self, id: DeclId) -> SymbolId {
        self.get(id).map_or(SymbolId::NONE, |d| d.symbol)
    }

    pub fn children(&self, id: DeclId) -> &[DeclId] {
        self.get(id).map_or(&[], |d| d.children.as_slice())
    }

    /// Nearest ancestor (including `id`) satisfying `pred`.
    pub fn find_ancestor(&self, mut id: DeclId, pred: impl Fn(&Decl) -> bool) -> DeclId {
        while let Some(decl) = self.get(id) {
            if pred(decl) {
                return id;
            }
            id = decl.parent;
        }
        DeclId::NONE
    }

    /// Compute (and cache) the lexical container-name path of `id`:
    /// the names of its enclosing decls, outermost first, excluding the
    /// unit-root script decl and `id` itself.
    pub fn parent_path(&mut self, id: DeclId) -> Vec<String> {
        if let Some(path) = self.get(id).and_then(|d| d.parent_path.clone()) {
            return path;
        }
        let mut path = Vec::new();
        let mut current = self.parent(id);
        while let Some(decl) = self.get(current) {
            if decl.kind == DeclKind::Script {
                break;
            }
            path.push(decl.name.clone());
            current = decl.parent;
        }
        path.reverse();
        if let Some(decl) = self.get_mut(id) {
            decl.parent_path = Some(path.clone());
        }
        path
    }
}
