//! The query surface the relation algorithms run against.
//!
//! Types are symbols of the binder's symbol graph. The solver never reads
//! the graph directly; it asks a `TypeResolver`, which resolves member and
//! signature types lazily and may post diagnostics while doing so. The
//! checker's resolver is the production implementation.

use pullc_binder::{Primitives, SignatureKind, SymbolId};

use crate::instantiate::TypeSubstitution;

/// Coarse classification of a type symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeClass {
    Any,
    /// Placeholder left by a failed resolution.
    Error,
    Number,
    String,
    Boolean,
    Void,
    Null,
    Undefined,
    Enum,
    Array(SymbolId),
    TypeParameter { constraint: SymbolId },
    /// Classes, interfaces, object/function/constructor types, module
    /// instances and instantiations of any of those.
    Object,
}

impl TypeClass {
    pub fn is_any_or_error(self) -> bool {
        matches!(self, TypeClass::Any | TypeClass::Error)
    }

    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            TypeClass::Number
                | TypeClass::String
                | TypeClass::Boolean
                | TypeClass::Void
                | TypeClass::Null
                | TypeClass::Undefined
        )
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, TypeClass::Number | TypeClass::Enum)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberKind {
    Property,
    Method,
    Accessor,
}

impl MemberKind {
    pub fn describe(self) -> &'static str {
        match self {
            MemberKind::Property => "property",
            MemberKind::Method => "function",
            MemberKind::Accessor => "accessor",
        }
    }
}

/// A resolved member of a type.
#[derive(Clone, Debug)]
pub struct PropertyInfo {
    pub name: String,
    pub type_id: SymbolId,
    pub optional: bool,
    pub private: bool,
    /// Declaring member symbol; instantiated members keep the generic one.
    pub origin: SymbolId,
    pub kind: MemberKind,
}

#[derive(Clone, Debug)]
pub struct ParamInfo {
    pub name: String,
    pub type_id: SymbolId,
    pub optional: bool,
    pub rest: bool,
}

/// A resolved call, construct or index signature.
#[derive(Clone, Debug)]
pub struct SignatureInfo {
    pub symbol: SymbolId,
    pub kind: SignatureKind,
    pub type_parameters: Vec<SymbolId>,
    pub parameters: Vec<ParamInfo>,
    pub return_type: SymbolId,
    /// Element type of a trailing rest parameter.
    pub rest_element: Option<SymbolId>,
    pub is_definition: bool,
}

impl SignatureInfo {
    /// Arguments required before optional and rest parameters begin.
    pub fn min_argument_count(&self) -> usize {
        self.parameters
            .iter()
            .position(|p| p.optional || p.rest)
            .unwrap_or(self.parameters.len())
    }

    pub fn has_rest(&self) -> bool {
        self.rest_element.is_some()
    }

    /// Non-rest parameter count.
    pub fn fixed_parameter_count(&self) -> usize {
        if self.has_rest() {
            self.parameters.len().saturating_sub(1)
        } else {
            self.parameters.len()
        }
    }

    pub fn accepts_argument_count(&self, count: usize) -> bool {
        count >= self.min_argument_count() && (self.has_rest() || count <= self.parameters.len())
    }

    /// Type expected for the argument at `index`, spreading the rest element.
    pub fn parameter_type_at(&self, index: usize) -> Option<SymbolId> {
        if index < self.fixed_parameter_count() {
            return self.parameters.get(index).map(|p| p.type_id);
        }
        self.rest_element
    }
}

/// Lazy type queries over the symbol graph.
pub trait TypeResolver {
    fn primitives(&self) -> Primitives;

    fn classify(&mut self, ty: SymbolId) -> TypeClass;

    /// Apparent instance members of `ty`, including inherited ones.
    fn properties_of(&mut self, ty: SymbolId) -> Vec<PropertyInfo>;

    fn property_of(&mut self, ty: SymbolId, name: &str) -> Option<PropertyInfo> {
        self.properties_of(ty).into_iter().find(|p| p.name == name)
    }

    fn signatures_of(&mut self, ty: SymbolId, kind: SignatureKind) -> Vec<SignatureInfo>;

    /// Return type of the string (`numeric == false`) or number index
    /// signature declared on `ty`, without fallback between the two.
    fn index_type_of(&mut self, ty: SymbolId, numeric: bool) -> Option<SymbolId>;

    fn array_of(&mut self, element: SymbolId) -> SymbolId;

    /// Substitute into an object type. Returns `ty` when it cannot mention
    /// any of the substituted parameters.
    fn specialize(&mut self, ty: SymbolId, substitution: &TypeSubstitution) -> SymbolId;

    /// Whether `ty` has a declared name (class, interface, enum, type
    /// parameter, module) as opposed to being an anonymous structure.
    fn is_named(&mut self, ty: SymbolId) -> bool;

    /// Display name of a named type, with type arguments when instantiated.
    fn type_name(&mut self, ty: SymbolId) -> Option<String>;

    /// Generic target and type arguments of an instantiated named type.
    fn reference_parts(&mut self, ty: SymbolId) -> Option<(SymbolId, Vec<SymbolId>)>;
}
