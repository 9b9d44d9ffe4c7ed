//! In-memory `TypeResolver` for exercising the solver without a checker.

#![allow(dead_code)]

use pullc_binder::{Primitives, SignatureKind, SymbolId};
use pullc_solver::{
    MemberKind, ParamInfo, PropertyInfo, SignatureInfo, TypeClass, TypeResolver, TypeSubstitution,
    instantiate_type,
};
use rustc_hash::FxHashMap;

#[derive(Clone, Debug)]
enum MockType {
    Intrinsic(TypeClass),
    Array(SymbolId),
    Parameter { name: String, constraint: SymbolId },
    Enum { name: String },
    Object(ObjectData),
}

#[derive(Clone, Debug, Default)]
struct ObjectData {
    name: Option<String>,
    properties: Vec<PropertyInfo>,
    calls: Vec<SignatureInfo>,
    constructs: Vec<SignatureInfo>,
    string_index: Option<SymbolId>,
    number_index: Option<SymbolId>,
    reference: Option<(SymbolId, Vec<SymbolId>)>,
}

pub struct MockResolver {
    types: Vec<MockType>,
    arrays: FxHashMap<SymbolId, SymbolId>,
    specializations: FxHashMap<(SymbolId, TypeSubstitution), SymbolId>,
    primitives: Primitives,
    next_origin: u32,
}

impl MockResolver {
    pub fn new() -> Self {
        init_tracing();
        let mut types = Vec::new();
        let mut add = |class| {
            types.push(MockType::Intrinsic(class));
            SymbolId(types.len() as u32 - 1)
        };
        let any = add(TypeClass::Any);
        let number = add(TypeClass::Number);
        let string = add(TypeClass::String);
        let boolean = add(TypeClass::Boolean);
        let void = add(TypeClass::Void);
        let null = add(TypeClass::Null);
        let undefined = add(TypeClass::Undefined);
        let error = add(TypeClass::Error);
        types.push(MockType::Object(ObjectData::default()));
        let empty_object = SymbolId(types.len() as u32 - 1);
        Self {
            types,
            arrays: FxHashMap::default(),
            specializations: FxHashMap::default(),
            primitives: Primitives {
                any,
                number,
                string,
                boolean,
                void,
                null,
                undefined,
                error,
                empty_object,
            },
            next_origin: 100_000,
        }
    }

    fn push(&mut self, ty: MockType) -> SymbolId {
        self.types.push(ty);
        SymbolId(self.types.len() as u32 - 1)
    }

    fn object_mut(&mut self, ty: SymbolId) -> &mut ObjectData {
        match &mut self.types[ty.0 as usize] {
            MockType::Object(data) => data,
            other => panic!("not an object type: {other:?}"),
        }
    }

    pub fn p(&self) -> Primitives {
        self.primitives
    }

    pub fn anonymous(&mut self, props: &[(&str, SymbolId)]) -> SymbolId {
        let ty = self.push(MockType::Object(ObjectData::default()));
        for &(name, prop_type) in props {
            self.add_property(ty, name, prop_type, false);
        }
        ty
    }

    pub fn named(&mut self, name: &str, props: &[(&str, SymbolId)]) -> SymbolId {
        let ty = self.anonymous(props);
        self.object_mut(ty).name = Some(name.to_string());
        ty
    }

    pub fn add_property(&mut self, ty: SymbolId, name: &str, prop_type: SymbolId, optional: bool) -> SymbolId {
        let origin = SymbolId(self.next_origin);
        self.next_origin += 1;
        self.object_mut(ty).properties.push(PropertyInfo {
            name: name.to_string(),
            type_id: prop_type,
            optional,
            private: false,
            origin,
            kind: MemberKind::Property,
        });
        origin
    }

    /// Private member; pass the same `origin` to model one shared declaration.
    pub fn add_private(&mut self, ty: SymbolId, name: &str, prop_type: SymbolId, origin: SymbolId) {
        self.object_mut(ty).properties.push(PropertyInfo {
            name: name.to_string(),
            type_id: prop_type,
            optional: false,
            private: true,
            origin,
            kind: MemberKind::Property,
        });
    }

    pub fn signature(&self, params: &[(&str, SymbolId)], return_type: SymbolId) -> SignatureInfo {
        SignatureInfo {
            symbol: SymbolId::NONE,
            kind: SignatureKind::Call,
            type_parameters: Vec::new(),
            parameters: params
                .iter()
                .map(|&(name, type_id)| ParamInfo {
                    name: name.to_string(),
                    type_id,
                    optional: false,
                    rest: false,
                })
                .collect(),
            return_type,
            rest_element: None,
            is_definition: false,
        }
    }

    pub fn function(&mut self, params: &[(&str, SymbolId)], return_type: SymbolId) -> SymbolId {
        let signature = self.signature(params, return_type);
        self.function_with(signature)
    }

    pub fn function_with(&mut self, signature: SignatureInfo) -> SymbolId {
        let ty = self.push(MockType::Object(ObjectData::default()));
        self.object_mut(ty).calls.push(signature);
        ty
    }

    pub fn add_construct(&mut self, ty: SymbolId, mut signature: SignatureInfo) {
        signature.kind = SignatureKind::Construct;
        self.object_mut(ty).constructs.push(signature);
    }

    pub fn set_index(&mut self, ty: SymbolId, numeric: bool, index_type: SymbolId) {
        let data = self.object_mut(ty);
        if numeric {
            data.number_index = Some(index_type);
        } else {
            data.string_index = Some(index_type);
        }
    }

    pub fn array(&mut self, element: SymbolId) -> SymbolId {
        self.array_of(element)
    }

    pub fn type_parameter(&mut self, name: &str, constraint: SymbolId) -> SymbolId {
        self.push(MockType::Parameter {
            name: name.to_string(),
            constraint,
        })
    }

    pub fn enumeration(&mut self, name: &str) -> SymbolId {
        self.push(MockType::Enum { name: name.to_string() })
    }

    /// Named generic reference `target<args>` with the given members.
    pub fn reference(&mut self, target: SymbolId, args: &[SymbolId], props: &[(&str, SymbolId)]) -> SymbolId {
        let name = match &self.types[target.0 as usize] {
            MockType::Object(data) => data.name.clone(),
            _ => None,
        };
        let ty = self.named(name.as_deref().unwrap_or("?"), props);
        self.object_mut(ty).reference = Some((target, args.to_vec()));
        ty
    }
}

impl TypeResolver for MockResolver {
    fn primitives(&self) -> Primitives {
        self.primitives
    }

    fn classify(&mut self, ty: SymbolId) -> TypeClass {
        match &self.types[ty.0 as usize] {
            MockType::Intrinsic(class) => *class,
            MockType::Array(element) => TypeClass::Array(*element),
            MockType::Parameter { constraint, .. } => TypeClass::TypeParameter {
                constraint: *constraint,
            },
            MockType::Enum { .. } => TypeClass::Enum,
            MockType::Object(_) => TypeClass::Object,
        }
    }

    fn properties_of(&mut self, ty: SymbolId) -> Vec<PropertyInfo> {
        let length = |p: Primitives| PropertyInfo {
            name: "length".to_string(),
            type_id: p.number,
            optional: false,
            private: false,
            origin: SymbolId(99_999),
            kind: MemberKind::Property,
        };
        match &self.types[ty.0 as usize] {
            MockType::Object(data) => data.properties.clone(),
            MockType::Array(_) => vec![length(self.primitives)],
            MockType::Intrinsic(TypeClass::String) => vec![length(self.primitives)],
            _ => Vec::new(),
        }
    }

    fn signatures_of(&mut self, ty: SymbolId, kind: SignatureKind) -> Vec<SignatureInfo> {
        match (&self.types[ty.0 as usize], kind) {
            (MockType::Object(data), SignatureKind::Call) => data.calls.clone(),
            (MockType::Object(data), SignatureKind::Construct) => data.constructs.clone(),
            _ => Vec::new(),
        }
    }

    fn index_type_of(&mut self, ty: SymbolId, numeric: bool) -> Option<SymbolId> {
        match &self.types[ty.0 as usize] {
            MockType::Object(data) if numeric => data.number_index,
            MockType::Object(data) => data.string_index,
            MockType::Array(element) if numeric => Some(*element),
            _ => None,
        }
    }

    fn array_of(&mut self, element: SymbolId) -> SymbolId {
        if let Some(&array) = self.arrays.get(&element) {
            return array;
        }
        let array = self.push(MockType::Array(element));
        self.arrays.insert(element, array);
        array
    }

    fn specialize(&mut self, ty: SymbolId, substitution: &TypeSubstitution) -> SymbolId {
        let key = (ty, substitution.clone());
        if let Some(&existing) = self.specializations.get(&key) {
            return existing;
        }
        let MockType::Object(data) = self.types[ty.0 as usize].clone() else {
            return ty;
        };
        let specialized = self.push(MockType::Object(ObjectData::default()));
        self.specializations.insert(key, specialized);
        let mut properties = Vec::new();
        for mut prop in data.properties {
            prop.type_id = instantiate_type(self, prop.type_id, substitution);
            properties.push(prop);
        }
        let calls = data
            .calls
            .iter()
            .map(|s| pullc_solver::instantiate_signature(self, s, substitution))
            .collect();
        let reference = data.reference.map(|(target, args)| {
            let args = args.iter().map(|&a| instantiate_type(self, a, substitution)).collect();
            (target, args)
        });
        *self.object_mut(specialized) = ObjectData {
            name: data.name,
            properties,
            calls,
            constructs: data.constructs,
            string_index: data.string_index,
            number_index: data.number_index,
            reference,
        };
        specialized
    }

    fn is_named(&mut self, ty: SymbolId) -> bool {
        match &self.types[ty.0 as usize] {
            MockType::Object(data) => data.name.is_some(),
            MockType::Parameter { .. } | MockType::Enum { .. } => true,
            _ => false,
        }
    }

    fn type_name(&mut self, ty: SymbolId) -> Option<String> {
        match &self.types[ty.0 as usize] {
            MockType::Object(data) => data.name.clone(),
            MockType::Parameter { name, .. } | MockType::Enum { name } => Some(name.clone()),
            _ => None,
        }
    }

    fn reference_parts(&mut self, ty: SymbolId) -> Option<(SymbolId, Vec<SymbolId>)> {
        match &self.types[ty.0 as usize] {
            MockType::Object(data) => data.reference.clone(),
            _ => None,
        }
    }
}

/// Route `tracing` output through the test harness when `RUST_LOG` is set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
