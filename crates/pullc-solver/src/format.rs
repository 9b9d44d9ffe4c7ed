//! Type display for diagnostics.

use pullc_binder::{SignatureKind, SymbolId};

use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::type_resolver::{SignatureInfo, TypeClass, TypeResolver};

pub fn type_to_string<R: TypeResolver>(resolver: &mut R, ty: SymbolId) -> String {
    TypeFormatter::new(resolver).format(ty)
}

pub fn signature_to_string<R: TypeResolver>(resolver: &mut R, signature: &SignatureInfo) -> String {
    TypeFormatter::new(resolver).signature(signature, true)
}

pub struct TypeFormatter<'r, R: TypeResolver> {
    resolver: &'r mut R,
    guard: RecursionGuard<SymbolId>,
}

impl<'r, R: TypeResolver> TypeFormatter<'r, R> {
    pub fn new(resolver: &'r mut R) -> Self {
        Self {
            resolver,
            guard: RecursionGuard::with_profile(RecursionProfile::Display),
        }
    }

    pub fn format(&mut self, ty: SymbolId) -> String {
        if ty.is_none() {
            return "any".to_string();
        }
        match self.resolver.classify(ty) {
            TypeClass::Any | TypeClass::Error => "any".to_string(),
            TypeClass::Number => "number".to_string(),
            TypeClass::String => "string".to_string(),
            TypeClass::Boolean => "boolean".to_string(),
            TypeClass::Void => "void".to_string(),
            TypeClass::Null => "null".to_string(),
            TypeClass::Undefined => "undefined".to_string(),
            TypeClass::Array(element) => {
                let inner = self.format(element);
                if inner.contains("=>") && !inner.starts_with('{') {
                    format!("({inner})[]")
                } else {
                    format!("{inner}[]")
                }
            }
            TypeClass::Enum | TypeClass::TypeParameter { .. } => {
                self.resolver.type_name(ty).unwrap_or_else(|| "{}".to_string())
            }
            TypeClass::Object => {
                if self.resolver.is_named(ty)
                    && let Some(name) = self.resolver.type_name(ty)
                {
                    return name;
                }
                self.anonymous(ty)
            }
        }
    }

    fn anonymous(&mut self, ty: SymbolId) -> String {
        match self.guard.enter(ty) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => return "any".to_string(),
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => return "{ ... }".to_string(),
        }
        let text = self.anonymous_body(ty);
        self.guard.leave(ty);
        text
    }

    fn anonymous_body(&mut self, ty: SymbolId) -> String {
        let properties = self.resolver.properties_of(ty);
        let calls = self.resolver.signatures_of(ty, SignatureKind::Call);
        let constructs = self.resolver.signatures_of(ty, SignatureKind::Construct);
        let string_index = self.resolver.index_type_of(ty, false);
        let number_index = self.resolver.index_type_of(ty, true);
        let no_index = string_index.is_none() && number_index.is_none();

        if properties.is_empty() && no_index {
            match (calls.as_slice(), constructs.as_slice()) {
                ([call], []) => return self.signature(call, true),
                ([], [construct]) => return format!("new {}", self.signature(construct, true)),
                _ => {}
            }
        }

        let mut members = Vec::new();
        for call in &calls {
            members.push(self.signature(call, false));
        }
        for construct in &constructs {
            members.push(format!("new {}", self.signature(construct, false)));
        }
        if let Some(index) = string_index {
            members.push(format!("[x: string]: {}", self.format(index)));
        }
        if let Some(index) = number_index {
            members.push(format!("[x: number]: {}", self.format(index)));
        }
        for prop in &properties {
            let optional = if prop.optional { "?" } else { "" };
            members.push(format!("{}{optional}: {}", prop.name, self.format(prop.type_id)));
        }
        if members.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {}; }}", members.join("; "))
        }
    }

    /// `(a: T) => R` when `arrow`, `(a: T): R` as a member.
    pub fn signature(&mut self, signature: &SignatureInfo, arrow: bool) -> String {
        let mut text = String::new();
        if !signature.type_parameters.is_empty() {
            let names: Vec<String> = signature
                .type_parameters
                .iter()
                .map(|&tp| self.resolver.type_name(tp).unwrap_or_default())
                .collect();
            text.push('<');
            text.push_str(&names.join(", "));
            text.push('>');
        }
        let params: Vec<String> = signature
            .parameters
            .iter()
            .map(|p| {
                let prefix = if p.rest { "..." } else { "" };
                let optional = if p.optional { "?" } else { "" };
                format!("{prefix}{}{optional}: {}", p.name, self.format(p.type_id))
            })
            .collect();
        text.push('(');
        text.push_str(&params.join(", "));
        text.push(')');
        text.push_str(if arrow { " => " } else { ": " });
        text.push_str(&self.format(signature.return_type));
        text
    }
}
