//! Walk state of a type-check pass.
//!
//! The checker pushes the decl of every scope it enters, one return-tracking
//! frame per function body and one contextual type per expression it checks
//! against an expected type. Region flags mark the sub-trees where `this`
//! and `super` have restricted meaning.

use pullc_binder::{DeclId, SymbolId};

#[derive(Debug, Default)]
pub struct TypeCheckContext {
    enclosing_decls: Vec<DeclId>,
    /// One frame per function-like body: whether a `return <expr>` was seen.
    return_frames: Vec<bool>,
    contextual_types: Vec<Option<SymbolId>>,
    /// Inside the callee of a `super(...)` call.
    pub in_super_call_target: bool,
    /// Inside the arguments of a `super(...)` call.
    pub in_super_call_arguments: bool,
    /// Inside a constructor's parameter list.
    pub in_constructor_parameters: bool,
    /// Inside the module reference of an import declaration.
    pub in_import_declaration: bool,
    /// Inside the initializer of a static property.
    pub in_static_initializer: bool,
}

impl TypeCheckContext {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Enclosing declarations
    // =========================================================================

    pub fn push_decl(&mut self, decl: DeclId) {
        self.enclosing_decls.push(decl);
    }

    pub fn pop_decl(&mut self) -> Option<DeclId> {
        self.enclosing_decls.pop()
    }

    /// Innermost decl, or `NONE` outside any scope.
    pub fn enclosing_decl(&self) -> DeclId {
        self.enclosing_decls.last().copied().unwrap_or(DeclId::NONE)
    }

    /// Enclosing decls, innermost first.
    pub fn enclosing_decls(&self) -> impl Iterator<Item = DeclId> + '_ {
        self.enclosing_decls.iter().rev().copied()
    }

    pub fn depth(&self) -> usize {
        self.enclosing_decls.len()
    }

    // =========================================================================
    // Return tracking
    // =========================================================================

    pub fn push_return_frame(&mut self) {
        self.return_frames.push(false);
    }

    /// Pop the innermost frame; true when a value was returned in it.
    pub fn pop_return_frame(&mut self) -> bool {
        self.return_frames.pop().unwrap_or(false)
    }

    pub fn mark_return_with_value(&mut self) {
        if let Some(frame) = self.return_frames.last_mut() {
            *frame = true;
        }
    }

    pub fn in_function_body(&self) -> bool {
        !self.return_frames.is_empty()
    }

    // =========================================================================
    // Contextual types
    // =========================================================================

    pub fn push_contextual_type(&mut self, ty: Option<SymbolId>) {
        self.contextual_types.push(ty.filter(|t| t.is_some()));
    }

    pub fn pop_contextual_type(&mut self) {
        self.contextual_types.pop();
    }

    pub fn contextual_type(&self) -> Option<SymbolId> {
        self.contextual_types.last().copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_frames_nest() {
        let mut ctx = TypeCheckContext::new();
        ctx.push_return_frame();
        ctx.push_return_frame();
        ctx.mark_return_with_value();
        assert!(ctx.pop_return_frame());
        assert!(!ctx.pop_return_frame());
        assert!(!ctx.in_function_body());
    }

    #[test]
    fn contextual_types_follow_stack_discipline() {
        let mut ctx = TypeCheckContext::new();
        ctx.push_contextual_type(Some(SymbolId(3)));
        ctx.push_contextual_type(None);
        assert_eq!(ctx.contextual_type(), None);
        ctx.pop_contextual_type();
        assert_eq!(ctx.contextual_type(), Some(SymbolId(3)));
        ctx.pop_contextual_type();
        assert_eq!(ctx.contextual_type(), None);
    }
}
