//! Checker state and the node dispatcher.
//!
//! One `CheckerState` runs one type-check pass over every unit of a chain.
//! The pass draws a fresh phase number from the chain; a node is checked
//! at most once per phase no matter how many call sites reach it, which
//! lets declaration checks re-enter expressions the statement walk visits
//! again later.

use std::sync::Arc;

use pullc_binder::{DeclId, SemanticInfoChain, SymbolId, UnitId};
use pullc_common::diagnostics::Diagnostic;
use pullc_syntax::{NodeArena, NodeIndex, SyntaxKind};
use rustc_hash::FxHashMap;
use tracing::{debug, instrument, trace};

use crate::context::TypeCheckContext;
use crate::options::CheckerOptions;
use crate::resolver::PullTypeResolver;

/// Run a full type-check pass over every unit of `chain` and return the
/// diagnostics it produced, tagged with their unit.
pub fn check_program(chain: &mut SemanticInfoChain, options: &CheckerOptions) -> Vec<(UnitId, Diagnostic)> {
    let units = chain.unit_ids();
    let mut state = CheckerState::new(chain, options.clone());
    for unit in units {
        state.check_unit(unit);
    }
    state.into_diagnostics()
}

pub struct CheckerState<'c> {
    pub resolver: PullTypeResolver<'c>,
    pub ctx: TypeCheckContext,
    pub options: CheckerOptions,
    pub(crate) unit: UnitId,
    pub(crate) arena: Arc<NodeArena>,
    phase: u32,
    /// Phase in which each node was last checked.
    stamps: FxHashMap<(UnitId, NodeIndex), u32>,
}

impl<'c> CheckerState<'c> {
    pub fn new(chain: &'c mut SemanticInfoChain, options: CheckerOptions) -> Self {
        let phase = chain.next_type_check_phase();
        Self {
            resolver: PullTypeResolver::new(chain),
            ctx: TypeCheckContext::new(),
            options,
            unit: UnitId::NONE,
            arena: Arc::new(NodeArena::new()),
            phase,
            stamps: FxHashMap::default(),
        }
    }

    pub fn phase(&self) -> u32 {
        self.phase
    }

    pub fn into_diagnostics(self) -> Vec<(UnitId, Diagnostic)> {
        self.resolver.into_diagnostics()
    }

    /// Check every top-level statement of `unit`.
    #[instrument(level = "debug", skip(self), fields(unit = unit.0))]
    pub fn check_unit(&mut self, unit: UnitId) {
        let Some((arena, root, script)) = self
            .resolver
            .chain()
            .unit(unit)
            .map(|u| (Arc::clone(&u.arena), u.root, u.script_decl))
        else {
            return;
        };
        self.unit = unit;
        self.arena = Arc::clone(&arena);
        self.ctx = TypeCheckContext::new();

        let statements: Vec<NodeIndex> = arena
            .get(root)
            .and_then(|n| arena.get_source_file(n))
            .map(|f| f.statements.iter().collect())
            .unwrap_or_default();
        self.ctx.push_decl(script);
        for statement in statements {
            self.check_node(statement);
        }
        self.ctx.pop_decl();
        debug!(unit = unit.0, diagnostics = self.resolver.sink().len(), "unit checked");
    }

    // =========================================================================
    // Dispatcher
    // =========================================================================

    /// Stamp `node` with the current phase. False when it already carries
    /// this phase's stamp.
    pub(crate) fn mark_checked(&mut self, node: NodeIndex) -> bool {
        let key = (self.unit, node);
        match self.stamps.get(&key) {
            Some(&stamp) if stamp >= self.phase => false,
            _ => {
                self.stamps.insert(key, self.phase);
                true
            }
        }
    }

    /// Check any node: declarations, statements, type nodes and
    /// expressions.
    pub fn check_node(&mut self, node: NodeIndex) {
        if node.is_none() {
            return;
        }
        let Some(kind) = self.arena.kind(node) else {
            return;
        };
        if is_expression_kind(kind) {
            self.check_expression(node, None);
            return;
        }
        if !self.mark_checked(node) {
            return;
        }
        trace!(node = node.0, ?kind, "check node");
        match kind {
            SyntaxKind::VariableStatement => {
                let arena = Arc::clone(&self.arena);
                let declarations: Vec<NodeIndex> = arena
                    .get(node)
                    .and_then(|n| arena.get_variable_statement(n))
                    .map(|s| s.declarations.iter().collect())
                    .unwrap_or_default();
                for declaration in declarations {
                    self.check_node(declaration);
                }
            }
            SyntaxKind::VariableDeclaration => self.check_variable_declaration(node),
            SyntaxKind::FunctionDeclaration
            | SyntaxKind::MethodDeclaration
            | SyntaxKind::Constructor
            | SyntaxKind::GetAccessor
            | SyntaxKind::SetAccessor
            | SyntaxKind::MethodSignature
            | SyntaxKind::CallSignature
            | SyntaxKind::ConstructSignature
            | SyntaxKind::IndexSignature => self.check_function_like(node),
            SyntaxKind::Parameter => self.check_parameter(node),
            SyntaxKind::TypeParameter => self.check_type_parameter(node),
            SyntaxKind::PropertyDeclaration | SyntaxKind::PropertySignature => self.check_property_declaration(node),
            SyntaxKind::ClassDeclaration => self.check_class_declaration(node),
            SyntaxKind::InterfaceDeclaration => self.check_interface_declaration(node),
            SyntaxKind::ModuleDeclaration => self.check_module_declaration(node),
            SyntaxKind::EnumDeclaration => self.check_enum_declaration(node),
            SyntaxKind::ImportEqualsDeclaration => self.check_import_declaration(node),
            kind if kind.is_type_node() => {
                self.check_type_node(node);
            }
            _ => self.check_statement(node, kind),
        }
    }

    /// Resolve a type annotation and check the declarations nested in it.
    pub(crate) fn check_type_node(&mut self, node: NodeIndex) -> SymbolId {
        if node.is_none() {
            return SymbolId::NONE;
        }
        let unit = self.unit;
        let ty = self.resolver.resolve_type_node(unit, node);
        let arena = Arc::clone(&self.arena);
        let Some(n) = arena.get(node) else {
            return ty;
        };
        match n.kind {
            SyntaxKind::TypeLiteral => {
                if !self.mark_checked(node) {
                    return ty;
                }
                let decl = self.decl_of(node);
                let members: Vec<NodeIndex> = arena
                    .get_type_literal(n)
                    .map(|l| l.members.iter().collect())
                    .unwrap_or_default();
                self.ctx.push_decl(decl);
                for &member in &members {
                    self.check_node(member);
                }
                self.ctx.pop_decl();
                self.check_index_signatures_of(decl, &members);
            }
            SyntaxKind::FunctionType | SyntaxKind::ConstructorType => {
                if self.mark_checked(node) {
                    self.check_function_like_body(node);
                }
            }
            SyntaxKind::ArrayType => {
                if let Some(element) = arena.get_array_type(n).map(|a| a.element_type) {
                    self.check_type_node(element);
                }
            }
            SyntaxKind::TypeReference => {
                let arguments: Vec<NodeIndex> = arena
                    .get_type_ref(n)
                    .map(|r| r.type_arguments.iter().collect())
                    .unwrap_or_default();
                for argument in arguments {
                    self.check_type_node(argument);
                }
            }
            _ => {}
        }
        ty
    }

    // =========================================================================
    // Shared lookups
    // =========================================================================

    pub(crate) fn decl_of(&self, node: NodeIndex) -> DeclId {
        self.resolver.decl_for_node(self.unit, node)
    }

    pub(crate) fn symbol_of_decl(&self, decl: DeclId) -> SymbolId {
        self.resolver.chain().decls.symbol(decl)
    }

    pub(crate) fn decl_name(&self, decl: DeclId) -> String {
        self.resolver.decl(decl).map(|d| d.name.clone()).unwrap_or_default()
    }

    pub(crate) fn symbol_name(&self, symbol: SymbolId) -> String {
        self.resolver.chain().symbols.name(symbol).to_string()
    }
}

fn is_expression_kind(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Identifier
            | SyntaxKind::NumericLiteral
            | SyntaxKind::StringLiteral
            | SyntaxKind::RegularExpressionLiteral
            | SyntaxKind::TrueKeyword
            | SyntaxKind::FalseKeyword
            | SyntaxKind::NullKeyword
            | SyntaxKind::ThisKeyword
            | SyntaxKind::SuperKeyword
            | SyntaxKind::ArrayLiteralExpression
            | SyntaxKind::ObjectLiteralExpression
            | SyntaxKind::PropertyAccessExpression
            | SyntaxKind::ElementAccessExpression
            | SyntaxKind::CallExpression
            | SyntaxKind::NewExpression
            | SyntaxKind::TypeAssertionExpression
            | SyntaxKind::ParenthesizedExpression
            | SyntaxKind::FunctionExpression
            | SyntaxKind::ArrowFunction
            | SyntaxKind::PrefixUnaryExpression
            | SyntaxKind::PostfixUnaryExpression
            | SyntaxKind::TypeOfExpression
            | SyntaxKind::DeleteExpression
            | SyntaxKind::VoidExpression
            | SyntaxKind::BinaryExpression
            | SyntaxKind::ConditionalExpression
            | SyntaxKind::OmittedExpression
    )
}
