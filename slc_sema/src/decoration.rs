//! Side-table mapping AST node identity to the facts the type checker
//! establishes about it. Written exclusively by the checker, read
//! exclusively by the code generator; never fed back into the AST or
//! symbol table.

use std::collections::HashMap;

use slc_ast::NodeId;
use slc_symbols::ScopeId;
use slc_types::TypeId;

#[derive(Debug, Clone, Copy)]
struct ExprDecoration {
    ty: TypeId,
    is_lvalue: bool,
}

#[derive(Debug, Default)]
pub struct Decorations {
    expressions: HashMap<NodeId, ExprDecoration>,
    scopes: HashMap<NodeId, ScopeId>,
}

impl Decorations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decorate_expr(&mut self, id: NodeId, ty: TypeId, is_lvalue: bool) {
        self.expressions.insert(id, ExprDecoration { ty, is_lvalue });
    }

    pub fn expr_type(&self, id: NodeId) -> TypeId {
        self.expressions
            .get(&id)
            .unwrap_or_else(|| panic!("node {:?} was never type-decorated", id))
            .ty
    }

    pub fn is_lvalue(&self, id: NodeId) -> bool {
        self.expressions
            .get(&id)
            .unwrap_or_else(|| panic!("node {:?} was never type-decorated", id))
            .is_lvalue
    }

    pub fn set_scope(&mut self, id: NodeId, scope: ScopeId) {
        self.scopes.insert(id, scope);
    }

    pub fn scope_of(&self, id: NodeId) -> ScopeId {
        *self
            .scopes
            .get(&id)
            .unwrap_or_else(|| panic!("node {:?} was never assigned a scope", id))
    }
}
