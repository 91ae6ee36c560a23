//! Symbol entries: what a scope binds a name to.

use serde::{Deserialize, Serialize};
use slc_support::Position;
use slc_types::TypeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Function,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub name: String,
    pub kind: SymbolKind,
    pub ty: TypeId,
    /// Set for array parameters: the callee receives a pointer to the
    /// caller's storage rather than a private copy.
    pub by_reference: bool,
    pub pos: Position,
}

impl SymbolEntry {
    pub fn variable(name: impl Into<String>, ty: TypeId, pos: Position) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Variable,
            ty,
            by_reference: false,
            pos,
        }
    }

    pub fn parameter(name: impl Into<String>, ty: TypeId, by_reference: bool, pos: Position) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Parameter,
            ty,
            by_reference,
            pos,
        }
    }

    pub fn function(name: impl Into<String>, ty: TypeId, pos: Position) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Function,
            ty,
            by_reference: false,
            pos,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, SymbolKind::Function)
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self.kind, SymbolKind::Parameter)
    }
}
