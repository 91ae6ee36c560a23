//! Scoped symbol resolution: the scope tree built by the symbol
//! collector and consulted by the type checker and code generator.

pub mod scope;
pub mod symbol;

pub use scope::{ScopeId, SymbolTable};
pub use symbol::{SymbolEntry, SymbolKind};
