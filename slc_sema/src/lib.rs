//! Symbol collection and type checking: phases A and B of the
//! compiler core. Produces a populated symbol table and a decoration
//! store consumed by `slc_ir`'s code generator, or a non-empty,
//! source-ordered list of [`SemError`]s.

pub mod checker;
pub mod collector;
pub mod config;
pub mod decoration;
pub mod errors;
pub mod sink;

pub use checker::TypeChecker;
pub use config::CheckerConfig;
pub use decoration::Decorations;
pub use errors::SemError;
pub use sink::ErrorSink;

use slc_ast::Program;
use slc_symbols::SymbolTable;
use slc_types::TypeManager;

/// Runs the symbol collector and type checker over `program`. On
/// success returns the populated symbol table, type manager and
/// decoration store for the code generator; on failure returns the
/// accumulated errors in source order.
pub fn analyze(
    program: &Program,
    config: CheckerConfig,
) -> Result<(SymbolTable, TypeManager, Decorations), Vec<SemError>> {
    let mut types = TypeManager::new();
    let mut decorations = Decorations::new();
    let mut errors = ErrorSink::new();

    let symbols = collector::collect(program, &mut types, &mut decorations, &mut errors);
    if errors.has_errors() {
        return Err(errors.into_sorted());
    }

    let mut checker = TypeChecker::new(&mut types, &symbols, &mut decorations, &mut errors, config);
    checker.check_program(program);
    if errors.has_errors() {
        return Err(errors.into_sorted());
    }

    Ok((symbols, types, decorations))
}
