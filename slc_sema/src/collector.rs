//! Symbol collector (phase A): walks the AST in declaration order,
//! building the scope tree and registering every function, parameter
//! and local variable. Duplicate names are reported but do not stop
//! the walk.

use log::debug;

use slc_ast::{Function, Program, TypeAst};
use slc_symbols::{ScopeId, SymbolEntry, SymbolTable};
use slc_types::{TypeId, TypeManager};

use crate::decoration::Decorations;
use crate::errors::SemError;
use crate::sink::ErrorSink;

/// Resolves a parsed [`TypeAst`] into an interned [`TypeId`], creating
/// array types as needed.
fn resolve_type(types: &mut TypeManager, ty: &TypeAst) -> TypeId {
    match ty {
        TypeAst::Integer => types.integer(),
        TypeAst::Float => types.float(),
        TypeAst::Boolean => types.boolean(),
        TypeAst::Character => types.character(),
        TypeAst::Array { size, elem } => {
            let elem_id = resolve_type(types, elem);
            types.array(elem_id, *size)
        }
    }
}

pub fn collect(
    program: &Program,
    types: &mut TypeManager,
    decorations: &mut Decorations,
    errors: &mut ErrorSink,
) -> SymbolTable {
    let mut symbols = SymbolTable::new();
    let global = symbols.global();
    decorations.set_scope(program.id, global);

    for function in &program.functions {
        declare_function(function, &mut symbols, global, types, errors);
    }

    let mut has_main = false;
    for function in &program.functions {
        if function.name == "main" && function.params.is_empty() && function.return_type.is_none() {
            has_main = true;
        }
    }
    if !has_main {
        errors.push(SemError::NoMainProperlyDeclared { position: program.pos });
    }

    for function in &program.functions {
        collect_function_body(function, &mut symbols, global, types, decorations, errors);
    }

    symbols
}

fn declare_function(
    function: &Function,
    symbols: &mut SymbolTable,
    global: ScopeId,
    types: &mut TypeManager,
    errors: &mut ErrorSink,
) {
    let param_types: Vec<TypeId> = function
        .params
        .iter()
        .map(|p| resolve_type(types, &p.ty))
        .collect();
    let ret = match &function.return_type {
        Some(t) => resolve_type(types, t),
        None => types.void(),
    };
    let fn_type = types.function(param_types, ret);
    let entry = SymbolEntry::function(function.name.clone(), fn_type, function.pos);
    if let Err(_existing) = symbols.declare(global, entry) {
        errors.push(SemError::DuplicateFunction {
            name: function.name.clone(),
            position: function.pos,
        });
    }
    debug!("registered function '{}'", function.name);
}

fn collect_function_body(
    function: &Function,
    symbols: &mut SymbolTable,
    global: ScopeId,
    types: &mut TypeManager,
    decorations: &mut Decorations,
    errors: &mut ErrorSink,
) {
    let scope = symbols.push_child(global);
    decorations.set_scope(function.id, scope);

    for param in &function.params {
        let ty = resolve_type(types, &param.ty);
        let by_reference = matches!(param.ty, TypeAst::Array { .. });
        let entry = SymbolEntry::parameter(param.name.clone(), ty, by_reference, param.pos);
        if let Err(_existing) = symbols.declare(scope, entry) {
            errors.push(SemError::DuplicateVariable {
                name: param.name.clone(),
                position: param.pos,
            });
        }
    }

    for decl in &function.locals {
        let ty = resolve_type(types, &decl.ty);
        for name in &decl.names {
            let entry = SymbolEntry::variable(name.clone(), ty, decl.pos);
            if let Err(_existing) = symbols.declare(scope, entry) {
                errors.push(SemError::DuplicateVariable {
                    name: name.clone(),
                    position: decl.pos,
                });
            }
        }
    }

    debug!("collected scope for function '{}'", function.name);
}
