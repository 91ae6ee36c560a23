//! Facade tying the three compiler phases together. A host binary
//! (parser plus CLI, outside this workspace) is expected to call
//! [`compile`] with a parsed [`Program`] and do something with the
//! resulting [`ProgramIR`] or reported errors; this crate owns none of
//! that surface itself.

use slc_ast::Program;
use slc_ir::ProgramIR;
use slc_sema::{CheckerConfig, SemError};

/// Runs symbol collection, type checking and code generation over
/// `program`. Returns the generated IR on success, or the sorted list
/// of semantic errors collected during analysis — code generation
/// never runs on a program that failed type checking.
pub fn compile(program: &Program) -> Result<ProgramIR, Vec<SemError>> {
    compile_with_config(program, CheckerConfig::default())
}

/// As [`compile`], but with an explicit [`CheckerConfig`] rather than
/// the default.
pub fn compile_with_config(program: &Program, config: CheckerConfig) -> Result<ProgramIR, Vec<SemError>> {
    let (symbols, types, decorations) = slc_sema::analyze(program, config)?;
    Ok(slc_ir::generate(program, &types, &symbols, &decorations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use slc_ast::{Expr, Literal, NodeIdGen, Statement};
    use slc_support::Position;

    #[test]
    fn compiles_a_minimal_program_to_a_single_subroutine() {
        let mut gen = NodeIdGen::new();
        let write_stmt = Statement::Write {
            value: Expr::Literal {
                id: gen.next(),
                value: Literal::Integer(3),
                pos: Position::start(),
            },
            pos: Position::start(),
        };
        let program = Program {
            id: gen.next(),
            functions: vec![slc_ast::Function {
                id: gen.next(),
                name: "main".to_string(),
                params: Vec::new(),
                return_type: None,
                locals: Vec::new(),
                body: vec![write_stmt],
                pos: Position::start(),
            }],
            pos: Position::start(),
        };
        let ir = compile(&program).expect("program type-checks");
        assert_eq!(ir.subroutines.len(), 1);
        assert_eq!(ir.subroutines[0].name, "main");
    }

    #[test]
    fn a_type_error_is_reported_and_never_reaches_code_generation() {
        let mut gen = NodeIdGen::new();
        let program = Program {
            id: gen.next(),
            functions: vec![slc_ast::Function {
                id: gen.next(),
                name: "helper".to_string(),
                params: Vec::new(),
                return_type: None,
                locals: Vec::new(),
                body: Vec::new(),
                pos: Position::start(),
            }],
            pos: Position::start(),
        };
        let errors = compile(&program).expect_err("missing main is reported");
        assert!(errors.iter().any(|e| matches!(e, SemError::NoMainProperlyDeclared { .. })));
    }
}
