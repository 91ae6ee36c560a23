//! Type checker (phase B): a single post-order traversal that writes
//! `(type, isLValue)` decorations onto every expression and
//! left-expression node and reports the semantic error taxonomy.

use log::trace;

use slc_ast::{BinaryOp, Expr, Function, LExpr, Literal, Program, Statement, UnaryOp};
use slc_symbols::{ScopeId, SymbolTable};
use slc_types::{RelOp, TypeId, TypeManager};

use crate::config::CheckerConfig;
use crate::decoration::Decorations;
use crate::errors::SemError;
use crate::sink::ErrorSink;

pub struct TypeChecker<'a> {
    types: &'a mut TypeManager,
    symbols: &'a SymbolTable,
    decorations: &'a mut Decorations,
    errors: &'a mut ErrorSink,
    config: CheckerConfig,
    current_return_type: Option<TypeId>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(
        types: &'a mut TypeManager,
        symbols: &'a SymbolTable,
        decorations: &'a mut Decorations,
        errors: &'a mut ErrorSink,
        config: CheckerConfig,
    ) -> Self {
        Self {
            types,
            symbols,
            decorations,
            errors,
            config,
            current_return_type: None,
        }
    }

    pub fn check_program(&mut self, program: &Program) {
        for function in &program.functions {
            self.check_function(function);
        }
    }

    fn check_function(&mut self, function: &Function) {
        trace!("entering function '{}'", function.name);
        let scope = self.decorations.scope_of(function.id);
        let fn_entry = self.symbols.lookup(self.symbols.global(), &function.name);
        self.current_return_type = fn_entry.and_then(|e| self.types.func_return(e.ty));

        for stmt in &function.body {
            self.check_statement(stmt, scope);
        }
        trace!("leaving function '{}'", function.name);
    }

    fn is_error(&self, ty: TypeId) -> bool {
        self.types.is_error(ty)
    }

    fn check_statement(&mut self, stmt: &Statement, scope: ScopeId) {
        match stmt {
            Statement::Assign { target, value, pos } => {
                let (left_ty, left_lvalue) = self.check_lexpr(target, scope);
                let right_ty = self.check_expr(value, scope);
                if !left_lvalue {
                    self.errors.push(SemError::NonReferenceableLeftExpr { position: *pos });
                } else if !self.is_error(left_ty)
                    && !self.is_error(right_ty)
                    && !self.types.copyable(left_ty, right_ty)
                {
                    self.errors.push(SemError::IncompatibleAssignment {
                        expected: self.types.to_string(left_ty),
                        actual: self.types.to_string(right_ty),
                        position: *pos,
                    });
                }
            }
            Statement::If {
                cond,
                then_branch,
                else_branch,
                pos,
            } => {
                self.require_boolean(cond, scope, *pos);
                for s in then_branch {
                    self.check_statement(s, scope);
                }
                if let Some(else_branch) = else_branch {
                    for s in else_branch {
                        self.check_statement(s, scope);
                    }
                }
            }
            Statement::While { cond, body, pos } => {
                self.require_boolean(cond, scope, *pos);
                for s in body {
                    self.check_statement(s, scope);
                }
            }
            Statement::ProcCall { name, args, pos } => {
                self.check_call(name, args, scope, *pos);
            }
            Statement::Read { target, pos } => {
                let (ty, is_lvalue) = self.check_lexpr(target, scope);
                if !is_lvalue {
                    self.errors.push(SemError::NonReferenceableExpression { position: *pos });
                } else if !self.is_error(ty) && !self.types.is_primitive(ty) {
                    self.errors.push(SemError::ReadWriteRequireBasic { position: *pos });
                }
            }
            Statement::Write { value, pos } => {
                let ty = self.check_expr(value, scope);
                if !self.is_error(ty) && !self.types.is_primitive(ty) {
                    self.errors.push(SemError::ReadWriteRequireBasic { position: *pos });
                }
            }
            Statement::WriteString { .. } => {}
            Statement::Return { value, pos } => {
                let expected = self.current_return_type;
                match (expected, value) {
                    (Some(ret), Some(expr)) if !self.types.is_void(ret) => {
                        let actual = self.check_expr(expr, scope);
                        if !self.is_error(actual) && !self.types.copyable(ret, actual) {
                            self.errors.push(SemError::IncompatibleReturn {
                                expected: self.types.to_string(ret),
                                actual: self.types.to_string(actual),
                                position: *pos,
                            });
                        }
                    }
                    (Some(ret), None) if !self.types.is_void(ret) => {
                        self.errors.push(SemError::IncompatibleReturn {
                            expected: self.types.to_string(ret),
                            actual: "void".to_string(),
                            position: *pos,
                        });
                    }
                    (_, Some(expr)) => {
                        let actual = self.check_expr(expr, scope);
                        self.errors.push(SemError::IncompatibleReturn {
                            expected: "void".to_string(),
                            actual: self.types.to_string(actual),
                            position: *pos,
                        });
                    }
                    (_, None) => {}
                }
            }
        }
    }

    fn require_boolean(&mut self, expr: &Expr, scope: ScopeId, pos: slc_support::Position) {
        let ty = self.check_expr(expr, scope);
        if !self.is_error(ty) && !self.types.is_boolean(ty) {
            self.errors.push(SemError::BooleanRequired { position: pos });
        }
    }

    fn check_lexpr(&mut self, lexpr: &LExpr, scope: ScopeId) -> (TypeId, bool) {
        let result = match lexpr {
            LExpr::Ident { name, pos, .. } => self.resolve_ident(name, scope, *pos),
            LExpr::Index { name, index, pos, .. } => {
                self.resolve_array_index(name, index, scope, *pos)
            }
        };
        self.decorations.decorate_expr(lexpr.id(), result.0, result.1);
        result
    }

    fn resolve_ident(&mut self, name: &str, scope: ScopeId, pos: slc_support::Position) -> (TypeId, bool) {
        match self.symbols.lookup(scope, name) {
            Some(entry) if entry.is_function() => (entry.ty, false),
            Some(entry) => (entry.ty, true),
            None => {
                self.errors.push(SemError::UndeclaredIdent {
                    name: name.to_string(),
                    position: pos,
                });
                (self.types.error(), true)
            }
        }
    }

    fn resolve_array_index(
        &mut self,
        name: &str,
        index: &Expr,
        scope: ScopeId,
        pos: slc_support::Position,
    ) -> (TypeId, bool) {
        let base = match self.symbols.lookup(scope, name) {
            Some(entry) => entry.ty,
            None => {
                self.errors.push(SemError::UndeclaredIdent {
                    name: name.to_string(),
                    position: pos,
                });
                self.types.error()
            }
        };
        let index_ty = self.check_expr(index, scope);
        if self.is_error(base) {
            return (self.types.error(), true);
        }
        if !self.types.is_array(base) {
            self.errors.push(SemError::NonArrayInArrayAccess {
                name: name.to_string(),
                position: pos,
            });
            return (self.types.error(), true);
        }
        if !self.is_error(index_ty) && !self.types.is_integer(index_ty) {
            self.errors.push(SemError::NonIntegerIndexInArrayAccess { position: pos });
        }
        (self.types.array_elem(base).unwrap_or_else(|| self.types.error()), true)
    }

    fn check_expr(&mut self, expr: &Expr, scope: ScopeId) -> TypeId {
        let (ty, is_lvalue) = match expr {
            Expr::Literal { value, .. } => (self.literal_type(value), false),
            Expr::Ident { name, pos, .. } => self.resolve_ident(name, scope, *pos),
            Expr::Index { name, index, pos, .. } => self.resolve_array_index(name, index, scope, *pos),
            Expr::Paren { inner, .. } => (self.check_expr(inner, scope), false),
            Expr::Unary { op, operand, pos, .. } => (self.check_unary(*op, operand, scope, *pos), false),
            Expr::Binary { op, lhs, rhs, pos, .. } => (self.check_binary(*op, lhs, rhs, scope, *pos), false),
            Expr::Call { name, args, pos, .. } => (self.check_call_expr(name, args, scope, *pos), false),
        };
        self.decorations.decorate_expr(expr.id(), ty, is_lvalue);
        ty
    }

    fn literal_type(&self, lit: &Literal) -> TypeId {
        match lit {
            Literal::Integer(_) => self.types.integer(),
            Literal::Float(_) => self.types.float(),
            Literal::Boolean(_) => self.types.boolean(),
            Literal::Character(_) => self.types.character(),
        }
    }

    fn check_unary(&mut self, op: UnaryOp, operand: &Expr, scope: ScopeId, pos: slc_support::Position) -> TypeId {
        let operand_ty = self.check_expr(operand, scope);
        if self.is_error(operand_ty) {
            return self.types.error();
        }
        match op {
            UnaryOp::Plus | UnaryOp::Minus => {
                if !self.types.is_numeric(operand_ty) {
                    self.errors.push(SemError::IncompatibleOperator {
                        operator: unary_op_str(op).to_string(),
                        operand_types: self.types.to_string(operand_ty),
                        position: pos,
                    });
                    return self.types.error();
                }
                if self.config.preserve_unary_integer_bug {
                    self.types.integer()
                } else {
                    operand_ty
                }
            }
            UnaryOp::Not => {
                if !self.types.is_boolean(operand_ty) {
                    self.errors.push(SemError::IncompatibleOperator {
                        operator: "not".to_string(),
                        operand_types: self.types.to_string(operand_ty),
                        position: pos,
                    });
                }
                self.types.boolean()
            }
        }
    }

    fn check_binary(
        &mut self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        scope: ScopeId,
        pos: slc_support::Position,
    ) -> TypeId {
        let lty = self.check_expr(lhs, scope);
        let rty = self.check_expr(rhs, scope);
        if self.is_error(lty) || self.is_error(rty) {
            return match op {
                BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                    self.types.boolean()
                }
                BinaryOp::And | BinaryOp::Or => self.types.boolean(),
                _ => self.types.error(),
            };
        }
        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                if !self.types.is_numeric(lty) || !self.types.is_numeric(rty) {
                    self.errors.push(SemError::IncompatibleOperator {
                        operator: binary_op_str(op).to_string(),
                        operand_types: format!("{}, {}", self.types.to_string(lty), self.types.to_string(rty)),
                        position: pos,
                    });
                    return self.types.error();
                }
                if self.types.is_float(lty) || self.types.is_float(rty) {
                    self.types.float()
                } else {
                    self.types.integer()
                }
            }
            BinaryOp::Mod => {
                if !self.types.is_integer(lty) || !self.types.is_integer(rty) {
                    self.errors.push(SemError::IncompatibleOperator {
                        operator: "%".to_string(),
                        operand_types: format!("{}, {}", self.types.to_string(lty), self.types.to_string(rty)),
                        position: pos,
                    });
                    return self.types.error();
                }
                self.types.integer()
            }
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                let rel = to_rel_op(op);
                if !self.types.comparable(lty, rty, rel) {
                    self.errors.push(SemError::IncompatibleOperator {
                        operator: binary_op_str(op).to_string(),
                        operand_types: format!("{}, {}", self.types.to_string(lty), self.types.to_string(rty)),
                        position: pos,
                    });
                }
                self.types.boolean()
            }
            BinaryOp::And | BinaryOp::Or => {
                if !self.types.is_boolean(lty) || !self.types.is_boolean(rty) {
                    self.errors.push(SemError::IncompatibleOperator {
                        operator: binary_op_str(op).to_string(),
                        operand_types: format!("{}, {}", self.types.to_string(lty), self.types.to_string(rty)),
                        position: pos,
                    });
                }
                self.types.boolean()
            }
        }
    }

    /// Shared by function-call expressions and procedure-call
    /// statements: both lower through the same call sequence (§4.C), so
    /// both check arguments under copy-compatibility (see design notes
    /// on the resolved Open Question).
    fn check_call(&mut self, name: &str, args: &[Expr], scope: ScopeId, pos: slc_support::Position) -> TypeId {
        let callee = self.symbols.lookup(self.symbols.global(), name).cloned();
        let entry = match callee {
            Some(entry) if entry.is_function() => entry,
            Some(_) => {
                self.errors.push(SemError::IsNotCallable {
                    name: name.to_string(),
                    position: pos,
                });
                for arg in args {
                    self.check_expr(arg, scope);
                }
                return self.types.error();
            }
            None => {
                self.errors.push(SemError::UndeclaredIdent {
                    name: name.to_string(),
                    position: pos,
                });
                for arg in args {
                    self.check_expr(arg, scope);
                }
                return self.types.error();
            }
        };

        let params: Vec<TypeId> = self.types.func_params(entry.ty).unwrap_or(&[]).to_vec();
        let ret = self.types.func_return(entry.ty).unwrap_or_else(|| self.types.void());

        if args.len() != params.len() {
            self.errors.push(SemError::NumberOfParameters {
                name: name.to_string(),
                expected: params.len(),
                actual: args.len(),
                position: pos,
            });
        }

        for (i, arg) in args.iter().enumerate() {
            let arg_ty = self.check_expr(arg, scope);
            if let Some(&param_ty) = params.get(i) {
                if !self.is_error(arg_ty) && !self.types.copyable(param_ty, arg_ty) {
                    self.errors.push(SemError::IncompatibleParameter {
                        index: i + 1,
                        expected: self.types.to_string(param_ty),
                        actual: self.types.to_string(arg_ty),
                        position: pos,
                    });
                }
            }
        }

        ret
    }

    fn check_call_expr(&mut self, name: &str, args: &[Expr], scope: ScopeId, pos: slc_support::Position) -> TypeId {
        let ret = self.check_call(name, args, scope, pos);
        if self.types.is_void(ret) {
            self.errors.push(SemError::IsNotFunction {
                name: name.to_string(),
                position: pos,
            });
        }
        ret
    }
}

fn to_rel_op(op: BinaryOp) -> RelOp {
    match op {
        BinaryOp::Eq => RelOp::Eq,
        BinaryOp::Ne => RelOp::Ne,
        BinaryOp::Lt => RelOp::Lt,
        BinaryOp::Le => RelOp::Le,
        BinaryOp::Gt => RelOp::Gt,
        BinaryOp::Ge => RelOp::Ge,
        _ => unreachable!("to_rel_op called with a non-relational operator"),
    }
}

fn binary_op_str(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::Eq => "==",
        BinaryOp::Ne => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::And => "and",
        BinaryOp::Or => "or",
    }
}

fn unary_op_str(op: UnaryOp) -> &'static str {
    match op {
        UnaryOp::Plus => "+",
        UnaryOp::Minus => "-",
        UnaryOp::Not => "not",
    }
}
