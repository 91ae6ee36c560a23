//! Code generator (phase C): walks the type-decorated AST and emits one
//! [`SubroutineIR`] per function. Grounded on
//! `examples/original_source/asl/CodeGenVisitor.cpp`, generalized to the
//! explicit array-by-reference/by-value split and array-copy loop
//! SPEC_FULL.md's §4.C names, and on `seen_ir::generator::GenerationContext`
//! for the per-subroutine register/label counter shape.

use log::{trace, warn};

use slc_ast::{BinaryOp, Expr, Function, LExpr, Literal, Program, Statement, UnaryOp};
use slc_sema::Decorations;
use slc_symbols::{ScopeId, SymbolTable};
use slc_types::{TypeId, TypeManager};

use crate::error::CodeGenFault;
use crate::instruction::Instruction;
use crate::program::ProgramIR;
use crate::subroutine::{SubroutineIR, SubroutineLocal, SubroutineParam};

/// Runs the code generator over an already type-checked `program`,
/// producing the program's IR. Panics if a decoration or symbol the
/// generator expects is missing — see [`CodeGenFault`].
pub fn generate(
    program: &Program,
    types: &TypeManager,
    symbols: &SymbolTable,
    decorations: &Decorations,
) -> ProgramIR {
    let mut out = ProgramIR::new();
    for function in &program.functions {
        out.push(generate_function(function, types, symbols, decorations));
    }
    out
}

fn generate_function(
    function: &Function,
    types: &TypeManager,
    symbols: &SymbolTable,
    decorations: &Decorations,
) -> SubroutineIR {
    trace!("entering function '{}'", function.name);
    let scope = decorations.scope_of(function.id);
    let fn_entry = symbols
        .lookup(symbols.global(), &function.name)
        .unwrap_or_else(|| fault(CodeGenFault::MissingFunctionType { name: function.name.clone() }));
    let return_type = types
        .func_return(fn_entry.ty)
        .unwrap_or_else(|| fault(CodeGenFault::MissingFunctionType { name: function.name.clone() }));

    let mut subr = SubroutineIR::new(function.name.clone());

    if !types.is_void(return_type) {
        subr.params.push(SubroutineParam {
            name: "_result".to_string(),
            ty: types.to_string(return_type),
            by_reference: false,
        });
    }

    for param in &function.params {
        let entry = lookup_local_or_fault(symbols, scope, &param.name);
        subr.params.push(SubroutineParam {
            name: param.name.clone(),
            ty: types.to_string(entry.ty),
            by_reference: entry.by_reference,
        });
    }

    for decl in &function.locals {
        for name in &decl.names {
            let entry = lookup_local_or_fault(symbols, scope, name);
            let (elem_ty, count) = match types.array_elem(entry.ty) {
                Some(elem) => (types.to_string(elem), types.array_size(entry.ty).unwrap_or(1)),
                None => (types.to_string(entry.ty), 1),
            };
            subr.locals.push(SubroutineLocal {
                name: name.clone(),
                elem_ty,
                count,
            });
        }
    }

    let mut gen = FunctionGen {
        types,
        symbols,
        decorations,
        scope,
        return_type,
        reg_counter: 0,
        label_counter: 0,
    };
    for stmt in &function.body {
        subr.instructions.extend(gen.lower_statement(stmt));
    }
    subr.instructions.push(Instruction::Return);

    trace!("leaving function '{}'", function.name);
    subr
}

fn lookup_local_or_fault<'a>(
    symbols: &'a SymbolTable,
    scope: ScopeId,
    name: &str,
) -> &'a slc_symbols::SymbolEntry {
    symbols
        .lookup_local(scope, name)
        .unwrap_or_else(|| fault(CodeGenFault::MissingSymbol { name: name.to_string() }))
}

fn fault(f: CodeGenFault) -> ! {
    warn!("{}", f);
    panic!("{}", f);
}

/// The `(address, offset, code)` triple every expression visitor
/// produces, per §4.C's expression lowering contract.
struct Lowered {
    address: String,
    offset: Option<String>,
    code: Vec<Instruction>,
}

impl Lowered {
    fn simple(address: impl Into<String>, code: Vec<Instruction>) -> Self {
        Self { address: address.into(), offset: None, code }
    }
}

/// Per-subroutine generation state: immutable references to the shared
/// services plus the two monotonic counters §4.C specifies, reset for
/// every function (never reused across subroutines).
struct FunctionGen<'a> {
    types: &'a TypeManager,
    symbols: &'a SymbolTable,
    decorations: &'a Decorations,
    scope: ScopeId,
    return_type: TypeId,
    reg_counter: u32,
    label_counter: u32,
}

impl<'a> FunctionGen<'a> {
    fn fresh_temp(&mut self) -> String {
        let n = self.reg_counter;
        self.reg_counter += 1;
        format!("%{}", n)
    }

    fn fresh_label(&mut self, category: &str) -> String {
        let n = self.label_counter;
        self.label_counter += 1;
        format!("label{}_{}", category, n)
    }

    fn symbol_by_reference(&self, name: &str) -> bool {
        self.symbols
            .lookup(self.scope, name)
            .unwrap_or_else(|| fault(CodeGenFault::MissingSymbol { name: name.to_string() }))
            .by_reference
    }

    /// Resolves any array-valued expression to the base-pointer operand
    /// later indexed opcodes consume. A bare identifier takes the
    /// parameter's forwarded pointer (by-reference) or an `ALOAD` of its
    /// own storage (by-value, §4.C); `Paren` is transparent (§3's
    /// `Paren` propagates the inner type unchanged); anything else
    /// (a function call returning an array) is lowered normally and its
    /// resulting address is already a base pointer, the same
    /// representation an array ever has once evaluated.
    fn array_value_base(&mut self, expr: &Expr, code: &mut Vec<Instruction>) -> String {
        match expr {
            Expr::Paren { inner, .. } => self.array_value_base(inner, code),
            Expr::Ident { name, .. } => {
                if self.symbol_by_reference(name) {
                    name.clone()
                } else {
                    let tmp = self.fresh_temp();
                    code.push(Instruction::ALoad { dst: tmp.clone(), symbol: name.clone() });
                    tmp
                }
            }
            _ => {
                let v = self.lower_expr(expr);
                code.extend(v.code);
                v.address
            }
        }
    }

    fn lower_statement(&mut self, stmt: &Statement) -> Vec<Instruction> {
        match stmt {
            Statement::Assign { target, value, .. } => self.lower_assign(target, value),
            Statement::If { cond, then_branch, else_branch, .. } => {
                self.lower_if(cond, then_branch, else_branch.as_deref())
            }
            Statement::While { cond, body, .. } => self.lower_while(cond, body),
            Statement::ProcCall { name, args, .. } => self.lower_call(name, args, false).code,
            Statement::Read { target, .. } => self.lower_read(target),
            Statement::Write { value, .. } => self.lower_write(value),
            Statement::WriteString { value, .. } => vec![Instruction::WriteS { value: value.clone() }],
            Statement::Return { value, .. } => self.lower_return(value.as_ref()),
        }
    }

    fn lower_assign(&mut self, target: &LExpr, value: &Expr) -> Vec<Instruction> {
        let left_ty = self.decorations.expr_type(target.id());
        let target_lowered = self.lower_lexpr(target);

        if target_lowered.offset.is_none() && self.types.is_array(left_ty) {
            return self.lower_array_copy(&target_lowered.address, left_ty, value, target_lowered.code);
        }

        let mut code = target_lowered.code;
        let right = self.lower_expr(value);
        code.extend(right.code);

        let right_ty = self.decorations.expr_type(value.id());
        let src = self.widen_if_needed(left_ty, right_ty, right.address, &mut code);

        match target_lowered.offset {
            Some(idx) => code.push(Instruction::XLoad { base: target_lowered.address, idx, src }),
            None => code.push(Instruction::Load { dst: target_lowered.address, src }),
        }
        code
    }

    /// §4.C.1: array-to-array assignment of equal size/element type
    /// lowers to an explicit element-wise copy loop over the static
    /// size carried on the array type, rather than a single `LOAD`.
    fn lower_array_copy(
        &mut self,
        dst_name: &str,
        array_ty: TypeId,
        value: &Expr,
        mut code: Vec<Instruction>,
    ) -> Vec<Instruction> {
        let size = self.types.array_size(array_ty).unwrap_or(0);

        let dstbase = if self.symbol_by_reference(dst_name) {
            dst_name.to_string()
        } else {
            let tmp = self.fresh_temp();
            code.push(Instruction::ALoad { dst: tmp.clone(), symbol: dst_name.to_string() });
            tmp
        };
        let srcbase = self.array_value_base(value, &mut code);

        let i = self.fresh_temp();
        let end = self.fresh_temp();
        let cond = self.fresh_temp();
        let tmp = self.fresh_temp();
        let base_label = self.fresh_label("FOR");
        let l_start = format!("{}_start", base_label);
        let l_end = format!("{}_end", base_label);

        code.push(Instruction::ILoad { dst: i.clone(), value: 0 });
        code.push(Instruction::ILoad { dst: end.clone(), value: size as i64 });
        code.push(Instruction::Label { name: l_start.clone() });
        code.push(Instruction::Lt { dst: cond.clone(), a: i.clone(), b: end.clone() });
        code.push(Instruction::FJump { cond: cond.clone(), label: l_end.clone() });
        code.push(Instruction::LoadX { dst: tmp.clone(), base: srcbase, idx: i.clone() });
        code.push(Instruction::XLoad { base: dstbase, idx: i.clone(), src: tmp });
        code.push(Instruction::Add { dst: i.clone(), a: i.clone(), b: "1".to_string() });
        code.push(Instruction::UJump { label: l_start });
        code.push(Instruction::Label { name: l_end });
        code
    }

    fn lower_if(
        &mut self,
        cond: &Expr,
        then_branch: &[Statement],
        else_branch: Option<&[Statement]>,
    ) -> Vec<Instruction> {
        let c = self.lower_expr(cond);
        let mut code = c.code;
        let base = self.fresh_label("IF");
        let l_end = format!("{}_end", base);

        match else_branch {
            None => {
                code.push(Instruction::FJump { cond: c.address, label: l_end.clone() });
                for s in then_branch {
                    code.extend(self.lower_statement(s));
                }
                code.push(Instruction::Label { name: l_end });
            }
            Some(else_stmts) => {
                let l_else = format!("{}_else", base);
                code.push(Instruction::FJump { cond: c.address, label: l_else.clone() });
                for s in then_branch {
                    code.extend(self.lower_statement(s));
                }
                code.push(Instruction::UJump { label: l_end.clone() });
                code.push(Instruction::Label { name: l_else });
                for s in else_stmts {
                    code.extend(self.lower_statement(s));
                }
                code.push(Instruction::Label { name: l_end });
            }
        }
        code
    }

    fn lower_while(&mut self, cond: &Expr, body: &[Statement]) -> Vec<Instruction> {
        let base = self.fresh_label("WHILE");
        let l_start = format!("{}_start", base);
        let l_end = format!("{}_end", base);

        let mut code = vec![Instruction::Label { name: l_start.clone() }];
        let c = self.lower_expr(cond);
        code.extend(c.code);
        code.push(Instruction::FJump { cond: c.address, label: l_end.clone() });
        for s in body {
            code.extend(self.lower_statement(s));
        }
        code.push(Instruction::UJump { label: l_start });
        code.push(Instruction::Label { name: l_end });
        code
    }

    fn lower_read(&mut self, target: &LExpr) -> Vec<Instruction> {
        let ty = self.decorations.expr_type(target.id());
        let lowered = self.lower_lexpr(target);
        let mut code = lowered.code;
        // An array element has no name of its own to read into directly;
        // read into a fresh temporary and store it through the indexed
        // opcode so the base pointer register is never clobbered.
        let read_dst = match &lowered.offset {
            Some(_) => self.fresh_temp(),
            None => lowered.address.clone(),
        };
        let read = match () {
            _ if self.types.is_integer(ty) || self.types.is_boolean(ty) => {
                Instruction::ReadI { dst: read_dst.clone() }
            }
            _ if self.types.is_float(ty) => Instruction::ReadF { dst: read_dst.clone() },
            _ if self.types.is_character(ty) => Instruction::ReadC { dst: read_dst.clone() },
            _ => fault(CodeGenFault::MissingSymbol { name: read_dst.clone() }),
        };
        code.push(read);
        if let Some(idx) = lowered.offset {
            code.push(Instruction::XLoad {
                base: lowered.address,
                idx,
                src: read_dst,
            });
        }
        code
    }

    fn lower_write(&mut self, value: &Expr) -> Vec<Instruction> {
        let ty = self.decorations.expr_type(value.id());
        let v = self.lower_expr(value);
        let mut code = v.code;
        let write = match () {
            _ if self.types.is_integer(ty) || self.types.is_boolean(ty) => {
                Instruction::WriteI { src: v.address }
            }
            _ if self.types.is_float(ty) => Instruction::WriteF { src: v.address },
            _ if self.types.is_character(ty) => Instruction::WriteC { src: v.address },
            _ => fault(CodeGenFault::MissingSymbol { name: v.address }),
        };
        code.push(write);
        code
    }

    fn lower_return(&mut self, value: Option<&Expr>) -> Vec<Instruction> {
        match value {
            // An array-typed return carries its value as a base pointer,
            // the same representation every other array location uses
            // (§4.C), so it goes through `array_value_base` rather than
            // the scalar widening path.
            Some(expr) if self.types.is_array(self.return_type) => {
                let mut code = Vec::new();
                let src = self.array_value_base(expr, &mut code);
                code.push(Instruction::Load { dst: "_result".to_string(), src });
                code.push(Instruction::Return);
                code
            }
            Some(expr) => {
                let v = self.lower_expr(expr);
                let mut code = v.code;
                let value_ty = self.decorations.expr_type(expr.id());
                let src = self.widen_if_needed(self.return_type, value_ty, v.address, &mut code);
                code.push(Instruction::Load { dst: "_result".to_string(), src });
                code.push(Instruction::Return);
                code
            }
            None => vec![Instruction::Return],
        }
    }

    /// §4.C widening: inserts an `INT_TO_FLOAT` (`FLOAT`) conversion
    /// into a fresh temporary whenever an Integer value is used where a
    /// Float is expected, and returns the operand to actually use.
    fn widen_if_needed(
        &mut self,
        expected: TypeId,
        actual: TypeId,
        addr: String,
        code: &mut Vec<Instruction>,
    ) -> String {
        if self.types.is_float(expected) && self.types.is_integer(actual) {
            let tmp = self.fresh_temp();
            code.push(Instruction::Float { dst: tmp.clone(), src: addr });
            tmp
        } else {
            addr
        }
    }

    fn lower_lexpr(&mut self, lexpr: &LExpr) -> Lowered {
        match lexpr {
            LExpr::Ident { name, .. } => Lowered::simple(name.clone(), Vec::new()),
            LExpr::Index { name, index, .. } => self.lower_array_base_and_index(name, index),
        }
    }

    fn lower_array_base_and_index(&mut self, name: &str, index: &Expr) -> Lowered {
        let mut code = Vec::new();
        let base = if self.symbol_by_reference(name) {
            name.to_string()
        } else {
            let tmp = self.fresh_temp();
            code.push(Instruction::ALoad { dst: tmp.clone(), symbol: name.to_string() });
            tmp
        };
        let idx = self.lower_expr(index);
        code.extend(idx.code);
        Lowered { address: base, offset: Some(idx.address), code }
    }

    fn lower_expr(&mut self, expr: &Expr) -> Lowered {
        match expr {
            Expr::Literal { value, .. } => self.lower_literal(value),
            Expr::Ident { name, .. } => Lowered::simple(name.clone(), Vec::new()),
            Expr::Index { name, index, .. } => {
                let base_idx = self.lower_array_base_and_index(name, index);
                let tmp = self.fresh_temp();
                let mut code = base_idx.code;
                code.push(Instruction::LoadX {
                    dst: tmp.clone(),
                    base: base_idx.address,
                    idx: base_idx.offset.expect("array index lowering always sets an offset"),
                });
                Lowered::simple(tmp, code)
            }
            Expr::Paren { inner, .. } => self.lower_expr(inner),
            Expr::Unary { op, operand, .. } => self.lower_unary(*op, operand),
            Expr::Binary { op, lhs, rhs, .. } => self.lower_binary(*op, lhs, rhs),
            Expr::Call { name, args, .. } => self.lower_call(name, args, true),
        }
    }

    fn lower_literal(&mut self, lit: &Literal) -> Lowered {
        let tmp = self.fresh_temp();
        let instr = match *lit {
            Literal::Integer(v) => Instruction::ILoad { dst: tmp.clone(), value: v },
            Literal::Float(v) => Instruction::FLoad { dst: tmp.clone(), value: v },
            Literal::Boolean(v) => Instruction::ILoad { dst: tmp.clone(), value: if v { 1 } else { 0 } },
            Literal::Character(v) => Instruction::ChLoad { dst: tmp.clone(), value: v },
        };
        Lowered::simple(tmp, vec![instr])
    }

    fn lower_unary(&mut self, op: UnaryOp, operand: &Expr) -> Lowered {
        let operand_ty = self.decorations.expr_type(operand.id());
        let v = self.lower_expr(operand);
        match op {
            UnaryOp::Plus => v,
            UnaryOp::Minus => {
                let tmp = self.fresh_temp();
                let mut code = v.code;
                let instr = if self.types.is_float(operand_ty) {
                    Instruction::FNeg { dst: tmp.clone(), a: v.address }
                } else {
                    Instruction::Neg { dst: tmp.clone(), a: v.address }
                };
                code.push(instr);
                Lowered::simple(tmp, code)
            }
            UnaryOp::Not => {
                let tmp = self.fresh_temp();
                let mut code = v.code;
                code.push(Instruction::Not { dst: tmp.clone(), a: v.address });
                Lowered::simple(tmp, code)
            }
        }
    }

    fn lower_binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Lowered {
        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                self.lower_arithmetic(op, lhs, rhs)
            }
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                self.lower_relational(op, lhs, rhs)
            }
            BinaryOp::And | BinaryOp::Or => self.lower_logical(op, lhs, rhs),
        }
    }

    fn lower_arithmetic(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Lowered {
        let lty = self.decorations.expr_type(lhs.id());
        let rty = self.decorations.expr_type(rhs.id());
        let l = self.lower_expr(lhs);
        let r = self.lower_expr(rhs);
        let mut code = l.code;
        code.extend(r.code);
        let mut laddr = l.address;
        let mut raddr = r.address;

        let result_is_float = self.types.is_float(lty) || self.types.is_float(rty);
        let tmp = self.fresh_temp();

        if result_is_float {
            laddr = self.widen_if_needed(self.types.float(), lty, laddr, &mut code);
            raddr = self.widen_if_needed(self.types.float(), rty, raddr, &mut code);
            let instr = match op {
                BinaryOp::Add => Instruction::FAdd { dst: tmp.clone(), a: laddr, b: raddr },
                BinaryOp::Sub => Instruction::FSub { dst: tmp.clone(), a: laddr, b: raddr },
                BinaryOp::Mul => Instruction::FMul { dst: tmp.clone(), a: laddr, b: raddr },
                BinaryOp::Div => Instruction::FDiv { dst: tmp.clone(), a: laddr, b: raddr },
                BinaryOp::Mod => unreachable!("% requires both operands to be Integer"),
                _ => unreachable!(),
            };
            code.push(instr);
        } else {
            match op {
                BinaryOp::Add => code.push(Instruction::Add { dst: tmp.clone(), a: laddr, b: raddr }),
                BinaryOp::Sub => code.push(Instruction::Sub { dst: tmp.clone(), a: laddr, b: raddr }),
                BinaryOp::Mul => code.push(Instruction::Mul { dst: tmp.clone(), a: laddr, b: raddr }),
                BinaryOp::Div => code.push(Instruction::Div { dst: tmp.clone(), a: laddr, b: raddr }),
                BinaryOp::Mod => {
                    // a % b = a - b * int(a / b); no dedicated MOD opcode.
                    code.push(Instruction::Div { dst: tmp.clone(), a: laddr.clone(), b: raddr.clone() });
                    code.push(Instruction::Mul { dst: tmp.clone(), a: raddr, b: tmp.clone() });
                    code.push(Instruction::Sub { dst: tmp.clone(), a: laddr, b: tmp.clone() });
                }
                _ => unreachable!(),
            }
        }
        Lowered::simple(tmp, code)
    }

    fn lower_relational(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Lowered {
        let lty = self.decorations.expr_type(lhs.id());
        let rty = self.decorations.expr_type(rhs.id());
        let l = self.lower_expr(lhs);
        let r = self.lower_expr(rhs);
        let mut code = l.code;
        code.extend(r.code);
        let mut laddr = l.address;
        let mut raddr = r.address;
        let tmp = self.fresh_temp();

        let use_float = self.types.is_float(lty) || self.types.is_float(rty);
        if use_float {
            laddr = self.widen_if_needed(self.types.float(), lty, laddr, &mut code);
            raddr = self.widen_if_needed(self.types.float(), rty, raddr, &mut code);
            match op {
                BinaryOp::Eq => code.push(Instruction::FEq { dst: tmp.clone(), a: laddr, b: raddr }),
                BinaryOp::Ne => {
                    code.push(Instruction::FEq { dst: tmp.clone(), a: laddr, b: raddr });
                    code.push(Instruction::Not { dst: tmp.clone(), a: tmp.clone() });
                }
                BinaryOp::Le => code.push(Instruction::FLe { dst: tmp.clone(), a: laddr, b: raddr }),
                BinaryOp::Lt => code.push(Instruction::FLt { dst: tmp.clone(), a: laddr, b: raddr }),
                BinaryOp::Ge => {
                    code.push(Instruction::FLt { dst: tmp.clone(), a: laddr, b: raddr });
                    code.push(Instruction::Not { dst: tmp.clone(), a: tmp.clone() });
                }
                BinaryOp::Gt => {
                    code.push(Instruction::FLe { dst: tmp.clone(), a: laddr, b: raddr });
                    code.push(Instruction::Not { dst: tmp.clone(), a: tmp.clone() });
                }
                _ => unreachable!("lower_relational called with a non-relational operator"),
            }
        } else {
            match op {
                BinaryOp::Eq => code.push(Instruction::Eq { dst: tmp.clone(), a: laddr, b: raddr }),
                BinaryOp::Ne => {
                    code.push(Instruction::Eq { dst: tmp.clone(), a: laddr, b: raddr });
                    code.push(Instruction::Not { dst: tmp.clone(), a: tmp.clone() });
                }
                BinaryOp::Le => code.push(Instruction::Le { dst: tmp.clone(), a: laddr, b: raddr }),
                BinaryOp::Lt => code.push(Instruction::Lt { dst: tmp.clone(), a: laddr, b: raddr }),
                BinaryOp::Ge => {
                    code.push(Instruction::Lt { dst: tmp.clone(), a: laddr, b: raddr });
                    code.push(Instruction::Not { dst: tmp.clone(), a: tmp.clone() });
                }
                BinaryOp::Gt => {
                    code.push(Instruction::Le { dst: tmp.clone(), a: laddr, b: raddr });
                    code.push(Instruction::Not { dst: tmp.clone(), a: tmp.clone() });
                }
                _ => unreachable!("lower_relational called with a non-relational operator"),
            }
        }
        Lowered::simple(tmp, code)
    }

    /// §4.C.2: `and`/`or` are eager — both operands are always
    /// evaluated and no branch is introduced.
    fn lower_logical(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Lowered {
        let l = self.lower_expr(lhs);
        let r = self.lower_expr(rhs);
        let mut code = l.code;
        code.extend(r.code);
        let tmp = self.fresh_temp();
        let instr = match op {
            BinaryOp::And => Instruction::And { dst: tmp.clone(), a: l.address, b: r.address },
            BinaryOp::Or => Instruction::Or { dst: tmp.clone(), a: l.address, b: r.address },
            _ => unreachable!("lower_logical called with a non-logical operator"),
        };
        code.push(instr);
        Lowered::simple(tmp, code)
    }

    /// Shared by function-call expressions and procedure-call
    /// statements (§4.C's function-call lowering, steps 1-5). Returns
    /// the `(address, offset, code)` triple. `used` distinguishes the
    /// two call contexts: an expression-context call (`used = true`)
    /// retrieves its non-void result into a usable temporary, while a
    /// statement-context call (`used = false`) still reserves and pops
    /// the result slot for a non-void callee, but discards it — two
    /// plain `POP`s, matching the seed scenario for `g(1);` as a
    /// statement.
    fn lower_call(&mut self, name: &str, args: &[Expr], used: bool) -> Lowered {
        let entry = self
            .symbols
            .lookup(self.symbols.global(), name)
            .unwrap_or_else(|| fault(CodeGenFault::MissingSymbol { name: name.to_string() }));
        let params: Vec<TypeId> = self.types.func_params(entry.ty).unwrap_or(&[]).to_vec();
        let ret = self.types.func_return(entry.ty).unwrap_or_else(|| self.types.void());
        let is_void = self.types.is_void(ret);

        let mut code = Vec::new();
        if !is_void {
            code.push(Instruction::Push { src: None });
        }

        for (i, arg) in args.iter().enumerate() {
            let param_ty = params.get(i).copied();
            let push_addr = self.lower_argument(arg, param_ty, &mut code);
            code.push(Instruction::Push { src: Some(push_addr) });
        }

        code.push(Instruction::Call { name: name.to_string() });

        for _ in args {
            code.push(Instruction::Pop { dst: None });
        }

        if is_void {
            Lowered { address: String::new(), offset: None, code }
        } else if used {
            let tmp = self.fresh_temp();
            code.push(Instruction::Pop { dst: Some(tmp.clone()) });
            Lowered::simple(tmp, code)
        } else {
            code.push(Instruction::Pop { dst: None });
            Lowered { address: String::new(), offset: None, code }
        }
    }

    fn lower_argument(&mut self, arg: &Expr, param_ty: Option<TypeId>, code: &mut Vec<Instruction>) -> String {
        let is_array_param = param_ty.map(|t| self.types.is_array(t)).unwrap_or(false);
        if is_array_param {
            self.array_value_base(arg, code)
        } else {
            let arg_ty = self.decorations.expr_type(arg.id());
            let v = self.lower_expr(arg);
            code.extend(v.code);
            match param_ty {
                Some(pty) => self.widen_if_needed(pty, arg_ty, v.address, code),
                None => v.address,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slc_ast::{NodeIdGen, Parameter, TypeAst, VarDecl};
    use slc_sema::CheckerConfig;
    use slc_support::Position;

    fn pos() -> Position {
        Position::start()
    }

    fn build_main_with_scalar_write() -> (Program, NodeIdGen) {
        let mut gen = NodeIdGen::new();
        let x_init = slc_ast::Statement::Assign {
            target: LExpr::Ident { id: gen.next(), name: "x".to_string(), pos: pos() },
            value: Expr::Literal { id: gen.next(), value: Literal::Integer(3), pos: pos() },
            pos: pos(),
        };
        let write_x = slc_ast::Statement::Write {
            value: Expr::Ident { id: gen.next(), name: "x".to_string(), pos: pos() },
            pos: pos(),
        };
        let main_fn = Function {
            id: gen.next(),
            name: "main".to_string(),
            params: Vec::new(),
            return_type: None,
            locals: vec![VarDecl { names: vec!["x".to_string()], ty: TypeAst::Integer, pos: pos() }],
            body: vec![x_init, write_x],
            pos: pos(),
        };
        let program = Program { id: gen.next(), functions: vec![main_fn], pos: pos() };
        (program, gen)
    }

    #[test]
    fn scalar_assign_then_write_matches_the_seed_scenario() {
        let (program, _gen) = build_main_with_scalar_write();
        let (symbols, types, decorations) =
            slc_sema::analyze(&program, CheckerConfig::default()).expect("program type-checks");
        let ir = generate(&program, &types, &symbols, &decorations);
        let main = &ir.subroutines[0];
        assert_eq!(
            main.instructions,
            vec![
                Instruction::ILoad { dst: "%0".to_string(), value: 3 },
                Instruction::Load { dst: "x".to_string(), src: "%0".to_string() },
                Instruction::WriteI { src: "x".to_string() },
                Instruction::Return,
            ]
        );
    }

    #[test]
    fn integer_to_float_widening_on_assignment_matches_the_seed_scenario() {
        let mut gen = NodeIdGen::new();
        let assign_b = slc_ast::Statement::Assign {
            target: LExpr::Ident { id: gen.next(), name: "b".to_string(), pos: pos() },
            value: Expr::Literal { id: gen.next(), value: Literal::Integer(2), pos: pos() },
            pos: pos(),
        };
        let assign_a = slc_ast::Statement::Assign {
            target: LExpr::Ident { id: gen.next(), name: "a".to_string(), pos: pos() },
            value: Expr::Ident { id: gen.next(), name: "b".to_string(), pos: pos() },
            pos: pos(),
        };
        let main_fn = Function {
            id: gen.next(),
            name: "main".to_string(),
            params: Vec::new(),
            return_type: None,
            locals: vec![
                VarDecl { names: vec!["a".to_string()], ty: TypeAst::Float, pos: pos() },
                VarDecl { names: vec!["b".to_string()], ty: TypeAst::Integer, pos: pos() },
            ],
            body: vec![assign_b, assign_a],
            pos: pos(),
        };
        let program = Program { id: gen.next(), functions: vec![main_fn], pos: pos() };
        let (symbols, types, decorations) =
            slc_sema::analyze(&program, CheckerConfig::default()).expect("program type-checks");
        let ir = generate(&program, &types, &symbols, &decorations);
        assert_eq!(
            ir.subroutines[0].instructions,
            vec![
                Instruction::ILoad { dst: "%0".to_string(), value: 2 },
                Instruction::Load { dst: "b".to_string(), src: "%0".to_string() },
                Instruction::Float { dst: "%1".to_string(), src: "b".to_string() },
                Instruction::Load { dst: "a".to_string(), src: "%1".to_string() },
                Instruction::Return,
            ]
        );
    }

    #[test]
    fn array_parameter_element_assignment_is_by_reference() {
        let mut gen = NodeIdGen::new();
        let assign = slc_ast::Statement::Assign {
            target: LExpr::Index {
                id: gen.next(),
                name: "a".to_string(),
                index: Box::new(Expr::Literal { id: gen.next(), value: Literal::Integer(0), pos: pos() }),
                pos: pos(),
            },
            value: Expr::Literal { id: gen.next(), value: Literal::Integer(7), pos: pos() },
            pos: pos(),
        };
        let f = Function {
            id: gen.next(),
            name: "f".to_string(),
            params: vec![Parameter {
                name: "a".to_string(),
                ty: TypeAst::Array { size: 4, elem: Box::new(TypeAst::Integer) },
                pos: pos(),
            }],
            return_type: None,
            locals: Vec::new(),
            body: vec![assign],
            pos: pos(),
        };
        let main_fn = Function {
            id: gen.next(),
            name: "main".to_string(),
            params: Vec::new(),
            return_type: None,
            locals: Vec::new(),
            body: Vec::new(),
            pos: pos(),
        };
        let program = Program { id: gen.next(), functions: vec![f, main_fn], pos: pos() };
        let (symbols, types, decorations) =
            slc_sema::analyze(&program, CheckerConfig::default()).expect("program type-checks");
        let ir = generate(&program, &types, &symbols, &decorations);
        let f_ir = &ir.subroutines[0];
        assert!(f_ir.params[0].by_reference);
        assert_eq!(
            f_ir.instructions,
            vec![
                Instruction::ILoad { dst: "%0".to_string(), value: 0 },
                Instruction::ILoad { dst: "%1".to_string(), value: 7 },
                Instruction::XLoad { base: "a".to_string(), idx: "%0".to_string(), src: "%1".to_string() },
                Instruction::Return,
            ]
        );
    }

    #[test]
    fn statement_call_to_a_non_void_function_discards_both_pops() {
        let mut gen = NodeIdGen::new();
        let g = Function {
            id: gen.next(),
            name: "g".to_string(),
            params: vec![Parameter { name: "x".to_string(), ty: TypeAst::Float, pos: pos() }],
            return_type: Some(TypeAst::Float),
            locals: Vec::new(),
            body: vec![slc_ast::Statement::Return {
                value: Some(Expr::Ident { id: gen.next(), name: "x".to_string(), pos: pos() }),
                pos: pos(),
            }],
            pos: pos(),
        };
        let call = slc_ast::Statement::ProcCall {
            name: "g".to_string(),
            args: vec![Expr::Literal { id: gen.next(), value: Literal::Integer(1), pos: pos() }],
            pos: pos(),
        };
        let main_fn = Function {
            id: gen.next(),
            name: "main".to_string(),
            params: Vec::new(),
            return_type: None,
            locals: Vec::new(),
            body: vec![call],
            pos: pos(),
        };
        let program = Program { id: gen.next(), functions: vec![g, main_fn], pos: pos() };
        let (symbols, types, decorations) =
            slc_sema::analyze(&program, CheckerConfig::default()).expect("program type-checks");
        let ir = generate(&program, &types, &symbols, &decorations);
        let main_ir = &ir.subroutines[1];
        assert_eq!(
            main_ir.instructions,
            vec![
                Instruction::Push { src: None },
                Instruction::ILoad { dst: "%0".to_string(), value: 1 },
                Instruction::Float { dst: "%1".to_string(), src: "%0".to_string() },
                Instruction::Push { src: Some("%1".to_string()) },
                Instruction::Call { name: "g".to_string() },
                Instruction::Pop { dst: None },
                Instruction::Pop { dst: None },
                Instruction::Return,
            ]
        );
    }

    #[test]
    fn array_to_array_assignment_lowers_to_an_element_wise_copy_loop() {
        let mut gen = NodeIdGen::new();
        let array_ty = TypeAst::Array { size: 3, elem: Box::new(TypeAst::Integer) };
        let assign = slc_ast::Statement::Assign {
            target: LExpr::Ident { id: gen.next(), name: "dst".to_string(), pos: pos() },
            value: Expr::Ident { id: gen.next(), name: "src".to_string(), pos: pos() },
            pos: pos(),
        };
        let main_fn = Function {
            id: gen.next(),
            name: "main".to_string(),
            params: Vec::new(),
            return_type: None,
            locals: vec![
                VarDecl { names: vec!["dst".to_string()], ty: array_ty.clone(), pos: pos() },
                VarDecl { names: vec!["src".to_string()], ty: array_ty, pos: pos() },
            ],
            body: vec![assign],
            pos: pos(),
        };
        let program = Program { id: gen.next(), functions: vec![main_fn], pos: pos() };
        let (symbols, types, decorations) =
            slc_sema::analyze(&program, CheckerConfig::default()).expect("program type-checks");
        let ir = generate(&program, &types, &symbols, &decorations);
        let instructions = &ir.subroutines[0].instructions;

        let alloads: Vec<_> = instructions
            .iter()
            .filter(|i| matches!(i, Instruction::ALoad { .. }))
            .collect();
        assert_eq!(alloads.len(), 2, "both locals are by-value, so each needs an ALOAD base pointer");

        let loadx_count = instructions.iter().filter(|i| matches!(i, Instruction::LoadX { .. })).count();
        let xload_count = instructions.iter().filter(|i| matches!(i, Instruction::XLoad { .. })).count();
        assert_eq!(loadx_count, 1, "the copy loop body reads one element per iteration, not unrolled");
        assert_eq!(xload_count, 1, "the copy loop body writes one element per iteration, not unrolled");

        let ilit_three = instructions
            .iter()
            .any(|i| matches!(i, Instruction::ILoad { value: 3, .. }));
        assert!(ilit_three, "the loop bound is the array's static size");
    }

    #[test]
    fn array_to_array_assignment_peels_a_parenthesized_source_instead_of_faulting() {
        let mut gen = NodeIdGen::new();
        let array_ty = TypeAst::Array { size: 3, elem: Box::new(TypeAst::Integer) };
        let paren_src = Expr::Paren {
            id: gen.next(),
            inner: Box::new(Expr::Ident { id: gen.next(), name: "src".to_string(), pos: pos() }),
            pos: pos(),
        };
        let assign = slc_ast::Statement::Assign {
            target: LExpr::Ident { id: gen.next(), name: "dst".to_string(), pos: pos() },
            value: paren_src,
            pos: pos(),
        };
        let main_fn = Function {
            id: gen.next(),
            name: "main".to_string(),
            params: Vec::new(),
            return_type: None,
            locals: vec![
                VarDecl { names: vec!["dst".to_string()], ty: array_ty.clone(), pos: pos() },
                VarDecl { names: vec!["src".to_string()], ty: array_ty, pos: pos() },
            ],
            body: vec![assign],
            pos: pos(),
        };
        let program = Program { id: gen.next(), functions: vec![main_fn], pos: pos() };
        let (symbols, types, decorations) =
            slc_sema::analyze(&program, CheckerConfig::default()).expect("program type-checks");
        let ir = generate(&program, &types, &symbols, &decorations);
        let instructions = &ir.subroutines[0].instructions;

        let alloads = instructions.iter().filter(|i| matches!(i, Instruction::ALoad { .. })).count();
        assert_eq!(alloads, 2, "Paren is transparent: the source still resolves to src's base pointer");
    }

    #[test]
    fn array_to_array_assignment_accepts_an_array_returning_call_as_its_source() {
        let mut gen = NodeIdGen::new();
        let array_ty = TypeAst::Array { size: 3, elem: Box::new(TypeAst::Integer) };
        let make = Function {
            id: gen.next(),
            name: "make".to_string(),
            params: Vec::new(),
            return_type: Some(array_ty.clone()),
            locals: vec![VarDecl { names: vec!["r".to_string()], ty: array_ty.clone(), pos: pos() }],
            body: vec![slc_ast::Statement::Return {
                value: Some(Expr::Ident { id: gen.next(), name: "r".to_string(), pos: pos() }),
                pos: pos(),
            }],
            pos: pos(),
        };
        let assign = slc_ast::Statement::Assign {
            target: LExpr::Ident { id: gen.next(), name: "dst".to_string(), pos: pos() },
            value: Expr::Call { id: gen.next(), name: "make".to_string(), args: Vec::new(), pos: pos() },
            pos: pos(),
        };
        let main_fn = Function {
            id: gen.next(),
            name: "main".to_string(),
            params: Vec::new(),
            return_type: None,
            locals: vec![VarDecl { names: vec!["dst".to_string()], ty: array_ty, pos: pos() }],
            body: vec![assign],
            pos: pos(),
        };
        let program = Program { id: gen.next(), functions: vec![make, main_fn], pos: pos() };
        let (symbols, types, decorations) =
            slc_sema::analyze(&program, CheckerConfig::default()).expect("program type-checks");
        let ir = generate(&program, &types, &symbols, &decorations);
        let main_ir = &ir.subroutines[1];

        assert!(
            main_ir.instructions.iter().any(|i| matches!(i, Instruction::Call { name } if name == "make")),
            "the array-valued call is still lowered through the normal PUSH/CALL/POP sequence"
        );
        let pops_with_dst = main_ir
            .instructions
            .iter()
            .filter(|i| matches!(i, Instruction::Pop { dst: Some(_) }))
            .count();
        assert_eq!(pops_with_dst, 1, "the popped result register is used directly as the copy's base pointer");
    }

    #[test]
    fn if_else_emits_the_macro_shape_from_the_seed_scenario() {
        let mut gen = NodeIdGen::new();
        let then_branch = vec![slc_ast::Statement::Assign {
            target: LExpr::Ident { id: gen.next(), name: "x".to_string(), pos: pos() },
            value: Expr::Literal { id: gen.next(), value: Literal::Integer(1), pos: pos() },
            pos: pos(),
        }];
        let else_branch = vec![slc_ast::Statement::Assign {
            target: LExpr::Ident { id: gen.next(), name: "x".to_string(), pos: pos() },
            value: Expr::Literal { id: gen.next(), value: Literal::Integer(2), pos: pos() },
            pos: pos(),
        }];
        let if_stmt = slc_ast::Statement::If {
            cond: Expr::Ident { id: gen.next(), name: "b".to_string(), pos: pos() },
            then_branch,
            else_branch: Some(else_branch),
            pos: pos(),
        };
        let main_fn = Function {
            id: gen.next(),
            name: "main".to_string(),
            params: Vec::new(),
            return_type: None,
            locals: vec![
                VarDecl { names: vec!["x".to_string()], ty: TypeAst::Integer, pos: pos() },
                VarDecl { names: vec!["b".to_string()], ty: TypeAst::Boolean, pos: pos() },
            ],
            body: vec![if_stmt],
            pos: pos(),
        };
        let program = Program { id: gen.next(), functions: vec![main_fn], pos: pos() };
        let (symbols, types, decorations) =
            slc_sema::analyze(&program, CheckerConfig::default()).expect("program type-checks");
        let ir = generate(&program, &types, &symbols, &decorations);
        assert_eq!(
            ir.subroutines[0].instructions,
            vec![
                Instruction::FJump { cond: "b".to_string(), label: "labelIF_0_else".to_string() },
                Instruction::ILoad { dst: "%0".to_string(), value: 1 },
                Instruction::Load { dst: "x".to_string(), src: "%0".to_string() },
                Instruction::UJump { label: "labelIF_0_end".to_string() },
                Instruction::Label { name: "labelIF_0_else".to_string() },
                Instruction::ILoad { dst: "%1".to_string(), value: 2 },
                Instruction::Load { dst: "x".to_string(), src: "%1".to_string() },
                Instruction::Label { name: "labelIF_0_end".to_string() },
                Instruction::Return,
            ]
        );
    }

    #[test]
    fn every_referenced_label_has_exactly_one_definition() {
        let mut gen = NodeIdGen::new();
        let body = vec![slc_ast::Statement::While {
            cond: Expr::Ident { id: gen.next(), name: "b".to_string(), pos: pos() },
            body: Vec::new(),
            pos: pos(),
        }];
        let main_fn = Function {
            id: gen.next(),
            name: "main".to_string(),
            params: Vec::new(),
            return_type: None,
            locals: vec![VarDecl { names: vec!["b".to_string()], ty: TypeAst::Boolean, pos: pos() }],
            body,
            pos: pos(),
        };
        let program = Program { id: gen.next(), functions: vec![main_fn], pos: pos() };
        let (symbols, types, decorations) =
            slc_sema::analyze(&program, CheckerConfig::default()).expect("program type-checks");
        let ir = generate(&program, &types, &symbols, &decorations);

        let mut defined = std::collections::HashSet::new();
        let mut referenced = Vec::new();
        for instr in &ir.subroutines[0].instructions {
            match instr {
                Instruction::Label { name } => {
                    assert!(defined.insert(name.clone()), "label '{}' defined twice", name);
                }
                Instruction::UJump { label } => referenced.push(label.clone()),
                Instruction::FJump { label, .. } => referenced.push(label.clone()),
                _ => {}
            }
        }
        for label in referenced {
            assert!(defined.contains(&label), "label '{}' referenced but never defined", label);
        }
    }
}
