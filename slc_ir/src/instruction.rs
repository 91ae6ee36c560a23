//! The three-address instruction set this core emits. Operands are
//! plain strings: virtual registers (sigil-prefixed, e.g. `%3`),
//! symbol names, or literal values — there is no further instruction
//! selection pass downstream of this core.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    Load { dst: String, src: String },
    ILoad { dst: String, value: i64 },
    FLoad { dst: String, value: f64 },
    ChLoad { dst: String, value: char },
    ALoad { dst: String, symbol: String },
    LoadX { dst: String, base: String, idx: String },
    XLoad { base: String, idx: String, src: String },

    Add { dst: String, a: String, b: String },
    Sub { dst: String, a: String, b: String },
    Mul { dst: String, a: String, b: String },
    Div { dst: String, a: String, b: String },
    Neg { dst: String, a: String },

    FAdd { dst: String, a: String, b: String },
    FSub { dst: String, a: String, b: String },
    FMul { dst: String, a: String, b: String },
    FDiv { dst: String, a: String, b: String },
    FNeg { dst: String, a: String },

    And { dst: String, a: String, b: String },
    Or { dst: String, a: String, b: String },
    Not { dst: String, a: String },

    Eq { dst: String, a: String, b: String },
    Lt { dst: String, a: String, b: String },
    Le { dst: String, a: String, b: String },
    FEq { dst: String, a: String, b: String },
    FLt { dst: String, a: String, b: String },
    FLe { dst: String, a: String, b: String },

    /// Integer -> Float widening.
    Float { dst: String, src: String },

    ReadI { dst: String },
    ReadF { dst: String },
    ReadC { dst: String },

    WriteI { src: String },
    WriteF { src: String },
    WriteC { src: String },
    WriteS { value: String },

    Push { src: Option<String> },
    Pop { dst: Option<String> },

    Call { name: String },

    Label { name: String },
    UJump { label: String },
    FJump { cond: String, label: String },

    Return,
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Load { dst, src } => write!(f, "LOAD {}, {}", dst, src),
            Instruction::ILoad { dst, value } => write!(f, "ILOAD {}, {}", dst, value),
            Instruction::FLoad { dst, value } => write!(f, "FLOAD {}, {}", dst, value),
            Instruction::ChLoad { dst, value } => write!(f, "CHLOAD {}, '{}'", dst, value),
            Instruction::ALoad { dst, symbol } => write!(f, "ALOAD {}, {}", dst, symbol),
            Instruction::LoadX { dst, base, idx } => write!(f, "LOADX {}, {}, {}", dst, base, idx),
            Instruction::XLoad { base, idx, src } => write!(f, "XLOAD {}, {}, {}", base, idx, src),
            Instruction::Add { dst, a, b } => write!(f, "ADD {}, {}, {}", dst, a, b),
            Instruction::Sub { dst, a, b } => write!(f, "SUB {}, {}, {}", dst, a, b),
            Instruction::Mul { dst, a, b } => write!(f, "MUL {}, {}, {}", dst, a, b),
            Instruction::Div { dst, a, b } => write!(f, "DIV {}, {}, {}", dst, a, b),
            Instruction::Neg { dst, a } => write!(f, "NEG {}, {}", dst, a),
            Instruction::FAdd { dst, a, b } => write!(f, "FADD {}, {}, {}", dst, a, b),
            Instruction::FSub { dst, a, b } => write!(f, "FSUB {}, {}, {}", dst, a, b),
            Instruction::FMul { dst, a, b } => write!(f, "FMUL {}, {}, {}", dst, a, b),
            Instruction::FDiv { dst, a, b } => write!(f, "FDIV {}, {}, {}", dst, a, b),
            Instruction::FNeg { dst, a } => write!(f, "FNEG {}, {}", dst, a),
            Instruction::And { dst, a, b } => write!(f, "AND {}, {}, {}", dst, a, b),
            Instruction::Or { dst, a, b } => write!(f, "OR {}, {}, {}", dst, a, b),
            Instruction::Not { dst, a } => write!(f, "NOT {}, {}", dst, a),
            Instruction::Eq { dst, a, b } => write!(f, "EQ {}, {}, {}", dst, a, b),
            Instruction::Lt { dst, a, b } => write!(f, "LT {}, {}, {}", dst, a, b),
            Instruction::Le { dst, a, b } => write!(f, "LE {}, {}, {}", dst, a, b),
            Instruction::FEq { dst, a, b } => write!(f, "FEQ {}, {}, {}", dst, a, b),
            Instruction::FLt { dst, a, b } => write!(f, "FLT {}, {}, {}", dst, a, b),
            Instruction::FLe { dst, a, b } => write!(f, "FLE {}, {}, {}", dst, a, b),
            Instruction::Float { dst, src } => write!(f, "FLOAT {}, {}", dst, src),
            Instruction::ReadI { dst } => write!(f, "READI {}", dst),
            Instruction::ReadF { dst } => write!(f, "READF {}", dst),
            Instruction::ReadC { dst } => write!(f, "READC {}", dst),
            Instruction::WriteI { src } => write!(f, "WRITEI {}", src),
            Instruction::WriteF { src } => write!(f, "WRITEF {}", src),
            Instruction::WriteC { src } => write!(f, "WRITEC {}", src),
            Instruction::WriteS { value } => write!(f, "WRITES {:?}", value),
            Instruction::Push { src: Some(src) } => write!(f, "PUSH {}", src),
            Instruction::Push { src: None } => write!(f, "PUSH"),
            Instruction::Pop { dst: Some(dst) } => write!(f, "POP {}", dst),
            Instruction::Pop { dst: None } => write!(f, "POP"),
            Instruction::Call { name } => write!(f, "CALL {}", name),
            Instruction::Label { name } => write!(f, "LABEL {}", name),
            Instruction::UJump { label } => write!(f, "UJUMP {}", label),
            Instruction::FJump { cond, label } => write!(f, "FJUMP {}, {}", cond, label),
            Instruction::Return => write!(f, "RETURN"),
        }
    }
}
