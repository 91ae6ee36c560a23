//! The per-function unit of emitted IR.

use serde::{Deserialize, Serialize};

use crate::instruction::Instruction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubroutineParam {
    pub name: String,
    pub ty: String,
    pub by_reference: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubroutineLocal {
    pub name: String,
    /// Element type for arrays, the scalar's own type otherwise.
    pub elem_ty: String,
    /// 1 for a scalar, the element count for an array.
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubroutineIR {
    pub name: String,
    pub params: Vec<SubroutineParam>,
    pub locals: Vec<SubroutineLocal>,
    pub instructions: Vec<Instruction>,
}

impl SubroutineIR {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            locals: Vec::new(),
            instructions: Vec::new(),
        }
    }
}

impl std::fmt::Display for SubroutineIR {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "subroutine {}", self.name)?;
        for p in &self.params {
            writeln!(f, "  param {}: {}{}", p.name, p.ty, if p.by_reference { " (by-ref)" } else { "" })?;
        }
        for l in &self.locals {
            writeln!(f, "  local {}: {} x{}", l.name, l.elem_ty, l.count)?;
        }
        for instr in &self.instructions {
            writeln!(f, "  {}", instr)?;
        }
        Ok(())
    }
}
