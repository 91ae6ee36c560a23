//! Code generation: phase C of the compiler core. Consumes the symbol
//! table, type manager and decoration store `slc_sema` produces and
//! emits a three-address [`ProgramIR`].

pub mod error;
pub mod generator;
pub mod instruction;
pub mod program;
pub mod subroutine;

pub use error::CodeGenFault;
pub use generator::generate;
pub use instruction::Instruction;
pub use program::ProgramIR;
pub use subroutine::{SubroutineIR, SubroutineLocal, SubroutineParam};
