//! The output of code generation: an ordered list of subroutines.

use serde::{Deserialize, Serialize};

use crate::subroutine::SubroutineIR;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgramIR {
    pub subroutines: Vec<SubroutineIR>,
}

impl ProgramIR {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, subroutine: SubroutineIR) {
        self.subroutines.push(subroutine);
    }
}

impl std::fmt::Display for ProgramIR {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for sub in &self.subroutines {
            write!(f, "{}", sub)?;
        }
        Ok(())
    }
}
