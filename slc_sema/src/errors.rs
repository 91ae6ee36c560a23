//! The semantic error taxonomy. Every variant carries the offending
//! source position; type names are pre-rendered strings (via
//! [`slc_types::TypeManager::to_string`]) rather than `TypeId`s, so an
//! error outlives the type manager that produced it.

use slc_support::{Diagnostic, Position};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SemError {
    #[error("undeclared identifier '{name}' at {position}")]
    UndeclaredIdent { name: String, position: Position },

    #[error("program does not declare 'main' with no parameters and void return, at {position}")]
    NoMainProperlyDeclared { position: Position },

    #[error("cannot assign {actual} to {expected} at {position}")]
    IncompatibleAssignment {
        expected: String,
        actual: String,
        position: Position,
    },

    #[error("cannot return {actual} from a function declared to return {expected}, at {position}")]
    IncompatibleReturn {
        expected: String,
        actual: String,
        position: Position,
    },

    #[error("operator '{operator}' is not defined for operand type(s) {operand_types} at {position}")]
    IncompatibleOperator {
        operator: String,
        operand_types: String,
        position: Position,
    },

    #[error("argument {index} has type {actual}, expected {expected}, at {position}")]
    IncompatibleParameter {
        index: usize,
        expected: String,
        actual: String,
        position: Position,
    },

    #[error("left-hand side of assignment is not a referenceable location at {position}")]
    NonReferenceableLeftExpr { position: Position },

    #[error("expression is not a referenceable location at {position}")]
    NonReferenceableExpression { position: Position },

    #[error("boolean expression required at {position}")]
    BooleanRequired { position: Position },

    #[error("read/write operands must be of a primitive type at {position}")]
    ReadWriteRequireBasic { position: Position },

    #[error("'{name}' is not an array at {position}")]
    NonArrayInArrayAccess { name: String, position: Position },

    #[error("array index must be of type int at {position}")]
    NonIntegerIndexInArrayAccess { position: Position },

    #[error("'{name}' is not callable at {position}")]
    IsNotCallable { name: String, position: Position },

    #[error("'{name}' does not return a value and cannot be used as an expression, at {position}")]
    IsNotFunction { name: String, position: Position },

    #[error("'{name}' expects {expected} argument(s), found {actual}, at {position}")]
    NumberOfParameters {
        name: String,
        expected: usize,
        actual: usize,
        position: Position,
    },

    #[error("variable '{name}' is already declared in this scope at {position}")]
    DuplicateVariable { name: String, position: Position },

    #[error("function '{name}' is already declared at {position}")]
    DuplicateFunction { name: String, position: Position },
}

impl SemError {
    pub fn position(&self) -> Position {
        match self {
            SemError::UndeclaredIdent { position, .. }
            | SemError::NoMainProperlyDeclared { position }
            | SemError::IncompatibleAssignment { position, .. }
            | SemError::IncompatibleReturn { position, .. }
            | SemError::IncompatibleOperator { position, .. }
            | SemError::IncompatibleParameter { position, .. }
            | SemError::NonReferenceableLeftExpr { position }
            | SemError::NonReferenceableExpression { position }
            | SemError::BooleanRequired { position }
            | SemError::ReadWriteRequireBasic { position }
            | SemError::NonArrayInArrayAccess { position, .. }
            | SemError::NonIntegerIndexInArrayAccess { position }
            | SemError::IsNotCallable { position, .. }
            | SemError::IsNotFunction { position, .. }
            | SemError::NumberOfParameters { position, .. }
            | SemError::DuplicateVariable { position, .. }
            | SemError::DuplicateFunction { position, .. } => *position,
        }
    }

    /// Renders this error as the severity-tagged, position-sortable
    /// record the surrounding CLI (§7's "human-readable list to
    /// standard error") prints, rather than a caller matching on
    /// `to_string()`.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.position(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_readable_message() {
        let err = SemError::IncompatibleParameter {
            index: 1,
            expected: "float".to_string(),
            actual: "bool".to_string(),
            position: Position::start(),
        };
        assert!(err.to_string().contains("argument 1"));
    }

    #[test]
    fn converts_to_a_diagnostic_carrying_the_same_position_and_message() {
        let err = SemError::BooleanRequired { position: Position::new(2, 5, 12) };
        let diag = err.to_diagnostic();
        assert_eq!(diag.position, err.position());
        assert_eq!(diag.message, err.to_string());
        assert_eq!(diag.severity, slc_support::Severity::Error);
    }
}
