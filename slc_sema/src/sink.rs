//! Append-only error collection. Errors are collected, not thrown:
//! every phase that can fail takes `&mut ErrorSink` instead of
//! returning `Result`, and keeps walking past the first problem.

use crate::errors::SemError;

#[derive(Debug, Default, Clone)]
pub struct ErrorSink {
    errors: Vec<SemError>,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn push(&mut self, error: SemError) {
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consumes the sink, returning its errors sorted in source order.
    pub fn into_sorted(mut self) -> Vec<SemError> {
        self.errors.sort_by_key(|e| e.position());
        self.errors
    }

    /// Consumes the sink, rendering every error as a [`slc_support::Diagnostic`]
    /// and sorting the result by source position for final printing.
    pub fn into_diagnostics(self) -> Vec<slc_support::Diagnostic> {
        let mut diagnostics: Vec<slc_support::Diagnostic> =
            self.errors.iter().map(SemError::to_diagnostic).collect();
        slc_support::sort_by_position(&mut diagnostics);
        diagnostics
    }
}
