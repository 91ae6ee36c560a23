//! The code generator is infallible by construction: it presupposes a
//! program that already passed type checking, so every case it matches
//! on should be exhaustively reachable. A [`CodeGenFault`] names what
//! invariant would have to be broken for that assumption to fail — a
//! missing symbol or a missing decoration. It is never returned as a
//! `Result`: the generator logs it with `warn!` and panics, the "this
//! should not happen" counterpart to the checker's recoverable
//! `SemError`s.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CodeGenFault {
    #[error("symbol '{name}' was not found in scope during code generation")]
    MissingSymbol { name: String },

    #[error("function '{name}' has no registered function type")]
    MissingFunctionType { name: String },
}
