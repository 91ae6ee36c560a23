//! Abstract syntax tree definitions for the Source Language, the input
//! contract this compiler core's phases operate on.

pub mod ast;
pub mod node_id;

pub use ast::{
    BinaryOp, Expr, Function, LExpr, Literal, Parameter, Program, Statement, TypeAst, UnaryOp,
    VarDecl,
};
pub use node_id::{NodeId, NodeIdGen};
