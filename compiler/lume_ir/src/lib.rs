//! Lume IR - the expression and statement node model.
//!
//! This crate contains the data structures shared by every pass that
//! inspects lowered IR:
//! - [`Type`]: scalar/vector element types
//! - [`Expr`] / [`Stmt`]: nullable, reference-counted node handles
//! - [`IrNodeType`]: the closed, ordered enumeration of node kinds
//! - [`Parameter`], [`Param`], [`ImageParam`], [`ParamMap`]: external
//!   scalar and buffer bindings and their invocation-time overrides
//!
//! # Design
//!
//! - **Shared, immutable nodes**: a node is built once and then shared by
//!   every parent that refers to it. Front-end IR is therefore a DAG, not a
//!   tree; identity (`same_as`) and value equality are distinct notions.
//! - **No cycles**: nodes cannot be mutated after construction, so a
//!   pointer cycle cannot be built. Loops refer back to their index by name.
//! - **Undefined handles**: `Expr::default()` / `Stmt::default()` are valid
//!   values used for absent optional children (no predicate, no else case).

mod attrs;
mod error;
mod expr;
mod node_type;
mod operators;
mod param_map;
mod parameter;
mod printer;
mod stmt;
mod ty;

pub use attrs::{DeviceApi, ForType, MemoryType, ModulusRemainder, Range};
pub use error::ParamError;
pub use expr::{Expr, ExprKind, ExprList, ExprNode};
pub use node_type::IrNodeType;
pub use operators::{BinaryOp, CallType, VectorReduceOp};
pub use param_map::{Mapped, ParamMap, ParamMapping};
pub use parameter::{
    user_context_value, Buffer, BufferSlot, ImageParam, Param, Parameter, ScalarType, ScalarValue,
    USER_CONTEXT_NAME,
};
pub use stmt::{Stmt, StmtKind, StmtNode};
pub use ty::{Type, TypeCode};
