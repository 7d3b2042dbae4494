//! Errors raised by the parameter binding layer.
//!
//! IR construction and comparison are infallible; only binding values to
//! parameters can fail.

use crate::Type;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    /// The name is reserved for the runtime's user context argument.
    #[error(
        "parameter name `{0}` is reserved; pass a custom user context to the runtime instead"
    )]
    ReservedName(String),

    /// A scalar value of the wrong numeric class.
    #[error("parameter `{name}` has type {expected} and cannot hold a {found} value")]
    TypeMismatch {
        name: String,
        expected: Type,
        found: &'static str,
    },

    /// An override whose type differs from the parameter it replaces.
    #[error("cannot map parameter `{name}` of type {expected} to one of type {found}")]
    MappedTypeMismatch {
        name: String,
        expected: Type,
        found: Type,
    },

    /// A scalar operation on a buffer parameter.
    #[error("parameter `{0}` is a buffer parameter")]
    NotScalar(String),

    /// A buffer operation on a scalar parameter.
    #[error("parameter `{0}` is a scalar parameter")]
    NotBuffer(String),

    /// A buffer whose element type or rank does not fit the parameter.
    #[error(
        "buffer of {found_ty} with {found_dims} dimension(s) does not fit parameter `{name}` \
         ({expected_ty}, {expected_dims} dimension(s))"
    )]
    BufferMismatch {
        name: String,
        expected_ty: Type,
        expected_dims: usize,
        found_ty: Type,
        found_dims: usize,
    },
}
