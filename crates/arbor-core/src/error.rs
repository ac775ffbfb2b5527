//! Validation errors for core identity types.

use thiserror::Error;

/// Errors raised when constructing core identity values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The namespace component is empty.
    #[error("namespace must be non-empty")]
    EmptyNamespace,

    /// The local-name component is empty.
    #[error("local name must be non-empty")]
    EmptyLocalName,

    /// A revision string does not have the `YYYY-MM-DD` shape.
    #[error("invalid revision `{0}`: expected YYYY-MM-DD")]
    InvalidRevision(String),
}
