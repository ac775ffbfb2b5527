//! # Scalar Values
//!
//! The payload of leaf and leaf-list nodes. Each value carries its
//! own kind so the codecs can check it against the schema's declared
//! leaf type without inspecting the schema twice.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::qname::QName;

/// A leaf payload.
///
/// `Enum` holds the assigned enumeration label; membership in the
/// schema's declared value set is checked by the codecs. `IdentityRef`
/// names another schema identity and is rendered `namespace:local` on
/// the wire when the namespace differs from the leaf's own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarValue {
    Int64(i64),
    Uint64(u64),
    Boolean(bool),
    String(String),
    Enum(String),
    IdentityRef(QName),
}

impl ScalarValue {
    /// The kind tag of this value.
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Int64(_) => ScalarKind::Int64,
            Self::Uint64(_) => ScalarKind::Uint64,
            Self::Boolean(_) => ScalarKind::Boolean,
            Self::String(_) => ScalarKind::String,
            Self::Enum(_) => ScalarKind::Enumeration,
            Self::IdentityRef(_) => ScalarKind::IdentityRef,
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int64(v) => write!(f, "{v}"),
            Self::Uint64(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::String(v) | Self::Enum(v) => f.write_str(v),
            Self::IdentityRef(q) => write!(f, "{q}"),
        }
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<u64> for ScalarValue {
    fn from(v: u64) -> Self {
        Self::Uint64(v)
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// Kind tag for scalar values, used in type checks and error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScalarKind {
    Int64,
    Uint64,
    Boolean,
    String,
    Enumeration,
    IdentityRef,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int64 => "int64",
            Self::Uint64 => "uint64",
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Enumeration => "enumeration",
            Self::IdentityRef => "identity-ref",
        };
        f.write_str(name)
    }
}
