//! # Qualified Names
//!
//! A [`QName`] is the `(namespace, revision, local name)` triple that
//! uniquely identifies a schema node within its sibling scope. The
//! revision is the optional `YYYY-MM-DD` stamp of the defining module;
//! two qualified names with different revisions are different names.
//!
//! ## Validation
//!
//! Namespace and local name must be non-empty and the revision, when
//! present, must be `YYYY-MM-DD` shaped. Deserialization routes
//! through [`QName::create`] so invalid names are rejected at the
//! descriptor boundary, not silently accepted.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// A qualified schema node name: `(namespace, revision, local name)`.
///
/// `Display` renders the wire form `namespace:local` used for JSON
/// object keys; the revision never appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QName {
    namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    revision: Option<String>,
    local_name: String,
}

impl QName {
    /// Create a qualified name without a revision.
    pub fn new(
        namespace: impl Into<String>,
        local_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::create(namespace, None::<String>, local_name)
    }

    /// Create a qualified name, optionally carrying a module revision.
    pub fn create(
        namespace: impl Into<String>,
        revision: Option<impl Into<String>>,
        local_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let namespace = namespace.into();
        let local_name = local_name.into();
        if namespace.is_empty() {
            return Err(ValidationError::EmptyNamespace);
        }
        if local_name.is_empty() {
            return Err(ValidationError::EmptyLocalName);
        }
        let revision = match revision {
            Some(r) => {
                let r = r.into();
                check_revision(&r)?;
                Some(r)
            }
            None => None,
        };
        Ok(Self {
            namespace,
            revision,
            local_name,
        })
    }

    /// The namespace URI of the defining module.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The defining module's revision date, if any.
    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref()
    }

    /// The node's local name within its namespace.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Whether this name shares `other`'s namespace. Determines bare
    /// vs. qualified JSON keys.
    pub fn same_namespace(&self, other: &QName) -> bool {
        self.namespace == other.namespace
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.local_name)
    }
}

impl<'de> Deserialize<'de> for QName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            namespace: String,
            #[serde(default)]
            revision: Option<String>,
            local_name: String,
        }
        let raw = Raw::deserialize(deserializer)?;
        QName::create(raw.namespace, raw.revision, raw.local_name)
            .map_err(serde::de::Error::custom)
    }
}

/// Revision stamps are `YYYY-MM-DD`: ten ASCII characters, digits with
/// dashes at positions 4 and 7. Calendar validity is the schema
/// compiler's concern, not ours.
fn check_revision(revision: &str) -> Result<(), ValidationError> {
    let ok = revision.len() == 10
        && revision.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if ok {
        Ok(())
    } else {
        Err(ValidationError::InvalidRevision(revision.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_with_revision() {
        let q = QName::create("urn:example:top", Some("2014-07-11"), "top").unwrap();
        assert_eq!(q.namespace(), "urn:example:top");
        assert_eq!(q.revision(), Some("2014-07-11"));
        assert_eq!(q.local_name(), "top");
        assert_eq!(q.to_string(), "urn:example:top:top");
    }

    #[test]
    fn rejects_empty_components() {
        assert_eq!(
            QName::new("", "top").unwrap_err(),
            ValidationError::EmptyNamespace
        );
        assert_eq!(
            QName::new("urn:example", "").unwrap_err(),
            ValidationError::EmptyLocalName
        );
    }

    #[test]
    fn rejects_malformed_revision() {
        for bad in ["2014", "2014/07/11", "2014-7-11", "yyyy-mm-dd"] {
            let err = QName::create("urn:example", Some(bad), "top").unwrap_err();
            assert_eq!(err, ValidationError::InvalidRevision(bad.to_string()));
        }
    }

    #[test]
    fn revision_distinguishes_names() {
        let a = QName::create("urn:example", Some("2014-07-11"), "top").unwrap();
        let b = QName::create("urn:example", Some("2015-01-01"), "top").unwrap();
        let c = QName::new("urn:example", "top").unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn deserialize_routes_through_validation() {
        let err = serde_json::from_str::<QName>(
            r#"{"namespace":"","local_name":"top"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("namespace"));
    }
}
