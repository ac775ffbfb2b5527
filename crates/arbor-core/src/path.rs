//! # Schema Paths
//!
//! A [`SchemaPath`] is the ordered sequence of qualified names leading
//! from the schema root to a target node. Paths are plain values: two
//! paths are equal iff their component sequences are equal.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::qname::QName;

/// Root-to-node sequence of qualified names.
///
/// The empty path denotes the schema root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaPath(Vec<QName>);

impl SchemaPath {
    /// The empty path (the schema root).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from its components, root first.
    pub fn from_components(components: impl IntoIterator<Item = QName>) -> Self {
        Self(components.into_iter().collect())
    }

    /// Extend this path by one child component.
    pub fn child(&self, qname: QName) -> Self {
        let mut components = self.0.clone();
        components.push(qname);
        Self(components)
    }

    /// The path one level up, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// The final component, or `None` at the root.
    pub fn target(&self) -> Option<&QName> {
        self.0.last()
    }

    /// Components from root to target.
    pub fn components(&self) -> &[QName] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &QName> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for component in &self.0 {
            write!(f, "/{component}")?;
        }
        Ok(())
    }
}

impl FromIterator<QName> for SchemaPath {
    fn from_iter<I: IntoIterator<Item = QName>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(local: &str) -> QName {
        QName::new("urn:example", local).unwrap()
    }

    #[test]
    fn child_and_parent_invert() {
        let top = SchemaPath::root().child(q("top"));
        let items = top.child(q("items"));
        assert_eq!(items.parent().unwrap(), top);
        assert_eq!(top.parent().unwrap(), SchemaPath::root());
        assert_eq!(SchemaPath::root().parent(), None);
    }

    #[test]
    fn equality_is_component_wise() {
        let a = SchemaPath::from_components([q("top"), q("items")]);
        let b = SchemaPath::root().child(q("top")).child(q("items"));
        assert_eq!(a, b);
        assert_ne!(a, SchemaPath::from_components([q("items"), q("top")]));
    }

    #[test]
    fn display() {
        assert_eq!(SchemaPath::root().to_string(), "/");
        let p = SchemaPath::from_components([q("top"), q("items")]);
        assert_eq!(p.to_string(), "/urn:example:top/urn:example:items");
    }
}
