//! # Instance Paths
//!
//! A hierarchical path through instance data, where each segment
//! carries the [`TypeTag`] of the generated type at that level and,
//! for list levels, an optional key predicate. Schema-path derivation
//! uses only the tags; key predicates address a particular entry and
//! are irrelevant to the schema identity of the path.

use std::fmt;

use arbor_core::ScalarValue;

use crate::object::TypeTag;

/// Key predicate selecting one entry of a list: `(local name, value)`
/// pairs for the list's key leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct ListKey(Vec<(String, ScalarValue)>);

impl ListKey {
    pub fn new(pairs: impl IntoIterator<Item = (String, ScalarValue)>) -> Self {
        Self(pairs.into_iter().collect())
    }

    pub fn pairs(&self) -> &[(String, ScalarValue)] {
        &self.0
    }
}

/// One typed segment of an [`InstancePath`].
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    tag: TypeTag,
    key: Option<ListKey>,
}

impl PathSegment {
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn key(&self) -> Option<&ListKey> {
        self.key.as_ref()
    }
}

/// Ordered, typed path from the data root to a target object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstancePath {
    segments: Vec<PathSegment>,
}

impl InstancePath {
    /// A single-segment path.
    pub fn of(tag: TypeTag) -> Self {
        Self::default().child(tag)
    }

    /// Extend with an unkeyed segment.
    pub fn child(mut self, tag: TypeTag) -> Self {
        self.segments.push(PathSegment { tag, key: None });
        self
    }

    /// Extend with a keyed list segment.
    pub fn keyed_child(mut self, tag: TypeTag, key: ListKey) -> Self {
        self.segments.push(PathSegment {
            tag,
            key: Some(key),
        });
        self
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// The final segment, or `None` for the empty path.
    pub fn target(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for InstancePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment.tag)?;
            if let Some(key) = &segment.key {
                write!(f, "[")?;
                for (i, (name, value)) in key.pairs().iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{name}={value}")?;
                }
                write!(f, "]")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_keys() {
        let path = InstancePath::of(TypeTag::new("top")).keyed_child(
            TypeTag::new("item"),
            ListKey::new([("id".to_string(), ScalarValue::Int64(3))]),
        );
        assert_eq!(path.to_string(), "/top/item[id=3]");
        assert_eq!(path.segments().len(), 2);
        assert_eq!(path.target().unwrap().tag(), TypeTag::new("item"));
    }
}
