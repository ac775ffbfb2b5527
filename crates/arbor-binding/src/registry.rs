//! # Binding Registry
//!
//! The statically built mapping table between generated types and
//! schema identities. Populated once through the builder, immutable
//! afterwards; both directions are O(1) map lookups.
//!
//! The legacy pattern this replaces scanned every schema node on each
//! lookup and expanded container children into the result set
//! mid-scan. That scan is kept only as a deprecated twin so the two
//! can be cross-checked in tests; it performs one complete pass over
//! an already-complete node set and never mutates anything.

use std::collections::HashMap;

use arbor_core::{QName, SchemaPath};
use arbor_schema::{SchemaGraph, SchemaNode};
use thiserror::Error;

use crate::object::{DataObject, FieldMap, TypeTag};
use crate::path::InstancePath;

/// Builds one typed object from the decoded fields of a tree node.
/// Registered per type by the code generator. The error string is
/// wrapped with the node's identity by the codec.
pub type ObjectFactory = fn(FieldMap) -> Result<Box<dyn DataObject>, String>;

/// Errors from registry construction and path resolution.
#[derive(Error, Debug)]
pub enum BindingError {
    /// An instance path segment's type has no schema mapping.
    #[error("path segment type `{tag}` has no schema mapping")]
    UnresolvedSegment {
        /// The unmapped tag.
        tag: TypeTag,
    },

    /// Two bindings were registered for the same type tag.
    #[error("duplicate binding for type `{tag}`")]
    DuplicateTag {
        /// The repeated tag.
        tag: TypeTag,
    },

    /// Two bindings were registered for the same qualified name.
    #[error("duplicate binding for qualified name `{qname}`")]
    DuplicateQName {
        /// The repeated name.
        qname: QName,
    },
}

/// One generated type's binding: tag, schema identity, and factory.
pub struct TypeBinding {
    tag: TypeTag,
    qname: QName,
    factory: ObjectFactory,
}

impl TypeBinding {
    pub fn new(tag: TypeTag, qname: QName, factory: ObjectFactory) -> Self {
        Self {
            tag,
            qname,
            factory,
        }
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn qname(&self) -> &QName {
        &self.qname
    }

    pub fn factory(&self) -> ObjectFactory {
        self.factory
    }
}

impl std::fmt::Debug for TypeBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeBinding")
            .field("tag", &self.tag)
            .field("qname", &self.qname)
            .finish_non_exhaustive()
    }
}

/// Accumulates bindings, rejecting duplicates as they are added.
#[derive(Default, Debug)]
pub struct BindingRegistryBuilder {
    bindings: Vec<TypeBinding>,
    by_tag: HashMap<TypeTag, usize>,
    by_qname: HashMap<QName, usize>,
}

impl BindingRegistryBuilder {
    pub fn register(mut self, binding: TypeBinding) -> Result<Self, BindingError> {
        if self.by_tag.contains_key(&binding.tag) {
            return Err(BindingError::DuplicateTag { tag: binding.tag });
        }
        if self.by_qname.contains_key(&binding.qname) {
            return Err(BindingError::DuplicateQName {
                qname: binding.qname.clone(),
            });
        }
        let idx = self.bindings.len();
        self.by_tag.insert(binding.tag, idx);
        self.by_qname.insert(binding.qname.clone(), idx);
        self.bindings.push(binding);
        Ok(self)
    }

    pub fn build(self) -> BindingRegistry {
        tracing::debug!(bindings = self.bindings.len(), "binding registry built");
        BindingRegistry {
            bindings: self.bindings,
            by_tag: self.by_tag,
            by_qname: self.by_qname,
        }
    }
}

/// The immutable binding index (generated type ↔ qualified name).
pub struct BindingRegistry {
    bindings: Vec<TypeBinding>,
    by_tag: HashMap<TypeTag, usize>,
    by_qname: HashMap<QName, usize>,
}

impl BindingRegistry {
    pub fn builder() -> BindingRegistryBuilder {
        BindingRegistryBuilder::default()
    }

    /// The schema identity of a generated type, or `None` when the
    /// type is outside the managed schema.
    pub fn qualified_name_for(&self, tag: TypeTag) -> Option<&QName> {
        self.binding_for_type(tag).map(TypeBinding::qname)
    }

    pub fn binding_for_type(&self, tag: TypeTag) -> Option<&TypeBinding> {
        self.by_tag.get(&tag).map(|&idx| &self.bindings[idx])
    }

    pub fn binding_for_qname(&self, qname: &QName) -> Option<&TypeBinding> {
        self.by_qname.get(qname).map(|&idx| &self.bindings[idx])
    }

    /// Map each segment of an instance path to its qualified name,
    /// preserving order. Resolution is purely type-driven; key
    /// predicates are ignored.
    pub fn schema_path_for(&self, path: &InstancePath) -> Result<SchemaPath, BindingError> {
        path.segments()
            .iter()
            .map(|segment| {
                self.qualified_name_for(segment.tag())
                    .cloned()
                    .ok_or(BindingError::UnresolvedSegment {
                        tag: segment.tag(),
                    })
            })
            .collect()
    }

    /// The schema node for a generated type: tag → qualified name →
    /// memoized graph index. O(1); the supported form of the legacy
    /// scan below.
    pub fn schema_node_for_type<'g>(
        &self,
        graph: &'g SchemaGraph,
        tag: TypeTag,
    ) -> Option<&'g SchemaNode> {
        let qname = self.qualified_name_for(tag)?;
        graph.node_for_qname(qname)
    }

    /// Linear-scan lookup over the full node set.
    ///
    /// O(schema size) per call; retained only so tests can confirm it
    /// agrees with [`Self::schema_node_for_type`].
    #[deprecated(note = "O(schema size) per call; use schema_node_for_type")]
    pub fn schema_node_for_type_scan<'g>(
        &self,
        graph: &'g SchemaGraph,
        tag: TypeTag,
    ) -> Option<&'g SchemaNode> {
        let qname = self.qualified_name_for(tag)?;
        // all_nodes is the complete pre-order set; nothing is expanded
        // or added while we walk it.
        graph.all_nodes().find(|node| node.qname() == qname)
    }
}

impl std::fmt::Debug for BindingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingRegistry")
            .field("bindings", &self.bindings.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{DecodedField, FieldValue};
    use arbor_core::ScalarValue;
    use std::any::Any;

    #[derive(Debug)]
    struct Blank;

    impl DataObject for Blank {
        fn type_tag(&self) -> TypeTag {
            TypeTag::new("blank")
        }

        fn field(&self, _name: &str) -> Option<FieldValue<'_>> {
            None
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn into_any(self: Box<Self>) -> Box<dyn Any> {
            self
        }
    }

    fn blank_factory(_fields: FieldMap) -> Result<Box<dyn DataObject>, String> {
        Ok(Box::new(Blank))
    }

    fn q(ns: &str, local: &str) -> QName {
        QName::new(ns, local).unwrap()
    }

    fn registry() -> BindingRegistry {
        BindingRegistry::builder()
            .register(TypeBinding::new(
                TypeTag::new("top"),
                q("urn:a", "top"),
                blank_factory,
            ))
            .unwrap()
            .register(TypeBinding::new(
                TypeTag::new("item"),
                q("urn:b", "items"),
                blank_factory,
            ))
            .unwrap()
            .build()
    }

    #[test]
    fn resolves_registered_tags() {
        let registry = registry();
        assert_eq!(
            registry.qualified_name_for(TypeTag::new("top")),
            Some(&q("urn:a", "top"))
        );
        // Unmapped type: a miss, not an error.
        assert_eq!(registry.qualified_name_for(TypeTag::new("stranger")), None);
    }

    #[test]
    fn schema_path_preserves_segment_order() {
        let registry = registry();
        let path = InstancePath::of(TypeTag::new("top")).child(TypeTag::new("item"));
        let schema_path = registry.schema_path_for(&path).unwrap();
        assert_eq!(
            schema_path.components(),
            [q("urn:a", "top"), q("urn:b", "items")]
        );
    }

    #[test]
    fn unresolved_segment_is_typed() {
        let registry = registry();
        let path = InstancePath::of(TypeTag::new("top")).child(TypeTag::new("stranger"));
        let err = registry.schema_path_for(&path).unwrap_err();
        assert!(matches!(
            err,
            BindingError::UnresolvedSegment { tag } if tag == TypeTag::new("stranger")
        ));
    }

    #[test]
    fn rejects_duplicate_registrations() {
        let dup_tag = BindingRegistry::builder()
            .register(TypeBinding::new(
                TypeTag::new("top"),
                q("urn:a", "top"),
                blank_factory,
            ))
            .unwrap()
            .register(TypeBinding::new(
                TypeTag::new("top"),
                q("urn:a", "other"),
                blank_factory,
            ));
        assert!(matches!(
            dup_tag.unwrap_err(),
            BindingError::DuplicateTag { .. }
        ));

        let dup_qname = BindingRegistry::builder()
            .register(TypeBinding::new(
                TypeTag::new("top"),
                q("urn:a", "top"),
                blank_factory,
            ))
            .unwrap()
            .register(TypeBinding::new(
                TypeTag::new("top2"),
                q("urn:a", "top"),
                blank_factory,
            ));
        assert!(matches!(
            dup_qname.unwrap_err(),
            BindingError::DuplicateQName { .. }
        ));
    }

    #[test]
    fn field_map_used_by_factories() {
        // Factories receive decoded fields; smoke-check the plumbing.
        let mut fields = FieldMap::default();
        fields.insert("x", DecodedField::Leaf(ScalarValue::Boolean(true)));
        let built = blank_factory(fields).unwrap();
        assert_eq!(built.type_tag(), TypeTag::new("blank"));
    }
}
