//! # Tree Codec
//!
//! Converts between typed object instances and the normalized tree by
//! walking the object graph and the schema graph in lockstep: for a
//! container-kind schema node, each schema child's local name is
//! looked up among the object's fields; for list and leaf-list kinds,
//! element order is taken from the source collection as encountered.
//!
//! Present optional fields are preserved exactly in both directions.
//! A field absent on the object produces no tree node, and a node
//! absent from the tree leaves the object field unset. Serializing
//! the same instance twice yields identical trees.

use arbor_core::{
    ContainerNode, LeafListNode, LeafNode, ListNode, NormalizedNode, QName, ScalarKind,
    SchemaPath,
};
use arbor_schema::{SchemaGraph, SchemaKind, SchemaNode};
use thiserror::Error;

use crate::object::{DataObject, DecodedField, FieldMap, FieldValue, TypeTag};
use crate::registry::BindingRegistry;

/// Structural mismatches between an object and the schema during
/// object → tree conversion. Nothing partial is produced on failure.
#[derive(Error, Debug)]
pub enum SerializeError {
    /// The schema path does not resolve to a schema node.
    #[error("schema path `{0}` does not resolve to a schema node")]
    UnresolvedPath(SchemaPath),

    /// The object's type has no registered binding.
    #[error("type `{tag}` has no registered binding")]
    UnboundType {
        /// The unmapped tag.
        tag: TypeTag,
    },

    /// The object's schema identity differs from the path target.
    #[error("object type `{tag}` is bound to `{bound}` but the path targets `{target}`")]
    TargetMismatch {
        tag: TypeTag,
        bound: QName,
        target: QName,
    },

    /// The path target cannot hold an object (a leaf, for instance).
    #[error("schema node `{target}` of kind {kind} cannot be a serialization target")]
    UnsupportedTarget { target: QName, kind: SchemaKind },

    /// An object field's shape differs from the schema child's kind.
    #[error("field `{qname}` is a {expected} in the schema but the object holds a {found}")]
    KindMismatch {
        qname: QName,
        expected: SchemaKind,
        found: &'static str,
    },

    /// A scalar does not conform to the leaf's declared type.
    #[error("value of leaf `{qname}` does not conform to its declared {expected} type")]
    ValueMismatch { qname: QName, expected: ScalarKind },

    /// A mandatory leaf is absent on the object.
    #[error("mandatory leaf `{qname}` is absent")]
    MissingMandatory { qname: QName },

    /// A list entry is missing one of the list's key leaves.
    #[error("entry of list `{list}` is missing key leaf `{key}`")]
    MissingKey { list: QName, key: String },
}

/// Structural mismatches during tree → object conversion.
#[derive(Error, Debug)]
pub enum DeserializeError {
    /// The schema path does not resolve to a schema node.
    #[error("schema path `{0}` does not resolve to a schema node")]
    UnresolvedPath(SchemaPath),

    /// The tree node's identity differs from the path target.
    #[error("tree node `{found}` does not match the path target `{target}`")]
    TargetMismatch { target: QName, found: QName },

    /// A tree node has no corresponding schema child.
    #[error("node `{qname}` is not a child of `{scope}` in the schema")]
    UnknownChild { scope: QName, qname: QName },

    /// A tree node's shape differs from the schema child's kind.
    #[error("node `{qname}` is a {expected} in the schema but the tree holds a {found}")]
    KindMismatch {
        qname: QName,
        expected: SchemaKind,
        found: &'static str,
    },

    /// A scalar does not conform to the leaf's declared type.
    #[error("value of leaf `{qname}` does not conform to its declared {expected} type")]
    ValueMismatch { qname: QName, expected: ScalarKind },

    /// A mandatory leaf is absent from the tree.
    #[error("mandatory leaf `{qname}` is absent")]
    MissingMandatory { qname: QName },

    /// A list entry is missing one of the list's key leaves.
    #[error("entry of list `{list}` is missing key leaf `{key}`")]
    MissingKey { list: QName, key: String },

    /// A list node targeted at a single object holds several entries.
    #[error("list node `{qname}` must hold exactly one entry to rebuild an object, found {count}")]
    ListCardinality { qname: QName, count: usize },

    /// No binding is registered for a tree node's qualified name.
    #[error("no binding registered for `{qname}`")]
    UnboundNode { qname: QName },

    /// The registered object factory rejected the decoded fields.
    #[error("object factory for `{qname}` failed: {message}")]
    Factory { qname: QName, message: String },
}

/// The object ↔ tree converter. Borrows the immutable schema graph
/// and binding registry; cheap to construct per call site.
pub struct TreeCodec<'a> {
    graph: &'a SchemaGraph,
    registry: &'a BindingRegistry,
}

impl<'a> TreeCodec<'a> {
    pub fn new(graph: &'a SchemaGraph, registry: &'a BindingRegistry) -> Self {
        Self { graph, registry }
    }

    /// Serialize `object` as an instance of the schema node at
    /// `path`. A container target produces a container node; a list
    /// target wraps the object as a single list entry.
    pub fn serialize(
        &self,
        path: &SchemaPath,
        object: &dyn DataObject,
    ) -> Result<NormalizedNode, SerializeError> {
        let target = self
            .graph
            .resolve(path)
            .ok_or_else(|| SerializeError::UnresolvedPath(path.clone()))?;

        let tag = object.type_tag();
        let bound = self
            .registry
            .qualified_name_for(tag)
            .ok_or(SerializeError::UnboundType { tag })?;
        if bound != target.qname() {
            return Err(SerializeError::TargetMismatch {
                tag,
                bound: bound.clone(),
                target: target.qname().clone(),
            });
        }

        match target.kind() {
            SchemaKind::Container => Ok(NormalizedNode::Container(
                self.serialize_entry(target, object)?,
            )),
            SchemaKind::List => {
                let entry = self.serialize_entry(target, object)?;
                check_entry_keys(target, &entry)?;
                let mut list = ListNode::new(target.qname().clone());
                list.push(entry);
                Ok(NormalizedNode::List(list))
            }
            kind => Err(SerializeError::UnsupportedTarget {
                target: target.qname().clone(),
                kind,
            }),
        }
    }

    /// Rebuild a typed object from the tree node at `path`.
    pub fn deserialize(
        &self,
        path: &SchemaPath,
        node: &NormalizedNode,
    ) -> Result<Box<dyn DataObject>, DeserializeError> {
        let target = self
            .graph
            .resolve(path)
            .ok_or_else(|| DeserializeError::UnresolvedPath(path.clone()))?;
        self.deserialize_node(target, node)
    }

    /// Rebuild a typed object from a tree node whose schema node is
    /// already known.
    pub fn deserialize_node(
        &self,
        target: &SchemaNode,
        node: &NormalizedNode,
    ) -> Result<Box<dyn DataObject>, DeserializeError> {
        if node.qname() != target.qname() {
            return Err(DeserializeError::TargetMismatch {
                target: target.qname().clone(),
                found: node.qname().clone(),
            });
        }
        match (target.kind(), node) {
            (SchemaKind::Container, NormalizedNode::Container(entry)) => {
                self.deserialize_entry(target, entry)
            }
            (SchemaKind::List, NormalizedNode::List(list)) => {
                if list.len() != 1 {
                    return Err(DeserializeError::ListCardinality {
                        qname: target.qname().clone(),
                        count: list.len(),
                    });
                }
                check_tree_keys(target, &list.entries()[0])?;
                self.deserialize_entry(target, &list.entries()[0])
            }
            (kind, n) => Err(DeserializeError::KindMismatch {
                qname: target.qname().clone(),
                expected: kind,
                found: n.describe(),
            }),
        }
    }

    fn serialize_entry(
        &self,
        schema: &SchemaNode,
        object: &dyn DataObject,
    ) -> Result<ContainerNode, SerializeError> {
        let mut entry = ContainerNode::new(schema.qname().clone());

        for child in self.graph.data_children(Some(schema)) {
            let qname = child.qname().clone();
            let Some(value) = object.field(qname.local_name()) else {
                if child.kind() == SchemaKind::Leaf && child.mandatory() {
                    return Err(SerializeError::MissingMandatory { qname });
                }
                continue;
            };

            let node = match (child.kind(), value) {
                (SchemaKind::Leaf, FieldValue::Leaf(v)) => {
                    let declared = child
                        .leaf_type()
                        .expect("leaf nodes carry a declared type");
                    if !declared.accepts(&v) {
                        return Err(SerializeError::ValueMismatch {
                            qname,
                            expected: declared.kind(),
                        });
                    }
                    NormalizedNode::Leaf(LeafNode::new(qname, v))
                }
                (SchemaKind::LeafList, FieldValue::LeafList(values)) => {
                    let declared = child
                        .leaf_type()
                        .expect("leaf-list nodes carry a declared type");
                    for v in &values {
                        if !declared.accepts(v) {
                            return Err(SerializeError::ValueMismatch {
                                qname,
                                expected: declared.kind(),
                            });
                        }
                    }
                    NormalizedNode::LeafList(LeafListNode::new(qname, values))
                }
                (SchemaKind::Container, FieldValue::Container(obj)) => {
                    NormalizedNode::Container(self.serialize_entry(child, obj)?)
                }
                (SchemaKind::List, FieldValue::List(objects)) => {
                    let mut list = ListNode::new(qname);
                    for obj in objects {
                        let item = self.serialize_entry(child, obj)?;
                        check_entry_keys(child, &item)?;
                        list.push(item);
                    }
                    NormalizedNode::List(list)
                }
                (kind, found) => {
                    return Err(SerializeError::KindMismatch {
                        qname,
                        expected: kind,
                        found: found.describe(),
                    })
                }
            };
            entry.push(node);
        }

        Ok(entry)
    }

    fn deserialize_entry(
        &self,
        schema: &SchemaNode,
        entry: &ContainerNode,
    ) -> Result<Box<dyn DataObject>, DeserializeError> {
        let mut fields = FieldMap::default();

        for child_node in entry.children() {
            let child_schema = self
                .graph
                .data_child(Some(schema), child_node.qname())
                .ok_or_else(|| DeserializeError::UnknownChild {
                    scope: schema.qname().clone(),
                    qname: child_node.qname().clone(),
                })?;
            let qname = child_schema.qname().clone();

            let decoded = match (child_schema.kind(), child_node) {
                (SchemaKind::Leaf, NormalizedNode::Leaf(leaf)) => {
                    let declared = child_schema
                        .leaf_type()
                        .expect("leaf nodes carry a declared type");
                    if !declared.accepts(leaf.value()) {
                        return Err(DeserializeError::ValueMismatch {
                            qname,
                            expected: declared.kind(),
                        });
                    }
                    DecodedField::Leaf(leaf.value().clone())
                }
                (SchemaKind::LeafList, NormalizedNode::LeafList(leaves)) => {
                    let declared = child_schema
                        .leaf_type()
                        .expect("leaf-list nodes carry a declared type");
                    for v in leaves.values() {
                        if !declared.accepts(v) {
                            return Err(DeserializeError::ValueMismatch {
                                qname,
                                expected: declared.kind(),
                            });
                        }
                    }
                    DecodedField::LeafList(leaves.values().to_vec())
                }
                (SchemaKind::Container, NormalizedNode::Container(child_entry)) => {
                    DecodedField::Container(self.deserialize_entry(child_schema, child_entry)?)
                }
                (SchemaKind::List, NormalizedNode::List(list)) => {
                    let mut objects = Vec::with_capacity(list.len());
                    for item in list.entries() {
                        check_tree_keys(child_schema, item)?;
                        objects.push(self.deserialize_entry(child_schema, item)?);
                    }
                    DecodedField::List(objects)
                }
                (kind, n) => {
                    return Err(DeserializeError::KindMismatch {
                        qname,
                        expected: kind,
                        found: n.describe(),
                    })
                }
            };
            fields.insert(child_schema.qname().local_name(), decoded);
        }

        for child_schema in self.graph.data_children(Some(schema)) {
            if child_schema.kind() == SchemaKind::Leaf
                && child_schema.mandatory()
                && entry.child(child_schema.qname()).is_none()
            {
                return Err(DeserializeError::MissingMandatory {
                    qname: child_schema.qname().clone(),
                });
            }
        }

        let binding = self
            .registry
            .binding_for_qname(schema.qname())
            .ok_or_else(|| DeserializeError::UnboundNode {
                qname: schema.qname().clone(),
            })?;
        (binding.factory())(fields).map_err(|message| DeserializeError::Factory {
            qname: schema.qname().clone(),
            message,
        })
    }

}

fn check_tree_keys(list: &SchemaNode, entry: &ContainerNode) -> Result<(), DeserializeError> {
    for key in list.keys() {
        let present = entry
            .children()
            .iter()
            .any(|c| matches!(c, NormalizedNode::Leaf(_)) && c.qname().local_name() == key);
        if !present {
            return Err(DeserializeError::MissingKey {
                list: list.qname().clone(),
                key: key.clone(),
            });
        }
    }
    Ok(())
}

fn check_entry_keys(list: &SchemaNode, entry: &ContainerNode) -> Result<(), SerializeError> {
    for key in list.keys() {
        let present = entry
            .children()
            .iter()
            .any(|c| matches!(c, NormalizedNode::Leaf(_)) && c.qname().local_name() == key);
        if !present {
            return Err(SerializeError::MissingKey {
                list: list.qname().clone(),
                key: key.clone(),
            });
        }
    }
    Ok(())
}
