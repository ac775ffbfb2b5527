//! # JSON Writer
//!
//! Emits a normalized tree as JSON text. The writer needs the schema
//! registry: leaf encodings follow the declared leaf type (numbers
//! unquoted, strings and enumeration labels quoted, booleans bare),
//! and object keys follow the namespace convention described in the
//! crate docs.
//!
//! The tree is validated against the schema while the document value
//! is assembled; text is rendered only after the whole value exists,
//! so an error never leaves partial output behind.

use arbor_core::{
    ContainerNode, ListNode, NormalizedNode, QName, ScalarKind, ScalarValue, SchemaPath,
};
use arbor_schema::{SchemaGraph, SchemaKind, SchemaNode};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from tree-to-text conversion.
#[derive(Error, Debug)]
pub enum WriteError {
    /// The schema path does not resolve to a schema node.
    #[error("schema path `{0}` does not resolve to a schema node")]
    UnresolvedPath(SchemaPath),

    /// The tree node's identity differs from the path target.
    #[error("tree node `{found}` does not match the path target `{target}`")]
    TargetMismatch { target: QName, found: QName },

    /// The path target cannot anchor a document (a leaf, for
    /// instance).
    #[error("schema node `{target}` of kind {kind} cannot anchor a document")]
    UnsupportedTarget { target: QName, kind: SchemaKind },

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

    /// An internal serializer fault. Not expected for well-formed
    /// trees; the cause is preserved.
    #[error("unexpected serializer failure")]
    Unexpected(#[from] serde_json::Error),
}

/// Tree-to-text converter over an immutable schema graph.
pub struct JsonWriter<'a> {
    graph: &'a SchemaGraph,
}

impl<'a> JsonWriter<'a> {
    pub fn new(graph: &'a SchemaGraph) -> Self {
        Self { graph }
    }

    /// Render `node` at `path`. The target's children form the root
    /// JSON object (a list target forms the root array); the target's
    /// own namespace is the default context for its children's keys.
    pub fn write(
        &self,
        node: &NormalizedNode,
        path: &SchemaPath,
        pretty: bool,
    ) -> Result<String, WriteError> {
        let target = self
            .graph
            .resolve(path)
            .ok_or_else(|| WriteError::UnresolvedPath(path.clone()))?;
        if node.qname() != target.qname() {
            return Err(WriteError::TargetMismatch {
                target: target.qname().clone(),
                found: node.qname().clone(),
            });
        }

        let value = match (target.kind(), node) {
            (SchemaKind::Container, NormalizedNode::Container(container)) => {
                self.container_value(target, container)?
            }
            (SchemaKind::List, NormalizedNode::List(list)) => self.list_value(target, list)?,
            (SchemaKind::Container, n) | (SchemaKind::List, n) => {
                return Err(WriteError::KindMismatch {
                    qname: target.qname().clone(),
                    expected: target.kind(),
                    found: n.describe(),
                })
            }
            (kind, _) => {
                return Err(WriteError::UnsupportedTarget {
                    target: target.qname().clone(),
                    kind,
                })
            }
        };

        let text = if pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(text)
    }

    fn container_value(
        &self,
        schema: &SchemaNode,
        node: &ContainerNode,
    ) -> Result<Value, WriteError> {
        let mut members = Map::with_capacity(node.children().len());
        for child in node.children() {
            let child_schema = self
                .graph
                .data_child(Some(schema), child.qname())
                .ok_or_else(|| WriteError::UnknownChild {
                    scope: schema.qname().clone(),
                    qname: child.qname().clone(),
                })?;
            let key = json_key(child.qname(), schema.qname());
            members.insert(key, self.node_value(child_schema, child)?);
        }
        Ok(Value::Object(members))
    }

    fn list_value(&self, schema: &SchemaNode, list: &ListNode) -> Result<Value, WriteError> {
        let mut entries = Vec::with_capacity(list.len());
        for entry in list.entries() {
            entries.push(self.container_value(schema, entry)?);
        }
        Ok(Value::Array(entries))
    }

    fn node_value(&self, schema: &SchemaNode, node: &NormalizedNode) -> Result<Value, WriteError> {
        match (schema.kind(), node) {
            (SchemaKind::Leaf, NormalizedNode::Leaf(leaf)) => leaf_value(schema, leaf.value()),
            (SchemaKind::LeafList, NormalizedNode::LeafList(leaves)) => Ok(Value::Array(
                leaves
                    .values()
                    .iter()
                    .map(|v| leaf_value(schema, v))
                    .collect::<Result<_, _>>()?,
            )),
            (SchemaKind::Container, NormalizedNode::Container(container)) => {
                self.container_value(schema, container)
            }
            (SchemaKind::List, NormalizedNode::List(list)) => self.list_value(schema, list),
            (kind, n) => Err(WriteError::KindMismatch {
                qname: schema.qname().clone(),
                expected: kind,
                found: n.describe(),
            }),
        }
    }
}

/// Bare local name for a same-namespace child, `namespace:local`
/// otherwise.
fn json_key(child: &QName, parent: &QName) -> String {
    if child.same_namespace(parent) {
        child.local_name().to_string()
    } else {
        format!("{}:{}", child.namespace(), child.local_name())
    }
}

fn leaf_value(schema: &SchemaNode, value: &ScalarValue) -> Result<Value, WriteError> {
    let declared = schema
        .leaf_type()
        .expect("leaf and leaf-list nodes carry a declared type");
    if !declared.accepts(value) {
        return Err(WriteError::ValueMismatch {
            qname: schema.qname().clone(),
            expected: declared.kind(),
        });
    }
    Ok(match value {
        ScalarValue::Int64(v) => Value::from(*v),
        ScalarValue::Uint64(v) => Value::from(*v),
        ScalarValue::Boolean(v) => Value::Bool(*v),
        ScalarValue::String(v) | ScalarValue::Enum(v) => Value::String(v.clone()),
        ScalarValue::IdentityRef(identity) => Value::String(identity_key(identity, schema.qname())),
    })
}

/// Identity references follow the same namespace convention as keys.
fn identity_key(identity: &QName, leaf: &QName) -> String {
    if identity.same_namespace(leaf) {
        identity.local_name().to_string()
    } else {
        format!("{}:{}", identity.namespace(), identity.local_name())
    }
}
