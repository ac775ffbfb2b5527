//! # JSON Reader
//!
//! Parses JSON text into a normalized tree under full schema
//! guidance: member names resolve to schema children (qualified or
//! bare per the namespace convention), scalar decoding follows the
//! declared leaf type, and anything the schema does not declare is a
//! [`ParseError`] carrying the offending key and its document path.
//!
//! Two anchors are supported: [`JsonReader::read`] expects a full
//! document whose single top-level member names a top-level schema
//! node, while [`JsonReader::read_at`] parses the body form emitted
//! by the writer for a given schema path.

use arbor_core::{
    ContainerNode, LeafListNode, LeafNode, ListNode, NormalizedNode, QName, ScalarValue,
    SchemaPath,
};
use arbor_schema::{LeafType, SchemaGraph, SchemaKind, SchemaNode};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from text-to-tree conversion. `at` values are
/// `/`-separated document paths, with `[i]` for array entries.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The text is not well-formed JSON.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A full document must be a JSON object with exactly one
    /// top-level member.
    #[error("document must be a JSON object with exactly one top-level member")]
    MalformedDocument,

    /// The schema path does not resolve to a schema node.
    #[error("schema path `{0}` does not resolve to a schema node")]
    UnresolvedPath(SchemaPath),

    /// The anchor node cannot hold a document body.
    #[error("schema node `{target}` of kind {kind} cannot anchor a document")]
    UnsupportedTarget { target: QName, kind: SchemaKind },

    /// A member name has no matching schema child under the current
    /// node.
    #[error("unknown member `{key}` at `{at}`")]
    UnknownMember { key: String, at: String },

    /// A bare top-level member name matches several modules.
    #[error("member `{key}` at `{at}` is ambiguous; qualify it with its namespace")]
    AmbiguousMember { key: String, at: String },

    /// A value's JSON shape or type differs from the schema.
    #[error("member `{key}` at `{at}` must be {expected}")]
    TypeMismatch {
        key: String,
        at: String,
        expected: String,
    },

    /// An enumeration leaf holds a label outside the declared set.
    #[error("value `{value}` of `{key}` at `{at}` is not a declared enumeration label")]
    UnknownEnumValue {
        key: String,
        at: String,
        value: String,
    },
}

/// Text-to-tree converter over an immutable schema graph.
pub struct JsonReader<'a> {
    graph: &'a SchemaGraph,
}

impl<'a> JsonReader<'a> {
    pub fn new(graph: &'a SchemaGraph) -> Self {
        Self { graph }
    }

    /// Parse a full document. The single top-level member names a
    /// top-level schema node, `namespace:local` or bare when the
    /// local name is unambiguous across modules.
    pub fn read(&self, text: &str) -> Result<NormalizedNode, ParseError> {
        let doc: Value = serde_json::from_str(text)?;
        let Value::Object(members) = doc else {
            return Err(ParseError::MalformedDocument);
        };
        if members.len() != 1 {
            return Err(ParseError::MalformedDocument);
        }
        let (key, value) = match members.iter().next() {
            Some((k, v)) => (k.as_str(), v),
            None => return Err(ParseError::MalformedDocument),
        };

        let schema = self.resolve_member(None, key, "")?;
        self.node_from_value(schema, key, value, "")
    }

    /// Parse the body form emitted by the writer for `path`: a JSON
    /// object holding the target's children (or a JSON array of
    /// entries for a list target).
    pub fn read_at(&self, path: &SchemaPath, text: &str) -> Result<NormalizedNode, ParseError> {
        let target = self
            .graph
            .resolve(path)
            .ok_or_else(|| ParseError::UnresolvedPath(path.clone()))?;
        let doc: Value = serde_json::from_str(text)?;

        match target.kind() {
            SchemaKind::Container => {
                let Value::Object(members) = &doc else {
                    return Err(ParseError::TypeMismatch {
                        key: target.qname().local_name().to_string(),
                        at: "".to_string(),
                        expected: "a JSON object".to_string(),
                    });
                };
                Ok(NormalizedNode::Container(self.container_from_members(
                    target,
                    members,
                    "",
                )?))
            }
            SchemaKind::List => {
                let key = target.qname().local_name();
                let Value::Array(entries) = &doc else {
                    return Err(ParseError::TypeMismatch {
                        key: key.to_string(),
                        at: "".to_string(),
                        expected: "a JSON array of objects".to_string(),
                    });
                };
                Ok(NormalizedNode::List(self.list_from_entries(
                    target,
                    key,
                    entries,
                    "",
                )?))
            }
            kind => Err(ParseError::UnsupportedTarget {
                target: target.qname().clone(),
                kind,
            }),
        }
    }

    /// Resolve a member name among the data children of `scope`
    /// (`None` for the top level). A qualified name must match
    /// exactly; a bare name matches a child sharing the parent's
    /// namespace, or, at the top level, a unique local name.
    fn resolve_member(
        &self,
        scope: Option<&SchemaNode>,
        key: &str,
        at: &str,
    ) -> Result<&SchemaNode, ParseError> {
        let candidates = self.graph.data_children(scope);

        if let Some(hit) = candidates.iter().copied().find(|c| {
            let q = c.qname();
            key == format!("{}:{}", q.namespace(), q.local_name())
        }) {
            return Ok(hit);
        }

        let bare: Vec<&SchemaNode> = match scope {
            Some(parent) => candidates
                .iter()
                .copied()
                .filter(|c| {
                    c.qname().local_name() == key && c.qname().same_namespace(parent.qname())
                })
                .collect(),
            None => candidates
                .iter()
                .copied()
                .filter(|c| c.qname().local_name() == key)
                .collect(),
        };
        match bare.as_slice() {
            [] => Err(ParseError::UnknownMember {
                key: key.to_string(),
                at: at.to_string(),
            }),
            [one] => Ok(*one),
            _ => Err(ParseError::AmbiguousMember {
                key: key.to_string(),
                at: at.to_string(),
            }),
        }
    }

    fn node_from_value(
        &self,
        schema: &SchemaNode,
        key: &str,
        value: &Value,
        at: &str,
    ) -> Result<NormalizedNode, ParseError> {
        let here = format!("{at}/{key}");
        match schema.kind() {
            SchemaKind::Leaf => Ok(NormalizedNode::Leaf(LeafNode::new(
                schema.qname().clone(),
                scalar_from_value(schema, key, value, &here)?,
            ))),
            SchemaKind::LeafList => {
                let Value::Array(raw) = value else {
                    return Err(ParseError::TypeMismatch {
                        key: key.to_string(),
                        at: at.to_string(),
                        expected: "a JSON array".to_string(),
                    });
                };
                let mut values = Vec::with_capacity(raw.len());
                for (i, v) in raw.iter().enumerate() {
                    values.push(scalar_from_value(
                        schema,
                        key,
                        v,
                        &format!("{here}[{i}]"),
                    )?);
                }
                Ok(NormalizedNode::LeafList(LeafListNode::new(
                    schema.qname().clone(),
                    values,
                )))
            }
            SchemaKind::Container => {
                let Value::Object(members) = value else {
                    return Err(ParseError::TypeMismatch {
                        key: key.to_string(),
                        at: at.to_string(),
                        expected: "a JSON object".to_string(),
                    });
                };
                Ok(NormalizedNode::Container(self.container_from_members(
                    schema,
                    members,
                    &here,
                )?))
            }
            SchemaKind::List => {
                let Value::Array(entries) = value else {
                    return Err(ParseError::TypeMismatch {
                        key: key.to_string(),
                        at: at.to_string(),
                        expected: "a JSON array of objects".to_string(),
                    });
                };
                Ok(NormalizedNode::List(self.list_from_entries(
                    schema,
                    key,
                    entries,
                    &here,
                )?))
            }
            // resolve_member only yields data nodes.
            SchemaKind::Choice | SchemaKind::Case => Err(ParseError::UnknownMember {
                key: key.to_string(),
                at: at.to_string(),
            }),
        }
    }

    fn container_from_members(
        &self,
        schema: &SchemaNode,
        members: &Map<String, Value>,
        at: &str,
    ) -> Result<ContainerNode, ParseError> {
        let mut container = ContainerNode::new(schema.qname().clone());
        for (key, value) in members {
            let child_schema = self.resolve_member(Some(schema), key, at)?;
            container.push(self.node_from_value(child_schema, key, value, at)?);
        }
        Ok(container)
    }

    fn list_from_entries(
        &self,
        schema: &SchemaNode,
        key: &str,
        entries: &[Value],
        at: &str,
    ) -> Result<ListNode, ParseError> {
        let mut list = ListNode::new(schema.qname().clone());
        for (i, entry) in entries.iter().enumerate() {
            let here = format!("{at}[{i}]");
            let Value::Object(members) = entry else {
                return Err(ParseError::TypeMismatch {
                    key: key.to_string(),
                    at: here,
                    expected: "a JSON object".to_string(),
                });
            };
            list.push(self.container_from_members(schema, members, &here)?);
        }
        Ok(list)
    }
}

fn scalar_from_value(
    schema: &SchemaNode,
    key: &str,
    value: &Value,
    at: &str,
) -> Result<ScalarValue, ParseError> {
    let declared = schema
        .leaf_type()
        .expect("leaf and leaf-list nodes carry a declared type");
    let mismatch = |expected: &str| ParseError::TypeMismatch {
        key: key.to_string(),
        at: at.to_string(),
        expected: expected.to_string(),
    };

    match declared {
        LeafType::Int64 => value
            .as_i64()
            .map(ScalarValue::Int64)
            .ok_or_else(|| mismatch("an int64 number")),
        LeafType::Uint64 => value
            .as_u64()
            .map(ScalarValue::Uint64)
            .ok_or_else(|| mismatch("a uint64 number")),
        LeafType::Boolean => value
            .as_bool()
            .map(ScalarValue::Boolean)
            .ok_or_else(|| mismatch("a boolean")),
        LeafType::String => value
            .as_str()
            .map(|s| ScalarValue::String(s.to_string()))
            .ok_or_else(|| mismatch("a string")),
        LeafType::Enumeration(labels) => {
            let label = value.as_str().ok_or_else(|| mismatch("a string"))?;
            if !labels.iter().any(|l| l == label) {
                return Err(ParseError::UnknownEnumValue {
                    key: key.to_string(),
                    at: at.to_string(),
                    value: label.to_string(),
                });
            }
            Ok(ScalarValue::Enum(label.to_string()))
        }
        LeafType::IdentityRef => {
            let raw = value.as_str().ok_or_else(|| mismatch("a string"))?;
            // Local names carry no `:`, so the last one separates the
            // namespace; a bare name inherits the leaf's namespace.
            let qname = match raw.rsplit_once(':') {
                Some((ns, local)) => QName::new(ns, local),
                None => QName::new(schema.qname().namespace(), raw),
            }
            .map_err(|_| mismatch("an identity reference"))?;
            Ok(ScalarValue::IdentityRef(qname))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_schema::{ModuleDescriptor, ModuleDescriptorSet};

    fn graph() -> SchemaGraph {
        let base = ModuleDescriptor::from_yaml_str(
            r#"
name: base
namespace: urn:base
body:
  - kind: container
    name: top
    children:
      - kind: leaf
        name: name
        type: string
      - kind: leaf
        name: count
        type: uint64
      - kind: leaf
        name: state
        type:
          enumeration: [up, down]
"#,
        )
        .unwrap();
        let ext = ModuleDescriptor::from_yaml_str(
            r#"
name: ext
namespace: urn:ext
imports: [base]
augments:
  - target:
      - namespace: urn:base
        local_name: top
    children:
      - kind: list
        name: items
        key: [id]
        children:
          - kind: leaf
            name: id
            type: int64
"#,
        )
        .unwrap();
        SchemaGraph::build(&ModuleDescriptorSet::new(vec![base, ext])).unwrap()
    }

    fn q(ns: &str, local: &str) -> QName {
        QName::new(ns, local).unwrap()
    }

    #[test]
    fn reads_full_document_with_bare_root() {
        let graph = graph();
        let reader = JsonReader::new(&graph);
        let tree = reader
            .read(r#"{"top":{"name":"alpha","count":3}}"#)
            .unwrap();
        let top = tree.as_container().unwrap();
        assert_eq!(top.qname(), &q("urn:base", "top"));
        assert_eq!(
            top.child(&q("urn:base", "count"))
                .unwrap()
                .as_leaf()
                .unwrap()
                .value(),
            &ScalarValue::Uint64(3)
        );
    }

    #[test]
    fn reads_qualified_root_member() {
        let graph = graph();
        let reader = JsonReader::new(&graph);
        let tree = reader.read(r#"{"urn:base:top":{}}"#).unwrap();
        assert_eq!(tree.qname(), &q("urn:base", "top"));
    }

    #[test]
    fn rejects_unknown_member_with_key_and_path() {
        let graph = graph();
        let reader = JsonReader::new(&graph);
        let err = reader
            .read(r#"{"top":{"name":"alpha","serial":"x"}}"#)
            .unwrap_err();
        match err {
            ParseError::UnknownMember { key, at } => {
                assert_eq!(key, "serial");
                assert_eq!(at, "/top");
            }
            other => panic!("expected UnknownMember, got {other:?}"),
        }
    }

    #[test]
    fn rejects_type_mismatches() {
        let graph = graph();
        let reader = JsonReader::new(&graph);
        let err = reader.read(r#"{"top":{"count":-2}}"#).unwrap_err();
        assert!(matches!(
            err,
            ParseError::TypeMismatch { key, .. } if key == "count"
        ));
    }

    #[test]
    fn rejects_unknown_enum_labels() {
        let graph = graph();
        let reader = JsonReader::new(&graph);
        let err = reader.read(r#"{"top":{"state":"sideways"}}"#).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnknownEnumValue { value, .. } if value == "sideways"
        ));
    }

    #[test]
    fn rejects_malformed_json_and_documents() {
        let graph = graph();
        let reader = JsonReader::new(&graph);
        assert!(matches!(
            reader.read(r#"{"top": "#).unwrap_err(),
            ParseError::Json(_)
        ));
        assert!(matches!(
            reader.read(r#"[1,2]"#).unwrap_err(),
            ParseError::MalformedDocument
        ));
        assert!(matches!(
            reader.read(r#"{"top":{},"urn:ext:items":[]}"#).unwrap_err(),
            ParseError::MalformedDocument
        ));
    }

    #[test]
    fn ambiguous_bare_root_member_is_rejected() {
        let a = ModuleDescriptor::from_yaml_str(
            "name: a\nnamespace: urn:a\nbody:\n  - kind: container\n    name: status\n",
        )
        .unwrap();
        let b = ModuleDescriptor::from_yaml_str(
            "name: b\nnamespace: urn:b\nbody:\n  - kind: container\n    name: status\n",
        )
        .unwrap();
        let graph = SchemaGraph::build(&ModuleDescriptorSet::new(vec![a, b])).unwrap();
        let reader = JsonReader::new(&graph);

        let err = reader.read(r#"{"status":{}}"#).unwrap_err();
        assert!(matches!(err, ParseError::AmbiguousMember { key, .. } if key == "status"));

        // Qualification disambiguates.
        let tree = reader.read(r#"{"urn:b:status":{}}"#).unwrap();
        assert_eq!(tree.qname(), &q("urn:b", "status"));
    }

    #[test]
    fn read_at_parses_the_writer_body_form() {
        let graph = graph();
        let reader = JsonReader::new(&graph);
        let path = SchemaPath::from_components([q("urn:base", "top")]);
        let tree = reader
            .read_at(&path, r#"{"name":"alpha","urn:ext:items":[{"id":1}]}"#)
            .unwrap();
        let top = tree.as_container().unwrap();
        assert_eq!(top.children().len(), 2);

        let items = top
            .child(&q("urn:ext", "items"))
            .unwrap()
            .as_list()
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(
            items.entries()[0]
                .child(&q("urn:ext", "id"))
                .unwrap()
                .as_leaf()
                .unwrap()
                .value(),
            &ScalarValue::Int64(1)
        );
    }

    #[test]
    fn bare_member_in_foreign_namespace_is_rejected() {
        let graph = graph();
        let reader = JsonReader::new(&graph);
        let path = SchemaPath::from_components([q("urn:base", "top")]);
        // `items` lives in urn:ext; a bare key under a urn:base parent
        // must not match it.
        let err = reader
            .read_at(&path, r#"{"items":[{"id":1}]}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnknownMember { key, .. } if key == "items"
        ));
    }
}
