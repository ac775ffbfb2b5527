//! # Codec Context
//!
//! One value tying the schema graph, the binding index, and the two
//! codecs together. Constructed explicitly at startup and passed to
//! whatever needs conversions; there is no ambient global registry.
//!
//! ## Concurrency
//!
//! Construction is the only mutating phase. Afterwards the context is
//! immutable, `Send + Sync`, and cheap to clone (the graph and
//! registry sit behind `Arc`s), so any number of threads may convert
//! concurrently without locking. Trees and text buffers are owned by
//! the calling operation and never shared.

use std::sync::Arc;

use arbor_binding::{
    BindingError, BindingRegistry, DataObject, DeserializeError, InstancePath, SerializeError,
    TreeCodec, TypeTag,
};
use arbor_core::{NormalizedNode, QName, SchemaPath};
use arbor_schema::{SchemaGraph, SchemaNode};
use thiserror::Error;

use crate::reader::{JsonReader, ParseError};
use crate::writer::{JsonWriter, WriteError};

/// Any failure of a context operation.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error(transparent)]
    Deserialize(#[from] DeserializeError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A tree's root qualified name matches no schema node, so no
    /// anchor can be derived for it.
    #[error("tree node `{qname}` does not correspond to any schema node")]
    UnanchoredTree { qname: QName },
}

/// The assembled codec: schema graph + binding index + conversions.
#[derive(Clone)]
pub struct CodecContext {
    graph: Arc<SchemaGraph>,
    registry: Arc<BindingRegistry>,
}

impl CodecContext {
    pub fn new(graph: SchemaGraph, registry: BindingRegistry) -> Self {
        tracing::debug!(
            nodes = graph.node_count(),
            modules = graph.module_count(),
            "codec context constructed"
        );
        Self {
            graph: Arc::new(graph),
            registry: Arc::new(registry),
        }
    }

    pub fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    pub fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    /// Derive the schema path of a typed instance path.
    pub fn schema_path_for(&self, path: &InstancePath) -> Result<SchemaPath, BindingError> {
        self.registry.schema_path_for(path)
    }

    /// Serialize a typed object into the normalized tree for the
    /// schema node `path` resolves to.
    pub fn object_to_tree(
        &self,
        path: &InstancePath,
        object: &dyn DataObject,
    ) -> Result<NormalizedNode, CodecError> {
        let schema_path = self.registry.schema_path_for(path)?;
        let tree = TreeCodec::new(&self.graph, &self.registry).serialize(&schema_path, object)?;
        Ok(tree)
    }

    /// Serialize a typed object all the way to JSON text. Compact
    /// unless `pretty`, which indents with two spaces.
    pub fn object_to_json(
        &self,
        path: &InstancePath,
        object: &dyn DataObject,
        pretty: bool,
    ) -> Result<String, CodecError> {
        let schema_path = self.registry.schema_path_for(path)?;
        let tree = TreeCodec::new(&self.graph, &self.registry).serialize(&schema_path, object)?;
        let text = JsonWriter::new(&self.graph).write(&tree, &schema_path, pretty)?;
        Ok(text)
    }

    /// Parse a full JSON document into a normalized tree.
    pub fn json_to_tree(&self, text: &str) -> Result<NormalizedNode, ParseError> {
        JsonReader::new(&self.graph).read(text)
    }

    /// Parse the body form produced by [`Self::object_to_json`] for
    /// the same instance path.
    pub fn json_to_tree_at(
        &self,
        path: &InstancePath,
        text: &str,
    ) -> Result<NormalizedNode, CodecError> {
        let schema_path = self.registry.schema_path_for(path)?;
        let tree = JsonReader::new(&self.graph).read_at(&schema_path, text)?;
        Ok(tree)
    }

    /// Rebuild a typed object from a normalized tree. The anchor is
    /// the tree's own qualified name, resolved through the memoized
    /// schema index.
    pub fn tree_to_object(&self, node: &NormalizedNode) -> Result<Box<dyn DataObject>, CodecError> {
        let schema = self
            .graph
            .node_for_qname(node.qname())
            .ok_or_else(|| CodecError::UnanchoredTree {
                qname: node.qname().clone(),
            })?;
        let object = TreeCodec::new(&self.graph, &self.registry).deserialize_node(schema, node)?;
        Ok(object)
    }

    /// The schema node a generated type is bound to, through the O(1)
    /// index. `None` when the type is outside the managed schema.
    pub fn schema_node_for_object_type(&self, tag: TypeTag) -> Option<&SchemaNode> {
        self.registry.schema_node_for_type(&self.graph, tag)
    }
}

impl std::fmt::Debug for CodecContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecContext")
            .field("nodes", &self.graph.node_count())
            .finish_non_exhaustive()
    }
}
