//! # arbor-schema — Schema Registry
//!
//! Consumes pre-parsed module descriptors (the schema compiler's
//! output) and compiles them into the immutable [`SchemaGraph`] that
//! every codec operation reads from.
//!
//! ## Responsibilities
//!
//! - **Descriptor loading** ([`descriptor`]): serde types for module
//!   descriptor documents, loadable from YAML or JSON strings and
//!   from a descriptor directory.
//!
//! - **Graph construction** ([`graph`]): the one expensive,
//!   failure-prone step. [`SchemaGraph::build`] rejects inconsistent
//!   or incomplete module sets (unresolved imports, duplicate names)
//!   instead of producing a partially usable registry.
//!
//! - **Queries**: hierarchical [`SchemaGraph::resolve`], the full
//!   node set from one pre-order traversal
//!   ([`SchemaGraph::all_nodes`]), and the memoized O(1)
//!   [`SchemaGraph::node_for_qname`] index.
//!
//! ## Lifecycle
//!
//! A graph is built once at startup and is read-only afterwards; it
//! can be shared across threads freely (`SchemaGraph` is `Send +
//! Sync` and all queries take `&self`).

pub mod descriptor;
pub mod graph;

// Re-export primary types.
pub use descriptor::{
    AugmentDescriptor, CaseDescriptor, DescriptorError, LeafType, ModuleDescriptor,
    ModuleDescriptorSet, NodeDescriptor, TargetSegment,
};
pub use graph::{NodeId, SchemaBuildError, SchemaGraph, SchemaKind, SchemaNode};
