//! # arbor-binding — Binding Index & Tree Codec
//!
//! The bridge between generated object types and the schema graph.
//!
//! ## Responsibilities
//!
//! - **Binding index** ([`registry`]): an explicit, statically built
//!   table mapping each generated type's [`TypeTag`] to its schema
//!   identity, with an object factory for the reverse direction.
//!   Registered once, immutable afterwards.
//!
//! - **Path resolution** ([`path`]): [`InstancePath`] segments carry
//!   static type information, so
//!   [`BindingRegistry::schema_path_for`] derives a [`SchemaPath`]
//!   without inspecting any values.
//!
//! - **Tree codec** ([`codec`]): walks the object graph and the
//!   schema graph in lockstep to convert between typed objects and
//!   the normalized tree, preserving encounter order and the exact
//!   set of present optional fields in both directions.
//!
//! Lookups that are expected to miss under normal operation (a type
//! outside the managed schema) return `Option`; hard failures are
//! reserved for structural mismatches.
//!
//! [`SchemaPath`]: arbor_core::SchemaPath

pub mod codec;
pub mod object;
pub mod path;
pub mod registry;

// Re-export primary types.
pub use codec::{DeserializeError, SerializeError, TreeCodec};
pub use object::{DataObject, DecodedField, FieldMap, FieldValue, TypeTag};
pub use path::{InstancePath, ListKey, PathSegment};
pub use registry::{BindingError, BindingRegistry, BindingRegistryBuilder, ObjectFactory, TypeBinding};
