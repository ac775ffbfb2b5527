//! # arbor-codec — JSON Text Codec & Context
//!
//! Streams normalized trees to and from JSON text, and ties the whole
//! pipeline together behind [`CodecContext`].
//!
//! ## Key convention
//!
//! The target node of a write determines the default namespace
//! context: a child sharing its parent's namespace is keyed by its
//! bare local name, a child in a different namespace by
//! `namespace:local`. The target itself is not wrapped; its children
//! form the root JSON object.
//!
//! ## Modes
//!
//! Compact output carries no whitespace; pretty output uses 2-space
//! indentation. Parsing either form yields the same tree.
//!
//! ## Failure discipline
//!
//! The writer validates the whole tree against the schema before any
//! text is produced, so a failed write never leaks a partial
//! document. The reader reports unknown members, namespace
//! mismatches, and ill-typed values with the offending key and its
//! document path.

pub mod context;
pub mod reader;
pub mod writer;

// Re-export primary types.
pub use context::{CodecContext, CodecError};
pub use reader::{JsonReader, ParseError};
pub use writer::{JsonWriter, WriteError};
