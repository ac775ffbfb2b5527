//! # Normalized Tree
//!
//! The generic, schema-typed intermediate representation. A
//! [`NormalizedNode`] is tagged with the qualified name of the schema
//! node it instantiates and holds either a scalar, an ordered set of
//! named children, or a leaf-list of scalars.
//!
//! ## Ordering
//!
//! Children and list entries are kept in encounter order. The codecs
//! never reorder by qualified name, so serializing the same object
//! twice produces byte-identical text.
//!
//! ## Presence
//!
//! A field absent on the source object simply has no node here. There
//! are no null placeholders anywhere in the tree.

use crate::qname::QName;
use crate::value::ScalarValue;

/// One node of the normalized tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedNode {
    /// Interior node with named children.
    Container(ContainerNode),
    /// Ordered list of entries sharing one schema identity.
    List(ListNode),
    /// Single scalar.
    Leaf(LeafNode),
    /// Ordered scalars under one name.
    LeafList(LeafListNode),
}

impl NormalizedNode {
    /// The qualified name of the schema node this node instantiates.
    pub fn qname(&self) -> &QName {
        match self {
            Self::Container(n) => &n.qname,
            Self::List(n) => &n.qname,
            Self::Leaf(n) => &n.qname,
            Self::LeafList(n) => &n.qname,
        }
    }

    /// Human-readable shape name for error reports.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Container(_) => "container",
            Self::List(_) => "list",
            Self::Leaf(_) => "leaf",
            Self::LeafList(_) => "leaf-list",
        }
    }

    pub fn as_container(&self) -> Option<&ContainerNode> {
        match self {
            Self::Container(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListNode> {
        match self {
            Self::List(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafNode> {
        match self {
            Self::Leaf(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_leaf_list(&self) -> Option<&LeafListNode> {
        match self {
            Self::LeafList(n) => Some(n),
            _ => None,
        }
    }
}

/// Interior node holding named children in encounter order.
///
/// Also serves as one entry of a [`ListNode`], in which case it shares
/// the list's qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerNode {
    qname: QName,
    children: Vec<NormalizedNode>,
}

impl ContainerNode {
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            children: Vec::new(),
        }
    }

    pub fn qname(&self) -> &QName {
        &self.qname
    }

    /// Append a child. Callers keep sibling names unique; the codecs
    /// only ever build one child per schema child.
    pub fn push(&mut self, child: NormalizedNode) {
        self.children.push(child);
    }

    /// Ordered-mapping lookup by qualified name.
    pub fn child(&self, qname: &QName) -> Option<&NormalizedNode> {
        self.children.iter().find(|c| c.qname() == qname)
    }

    pub fn children(&self) -> &[NormalizedNode] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Ordered list of entries, each a [`ContainerNode`] with the list's
/// own qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListNode {
    qname: QName,
    entries: Vec<ContainerNode>,
}

impl ListNode {
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            entries: Vec::new(),
        }
    }

    pub fn qname(&self) -> &QName {
        &self.qname
    }

    /// Append an entry. Entries share the list's qualified name.
    pub fn push(&mut self, entry: ContainerNode) {
        debug_assert_eq!(entry.qname(), &self.qname);
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ContainerNode] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A single named scalar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafNode {
    qname: QName,
    value: ScalarValue,
}

impl LeafNode {
    pub fn new(qname: QName, value: ScalarValue) -> Self {
        Self { qname, value }
    }

    pub fn qname(&self) -> &QName {
        &self.qname
    }

    pub fn value(&self) -> &ScalarValue {
        &self.value
    }
}

/// Ordered scalars under one name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafListNode {
    qname: QName,
    values: Vec<ScalarValue>,
}

impl LeafListNode {
    pub fn new(qname: QName, values: Vec<ScalarValue>) -> Self {
        Self { qname, values }
    }

    pub fn qname(&self) -> &QName {
        &self.qname
    }

    pub fn values(&self) -> &[ScalarValue] {
        &self.values
    }
}
