//! # Schema Graph
//!
//! The compiled, immutable schema model. Nodes live in an arena
//! indexed by [`NodeId`]; every non-root node has exactly one parent
//! back-reference, and qualified names are unique within a sibling
//! scope (enforced at build time). The root is virtual: its children
//! are the top-level nodes of every module in the set.
//!
//! Construction performs one full pre-order traversal, during which
//! the qualified-name index is memoized. Lookups after construction
//! never rescan the graph.

use std::collections::HashMap;

use arbor_core::{QName, SchemaPath, ValidationError};
use thiserror::Error;

use crate::descriptor::{
    AugmentDescriptor, CaseDescriptor, LeafType, ModuleDescriptor, ModuleDescriptorSet,
    NodeDescriptor,
};

/// Errors detected while compiling a descriptor set. All of them are
/// fatal: a graph is either fully consistent or not built at all.
#[derive(Error, Debug)]
pub enum SchemaBuildError {
    /// The descriptor set contains no modules.
    #[error("descriptor set is empty")]
    EmptyModuleSet,

    /// Two modules in the set share a name.
    #[error("duplicate module `{name}` in descriptor set")]
    DuplicateModule {
        /// The repeated module name.
        name: String,
    },

    /// A module imports a module that is not in the set.
    #[error("module `{module}` imports `{import}`, which is not in the descriptor set")]
    UnresolvedImport {
        /// The importing module.
        module: String,
        /// The missing import.
        import: String,
    },

    /// A declared name failed qualified-name validation.
    #[error("invalid name in module `{module}`")]
    InvalidName {
        /// The module declaring the name.
        module: String,
        #[source]
        source: ValidationError,
    },

    /// Two siblings share a qualified name.
    #[error("duplicate child `{child}` under `{scope}`")]
    DuplicateChild {
        /// The enclosing scope (`root` for top level).
        scope: String,
        /// The repeated name.
        child: QName,
    },

    /// An enumeration leaf declares no values.
    #[error("enumeration leaf `{leaf}` declares no values")]
    EmptyEnumeration {
        /// The offending leaf.
        leaf: QName,
    },

    /// A list key does not name a leaf child of the list.
    #[error("list key `{key}` of `{list}` must name a leaf child")]
    InvalidListKey {
        /// The list declaring the key.
        list: QName,
        /// The offending key name.
        key: String,
    },

    /// An augment target path does not resolve to a node.
    #[error("module `{module}` augments `{target}`, which does not exist")]
    UnresolvedAugment {
        /// The augmenting module.
        module: String,
        /// The unresolved target path.
        target: String,
    },

    /// An augment target is not a container or list.
    #[error("module `{module}` augments `{target}`, which cannot hold children")]
    InvalidAugmentTarget {
        /// The augmenting module.
        module: String,
        /// The rejected target path.
        target: String,
    },
}

/// Arena index of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// The structural kind of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Container,
    List,
    Leaf,
    LeafList,
    Choice,
    Case,
}

impl SchemaKind {
    /// Whether nodes of this kind appear in data trees. Choice and
    /// case structure the schema only.
    pub fn is_data_node(self) -> bool {
        !matches!(self, Self::Choice | Self::Case)
    }

    /// Whether nodes of this kind may carry children.
    pub fn is_container_like(self) -> bool {
        matches!(self, Self::Container | Self::List | Self::Choice | Self::Case)
    }
}

impl std::fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Container => "container",
            Self::List => "list",
            Self::Leaf => "leaf",
            Self::LeafList => "leaf-list",
            Self::Choice => "choice",
            Self::Case => "case",
        };
        f.write_str(name)
    }
}

/// One compiled schema node.
#[derive(Debug)]
pub struct SchemaNode {
    id: NodeId,
    qname: QName,
    kind: SchemaKind,
    leaf_type: Option<LeafType>,
    mandatory: bool,
    keys: Vec<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SchemaNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn qname(&self) -> &QName {
        &self.qname
    }

    pub fn kind(&self) -> SchemaKind {
        self.kind
    }

    /// Declared leaf type; present iff `kind` is leaf or leaf-list.
    pub fn leaf_type(&self) -> Option<&LeafType> {
        self.leaf_type.as_ref()
    }

    /// Whether a leaf must be present on every instance.
    pub fn mandatory(&self) -> bool {
        self.mandatory
    }

    /// Local names of the key leaves of a list node.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

/// The compiled schema graph and its query surface.
///
/// Built once, immutable afterwards; all queries take `&self`.
#[derive(Debug)]
pub struct SchemaGraph {
    nodes: Vec<SchemaNode>,
    top_level: Vec<NodeId>,
    by_qname: HashMap<QName, NodeId>,
    module_count: usize,
}

impl SchemaGraph {
    /// Compile a descriptor set. This is the one expensive,
    /// failure-prone step: an inconsistent or incomplete set is
    /// rejected here rather than producing a partially usable graph.
    pub fn build(set: &ModuleDescriptorSet) -> Result<Self, SchemaBuildError> {
        if set.is_empty() {
            return Err(SchemaBuildError::EmptyModuleSet);
        }

        let mut seen = std::collections::HashSet::new();
        for module in set.modules() {
            if !seen.insert(module.name.as_str()) {
                return Err(SchemaBuildError::DuplicateModule {
                    name: module.name.clone(),
                });
            }
        }
        for module in set.modules() {
            for import in &module.imports {
                if !seen.contains(import.as_str()) {
                    return Err(SchemaBuildError::UnresolvedImport {
                        module: module.name.clone(),
                        import: import.clone(),
                    });
                }
            }
        }

        let mut builder = GraphBuilder::default();
        for module in set.modules() {
            for desc in &module.body {
                builder.add_node(None, desc, module)?;
            }
        }
        // Augments run after every module's own tree exists, so a
        // module may graft onto a later module's nodes.
        for module in set.modules() {
            for augment in &module.augments {
                builder.apply_augment(module, augment)?;
            }
        }

        // Arena order is the order of the one construction walk, so a
        // single pass over it visits every node exactly once; the
        // first occurrence of a qualified name wins the index slot.
        let mut by_qname = HashMap::with_capacity(builder.nodes.len());
        for node in &builder.nodes {
            by_qname.entry(node.qname.clone()).or_insert(node.id);
        }

        let graph = Self {
            nodes: builder.nodes,
            top_level: builder.top_level,
            by_qname,
            module_count: set.len(),
        };
        tracing::debug!(
            modules = graph.module_count,
            nodes = graph.nodes.len(),
            "schema graph built"
        );
        Ok(graph)
    }

    /// Walk a schema path from the root. Returns `None` for the empty
    /// path (the root is virtual) and for any unknown component.
    /// Choice and case levels never appear in paths.
    pub fn resolve(&self, path: &SchemaPath) -> Option<&SchemaNode> {
        let mut scope: Option<&SchemaNode> = None;
        for qname in path.iter() {
            scope = Some(self.data_child(scope, qname)?);
        }
        scope
    }

    /// Every schema node, in the pre-order produced at build time.
    pub fn all_nodes(&self) -> impl Iterator<Item = &SchemaNode> {
        self.nodes.iter()
    }

    /// O(1) qualified-name lookup against the index memoized at build
    /// time. When a name occurs more than once in the graph, the
    /// first node in pre-order wins.
    pub fn node_for_qname(&self, qname: &QName) -> Option<&SchemaNode> {
        self.by_qname.get(qname).map(|&id| &self.nodes[id.0])
    }

    /// The data children of `scope` (`None` for the root), with
    /// choice and case levels expanded transparently.
    pub fn data_children(&self, scope: Option<&SchemaNode>) -> Vec<&SchemaNode> {
        let ids = match scope {
            Some(node) => &node.children,
            None => &self.top_level,
        };
        let mut out = Vec::new();
        self.collect_data_children(ids, &mut out);
        out
    }

    /// One data child of `scope` by qualified name, looking through
    /// choice and case levels.
    pub fn data_child(&self, scope: Option<&SchemaNode>, qname: &QName) -> Option<&SchemaNode> {
        self.data_children(scope)
            .into_iter()
            .find(|n| n.qname() == qname)
    }

    /// The root-to-node path of `node`, omitting choice and case
    /// levels.
    pub fn path_of(&self, node: &SchemaNode) -> SchemaPath {
        let mut components = Vec::new();
        let mut current = Some(node.id);
        while let Some(id) = current {
            let n = &self.nodes[id.0];
            if n.kind.is_data_node() {
                components.push(n.qname.clone());
            }
            current = n.parent;
        }
        components.reverse();
        SchemaPath::from_components(components)
    }

    /// The parent node, or `None` for top-level nodes.
    pub fn parent(&self, node: &SchemaNode) -> Option<&SchemaNode> {
        node.parent.map(|id| &self.nodes[id.0])
    }

    /// Direct children of `node`, including choice and case nodes.
    pub fn children<'a>(&'a self, node: &'a SchemaNode) -> impl Iterator<Item = &'a SchemaNode> {
        node.children.iter().map(move |&id| &self.nodes[id.0])
    }

    /// Top-level nodes across all modules.
    pub fn top_level_nodes(&self) -> impl Iterator<Item = &SchemaNode> {
        self.top_level.iter().map(move |&id| &self.nodes[id.0])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn module_count(&self) -> usize {
        self.module_count
    }

    fn collect_data_children<'a>(&'a self, ids: &[NodeId], out: &mut Vec<&'a SchemaNode>) {
        for &id in ids {
            let node = &self.nodes[id.0];
            if node.kind.is_data_node() {
                out.push(node);
            } else {
                self.collect_data_children(&node.children, out);
            }
        }
    }
}

#[derive(Default)]
struct GraphBuilder {
    nodes: Vec<SchemaNode>,
    top_level: Vec<NodeId>,
}

impl GraphBuilder {
    fn add_node(
        &mut self,
        parent: Option<NodeId>,
        desc: &NodeDescriptor,
        module: &ModuleDescriptor,
    ) -> Result<NodeId, SchemaBuildError> {
        let qname = self.qname_for(desc.name(), module)?;

        if let NodeDescriptor::Leaf {
            leaf_type: LeafType::Enumeration(values),
            ..
        } = desc
        {
            if values.is_empty() {
                return Err(SchemaBuildError::EmptyEnumeration { leaf: qname });
            }
        }

        let (kind, leaf_type, mandatory, keys) = match desc {
            NodeDescriptor::Container { .. } => (SchemaKind::Container, None, false, Vec::new()),
            NodeDescriptor::List { key, .. } => (SchemaKind::List, None, false, key.clone()),
            NodeDescriptor::Leaf {
                leaf_type,
                mandatory,
                ..
            } => (SchemaKind::Leaf, Some(leaf_type.clone()), *mandatory, Vec::new()),
            NodeDescriptor::LeafList { leaf_type, .. } => {
                (SchemaKind::LeafList, Some(leaf_type.clone()), false, Vec::new())
            }
            NodeDescriptor::Choice { .. } => (SchemaKind::Choice, None, false, Vec::new()),
        };

        let id = self.insert(parent, qname.clone(), kind, leaf_type, mandatory, keys)?;

        match desc {
            NodeDescriptor::Container { children, .. }
            | NodeDescriptor::List { children, .. } => {
                for child in children {
                    self.add_node(Some(id), child, module)?;
                }
            }
            NodeDescriptor::Choice { cases, .. } => {
                for case in cases {
                    self.add_case(id, case, module)?;
                }
            }
            NodeDescriptor::Leaf { .. } | NodeDescriptor::LeafList { .. } => {}
        }

        if let NodeDescriptor::List { key, .. } = desc {
            for key_name in key {
                let found = self.nodes[id.0].children.iter().any(|&child_id| {
                    let child = &self.nodes[child_id.0];
                    child.kind == SchemaKind::Leaf && child.qname.local_name() == key_name
                });
                if !found {
                    return Err(SchemaBuildError::InvalidListKey {
                        list: qname,
                        key: key_name.clone(),
                    });
                }
            }
        }

        Ok(id)
    }

    fn add_case(
        &mut self,
        choice: NodeId,
        case: &CaseDescriptor,
        module: &ModuleDescriptor,
    ) -> Result<NodeId, SchemaBuildError> {
        let qname = self.qname_for(&case.name, module)?;
        let id = self.insert(Some(choice), qname, SchemaKind::Case, None, false, Vec::new())?;
        for child in &case.children {
            self.add_node(Some(id), child, module)?;
        }
        Ok(id)
    }

    fn apply_augment(
        &mut self,
        module: &ModuleDescriptor,
        augment: &AugmentDescriptor,
    ) -> Result<(), SchemaBuildError> {
        let target_display = || {
            augment
                .target
                .iter()
                .map(|s| format!("/{}:{}", s.namespace, s.local_name))
                .collect::<String>()
        };

        let mut scope: Option<NodeId> = None;
        for segment in &augment.target {
            scope = Some(
                self.find_data_child(scope, &segment.namespace, &segment.local_name)
                    .ok_or_else(|| SchemaBuildError::UnresolvedAugment {
                        module: module.name.clone(),
                        target: target_display(),
                    })?,
            );
        }
        let target = scope.ok_or_else(|| SchemaBuildError::UnresolvedAugment {
            module: module.name.clone(),
            target: target_display(),
        })?;

        if !matches!(
            self.nodes[target.0].kind,
            SchemaKind::Container | SchemaKind::List
        ) {
            return Err(SchemaBuildError::InvalidAugmentTarget {
                module: module.name.clone(),
                target: target_display(),
            });
        }

        for child in &augment.children {
            self.add_node(Some(target), child, module)?;
        }
        Ok(())
    }

    fn find_data_child(&self, scope: Option<NodeId>, ns: &str, local: &str) -> Option<NodeId> {
        let ids = match scope {
            Some(id) => &self.nodes[id.0].children,
            None => &self.top_level,
        };
        self.search_data(ids, ns, local)
    }

    fn search_data(&self, ids: &[NodeId], ns: &str, local: &str) -> Option<NodeId> {
        for &id in ids {
            let node = &self.nodes[id.0];
            match node.kind {
                SchemaKind::Choice | SchemaKind::Case => {
                    if let Some(hit) = self.search_data(&node.children, ns, local) {
                        return Some(hit);
                    }
                }
                _ => {
                    if node.qname.namespace() == ns && node.qname.local_name() == local {
                        return Some(id);
                    }
                }
            }
        }
        None
    }

    fn qname_for(&self, name: &str, module: &ModuleDescriptor) -> Result<QName, SchemaBuildError> {
        QName::create(&module.namespace, module.revision.clone(), name).map_err(|source| {
            SchemaBuildError::InvalidName {
                module: module.name.clone(),
                source,
            }
        })
    }

    fn insert(
        &mut self,
        parent: Option<NodeId>,
        qname: QName,
        kind: SchemaKind,
        leaf_type: Option<LeafType>,
        mandatory: bool,
        keys: Vec<String>,
    ) -> Result<NodeId, SchemaBuildError> {
        let siblings = match parent {
            Some(p) => &self.nodes[p.0].children,
            None => &self.top_level,
        };
        if siblings.iter().any(|&s| self.nodes[s.0].qname == qname) {
            let scope = match parent {
                Some(p) => self.nodes[p.0].qname.to_string(),
                None => "root".to_string(),
            };
            return Err(SchemaBuildError::DuplicateChild {
                scope,
                child: qname,
            });
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(SchemaNode {
            id,
            qname,
            kind,
            leaf_type,
            mandatory,
            keys,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p.0].children.push(id),
            None => self.top_level.push(id),
        }
        Ok(id)
    }
}
