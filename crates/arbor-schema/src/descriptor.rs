//! # Module Descriptors
//!
//! The pre-parsed form in which schema modules reach this crate. The
//! schema definition language and its compiler are external
//! collaborators; a descriptor document is that compiler's output,
//! one module per document.
//!
//! ## Document shape
//!
//! ```yaml
//! name: inventory
//! namespace: urn:example:inventory
//! revision: 2024-01-15
//! imports: [common]
//! body:
//!   - kind: container
//!     name: top
//!     children:
//!       - kind: leaf
//!         name: name
//!         type: string
//!       - kind: list
//!         name: items
//!         key: [id]
//!         children:
//!           - kind: leaf
//!             name: id
//!             type: int64
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use arbor_core::{ScalarKind, ScalarValue};
use thiserror::Error;

/// Errors raised while loading descriptor documents.
#[derive(Error, Debug)]
pub enum DescriptorError {
    /// A descriptor file could not be read.
    #[error("failed to read descriptor `{path}`")]
    Read {
        /// The offending file.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A YAML descriptor document failed to parse.
    #[error("malformed YAML descriptor: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON descriptor document failed to parse.
    #[error("malformed JSON descriptor: {0}")]
    Json(#[from] serde_json::Error),

    /// A descriptor file has an extension other than yaml/yml/json.
    #[error("unsupported descriptor extension on `{path}`")]
    UnsupportedExtension {
        /// The offending file.
        path: PathBuf,
    },
}

/// One schema module, as emitted by the schema compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleDescriptor {
    /// Module name, referenced by `imports` of other modules.
    pub name: String,
    /// Namespace URI shared by every node the module defines.
    pub namespace: String,
    /// Optional `YYYY-MM-DD` revision stamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    /// Names of modules this module depends on. Every import must be
    /// present in the descriptor set handed to the graph builder.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    /// Top-level data nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub body: Vec<NodeDescriptor>,
    /// Children this module grafts onto nodes of other modules. The
    /// grafted nodes keep this module's namespace, which is how a
    /// container ends up with children in a foreign namespace.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub augments: Vec<AugmentDescriptor>,
}

impl ModuleDescriptor {
    /// Parse one module from a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, DescriptorError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parse one module from a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self, DescriptorError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// One schema node declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NodeDescriptor {
    /// Interior node with named children.
    Container {
        name: String,
        #[serde(default)]
        children: Vec<NodeDescriptor>,
    },
    /// Keyed, ordered list of entries.
    List {
        name: String,
        /// Local names of the key leaves; each must name a leaf child.
        #[serde(default)]
        key: Vec<String>,
        #[serde(default)]
        children: Vec<NodeDescriptor>,
    },
    /// Single scalar.
    Leaf {
        name: String,
        #[serde(rename = "type")]
        leaf_type: LeafType,
        /// Whether the leaf must be present on every instance.
        #[serde(default)]
        mandatory: bool,
    },
    /// Ordered scalars under one name.
    LeafList {
        name: String,
        #[serde(rename = "type")]
        leaf_type: LeafType,
    },
    /// Alternative sub-shapes; exactly one case appears in data, and
    /// neither the choice nor the case contributes a tree level.
    Choice {
        name: String,
        #[serde(default)]
        cases: Vec<CaseDescriptor>,
    },
}

impl NodeDescriptor {
    /// The declared local name.
    pub fn name(&self) -> &str {
        match self {
            Self::Container { name, .. }
            | Self::List { name, .. }
            | Self::Leaf { name, .. }
            | Self::LeafList { name, .. }
            | Self::Choice { name, .. } => name,
        }
    }
}

/// One case of a choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseDescriptor {
    pub name: String,
    #[serde(default)]
    pub children: Vec<NodeDescriptor>,
}

/// One augmentation: extra children for a node another module owns.
///
/// Applied after every module's own tree is built, so a module may
/// augment a node regardless of descriptor-set order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AugmentDescriptor {
    /// Root-to-node path of the target. Segments match on namespace
    /// and local name; revisions are not consulted.
    pub target: Vec<TargetSegment>,
    #[serde(default)]
    pub children: Vec<NodeDescriptor>,
}

/// One segment of an augment target path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSegment {
    pub namespace: String,
    pub local_name: String,
}

/// Declared type of a leaf or leaf-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeafType {
    Int64,
    Uint64,
    Boolean,
    String,
    /// Closed set of labels.
    Enumeration(Vec<String>),
    /// Reference to another schema identity, rendered
    /// `namespace:local` on the wire.
    IdentityRef,
}

impl LeafType {
    /// The scalar kind this type stores.
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Int64 => ScalarKind::Int64,
            Self::Uint64 => ScalarKind::Uint64,
            Self::Boolean => ScalarKind::Boolean,
            Self::String => ScalarKind::String,
            Self::Enumeration(_) => ScalarKind::Enumeration,
            Self::IdentityRef => ScalarKind::IdentityRef,
        }
    }

    /// Whether `value` conforms to this type, including enumeration
    /// membership.
    pub fn accepts(&self, value: &ScalarValue) -> bool {
        match (self, value) {
            (Self::Enumeration(labels), ScalarValue::Enum(label)) => {
                labels.iter().any(|l| l == label)
            }
            _ => self.kind() == value.kind(),
        }
    }
}

/// The full descriptor set handed to [`SchemaGraph::build`].
///
/// [`SchemaGraph::build`]: crate::graph::SchemaGraph::build
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleDescriptorSet {
    modules: Vec<ModuleDescriptor>,
}

impl ModuleDescriptorSet {
    pub fn new(modules: Vec<ModuleDescriptor>) -> Self {
        Self { modules }
    }

    /// Load every `*.yaml`, `*.yml`, and `*.json` file under `dir`,
    /// one module per file, in file-name order.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, DescriptorError> {
        let dir = dir.as_ref();
        let read = |path: &Path| {
            fs::read_to_string(path).map_err(|source| DescriptorError::Read {
                path: path.to_path_buf(),
                source,
            })
        };

        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|source| DescriptorError::Read {
                path: dir.to_path_buf(),
                source,
            })?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect();
        paths.sort();

        let mut modules = Vec::new();
        for path in paths {
            let module = match path.extension().and_then(|e| e.to_str()) {
                Some("yaml") | Some("yml") => ModuleDescriptor::from_yaml_str(&read(&path)?)?,
                Some("json") => ModuleDescriptor::from_json_str(&read(&path)?)?,
                _ => return Err(DescriptorError::UnsupportedExtension { path }),
            };
            tracing::debug!(module = %module.name, path = %path.display(), "loaded module descriptor");
            modules.push(module);
        }
        Ok(Self { modules })
    }

    pub fn push(&mut self, module: ModuleDescriptor) {
        self.modules.push(module);
    }

    pub fn modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl From<Vec<ModuleDescriptor>> for ModuleDescriptorSet {
    fn from(modules: Vec<ModuleDescriptor>) -> Self {
        Self::new(modules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const INVENTORY_YAML: &str = r#"
name: inventory
namespace: urn:example:inventory
revision: 2024-01-15
body:
  - kind: container
    name: top
    children:
      - kind: leaf
        name: name
        type: string
        mandatory: true
      - kind: leaf-list
        name: tags
        type: string
      - kind: list
        name: items
        key: [id]
        children:
          - kind: leaf
            name: id
            type: int64
"#;

    #[test]
    fn parses_yaml_module() {
        let module = ModuleDescriptor::from_yaml_str(INVENTORY_YAML).unwrap();
        assert_eq!(module.name, "inventory");
        assert_eq!(module.revision.as_deref(), Some("2024-01-15"));
        assert_eq!(module.body.len(), 1);
        let NodeDescriptor::Container { children, .. } = &module.body[0] else {
            panic!("expected container");
        };
        assert_eq!(children.len(), 3);
        assert!(matches!(
            &children[0],
            NodeDescriptor::Leaf { mandatory: true, .. }
        ));
    }

    #[test]
    fn parses_json_module_with_enumeration() {
        let module = ModuleDescriptor::from_json_str(
            r#"{
                "name": "status",
                "namespace": "urn:example:status",
                "body": [
                    {"kind": "leaf", "name": "state",
                     "type": {"enumeration": ["up", "down"]}}
                ]
            }"#,
        )
        .unwrap();
        let NodeDescriptor::Leaf { leaf_type, .. } = &module.body[0] else {
            panic!("expected leaf");
        };
        assert_eq!(
            leaf_type,
            &LeafType::Enumeration(vec!["up".into(), "down".into()])
        );
        assert!(leaf_type.accepts(&ScalarValue::Enum("up".into())));
        assert!(!leaf_type.accepts(&ScalarValue::Enum("sideways".into())));
        assert!(!leaf_type.accepts(&ScalarValue::String("up".into())));
    }

    #[test]
    fn rejects_unknown_module_fields() {
        let err = ModuleDescriptor::from_yaml_str(
            "name: m\nnamespace: urn:m\nfeatures: [x]\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("malformed YAML"));
    }

    #[test]
    fn leaf_type_accepts_integers_by_kind() {
        assert!(LeafType::Int64.accepts(&ScalarValue::Int64(-1)));
        assert!(!LeafType::Int64.accepts(&ScalarValue::Uint64(1)));
        assert!(LeafType::Uint64.accepts(&ScalarValue::Uint64(1)));
    }

    #[test]
    fn load_dir_reads_sorted_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut f1 = std::fs::File::create(dir.path().join("10-inventory.yaml")).unwrap();
        f1.write_all(INVENTORY_YAML.as_bytes()).unwrap();
        let mut f2 = std::fs::File::create(dir.path().join("00-common.json")).unwrap();
        f2.write_all(br#"{"name": "common", "namespace": "urn:example:common"}"#)
            .unwrap();

        let set = ModuleDescriptorSet::load_dir(dir.path()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.modules()[0].name, "common");
        assert_eq!(set.modules()[1].name, "inventory");
    }

    #[test]
    fn load_dir_rejects_stray_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        let err = ModuleDescriptorSet::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, DescriptorError::UnsupportedExtension { .. }));
    }
}
