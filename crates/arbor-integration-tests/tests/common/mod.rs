//! Shared fixture playing the role of the code generator's output:
//! a two-module schema (`core` owning container `top`, `ext` grafting
//! the `items` list onto it in its own namespace) and the matching
//! hand-written generated types, bindings, and factories.

use std::any::Any;

use arbor_binding::{
    BindingRegistry, DataObject, FieldMap, FieldValue, InstancePath, TypeBinding, TypeTag,
};
use arbor_codec::CodecContext;
use arbor_core::{QName, ScalarValue};
use arbor_schema::{ModuleDescriptor, ModuleDescriptorSet, SchemaGraph};

pub const CORE_NS: &str = "urn:mod:core";
pub const EXT_NS: &str = "urn:mod:ext";

pub const TOP_TAG: TypeTag = TypeTag::new("model.top");
pub const ITEM_TAG: TypeTag = TypeTag::new("model.item");

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Top {
    pub name: Option<String>,
    pub items: Option<Vec<Item>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    pub id: Option<i64>,
}

impl DataObject for Top {
    fn type_tag(&self) -> TypeTag {
        TOP_TAG
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "name" => self
                .name
                .as_ref()
                .map(|v| FieldValue::Leaf(ScalarValue::String(v.clone()))),
            "items" => self.items.as_ref().map(|items| {
                FieldValue::List(items.iter().map(|i| i as &dyn DataObject).collect())
            }),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl DataObject for Item {
    fn type_tag(&self) -> TypeTag {
        ITEM_TAG
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "id" => self.id.map(|v| FieldValue::Leaf(ScalarValue::Int64(v))),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

fn top_factory(mut fields: FieldMap) -> Result<Box<dyn DataObject>, String> {
    Ok(Box::new(Top {
        name: fields.take_leaf("name").and_then(|v| match v {
            ScalarValue::String(s) => Some(s),
            _ => None,
        }),
        items: fields.take_list::<Item>("items"),
    }))
}

fn item_factory(mut fields: FieldMap) -> Result<Box<dyn DataObject>, String> {
    Ok(Box::new(Item {
        id: fields.take_leaf("id").and_then(|v| match v {
            ScalarValue::Int64(i) => Some(i),
            _ => None,
        }),
    }))
}

pub fn schema_graph() -> SchemaGraph {
    let core = ModuleDescriptor::from_yaml_str(
        r#"
name: core
namespace: urn:mod:core
body:
  - kind: container
    name: top
    children:
      - kind: leaf
        name: name
        type: string
"#,
    )
    .unwrap();
    let ext = ModuleDescriptor::from_yaml_str(
        r#"
name: ext
namespace: urn:mod:ext
imports: [core]
augments:
  - target:
      - namespace: urn:mod:core
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
    SchemaGraph::build(&ModuleDescriptorSet::new(vec![core, ext])).unwrap()
}

pub fn registry() -> BindingRegistry {
    BindingRegistry::builder()
        .register(TypeBinding::new(
            TOP_TAG,
            QName::new(CORE_NS, "top").unwrap(),
            top_factory,
        ))
        .unwrap()
        .register(TypeBinding::new(
            ITEM_TAG,
            QName::new(EXT_NS, "items").unwrap(),
            item_factory,
        ))
        .unwrap()
        .build()
}

pub fn context() -> CodecContext {
    CodecContext::new(schema_graph(), registry())
}

pub fn top_path() -> InstancePath {
    InstancePath::of(TOP_TAG)
}

pub fn sample() -> Top {
    Top {
        name: Some("alpha".to_string()),
        items: Some(vec![Item { id: Some(1) }, Item { id: Some(2) }]),
    }
}
