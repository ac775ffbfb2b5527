//! # Binding Index Lookup Tests
//!
//! Type-to-schema resolution across crates: option-typed misses for
//! unmapped types, instance-path derivation, and agreement between
//! the memoized O(1) lookup and the legacy linear scan.

mod common;

use common::{context, registry, schema_graph, top_path, ITEM_TAG, TOP_TAG};

use arbor_binding::{BindingError, InstancePath, TypeTag};
use arbor_core::QName;
use arbor_schema::SchemaKind;

#[test]
fn unmapped_type_is_a_miss_not_an_error() {
    let ctx = context();
    let stranger = TypeTag::new("model.stranger");
    assert!(ctx.registry().qualified_name_for(stranger).is_none());
    assert!(ctx.schema_node_for_object_type(stranger).is_none());
}

#[test]
fn schema_path_derivation_is_type_driven() {
    let ctx = context();
    let path = top_path().child(ITEM_TAG);
    let schema_path = ctx.schema_path_for(&path).unwrap();
    assert_eq!(
        schema_path.components(),
        [
            QName::new(common::CORE_NS, "top").unwrap(),
            QName::new(common::EXT_NS, "items").unwrap(),
        ]
    );

    let broken = top_path().child(TypeTag::new("model.stranger"));
    assert!(matches!(
        ctx.schema_path_for(&broken).unwrap_err(),
        BindingError::UnresolvedSegment { .. }
    ));
}

#[test]
fn indexed_lookup_resolves_every_bound_type() {
    let ctx = context();
    let top = ctx.schema_node_for_object_type(TOP_TAG).unwrap();
    assert_eq!(top.kind(), SchemaKind::Container);
    assert_eq!(top.qname().local_name(), "top");

    let items = ctx.schema_node_for_object_type(ITEM_TAG).unwrap();
    assert_eq!(items.kind(), SchemaKind::List);
    assert_eq!(items.keys(), ["id"]);
}

#[test]
#[allow(deprecated)]
fn legacy_scan_agrees_with_the_memoized_index() {
    let graph = schema_graph();
    let registry = registry();

    for tag in [TOP_TAG, ITEM_TAG] {
        let indexed = registry.schema_node_for_type(&graph, tag).unwrap();
        let scanned = registry.schema_node_for_type_scan(&graph, tag).unwrap();
        assert_eq!(indexed.id(), scanned.id());
    }

    let stranger = TypeTag::new("model.stranger");
    assert!(registry.schema_node_for_type(&graph, stranger).is_none());
    assert!(registry
        .schema_node_for_type_scan(&graph, stranger)
        .is_none());
}

#[test]
fn empty_instance_path_resolves_to_the_root_path() {
    let ctx = context();
    let schema_path = ctx.schema_path_for(&InstancePath::default()).unwrap();
    assert!(schema_path.is_empty());
}
