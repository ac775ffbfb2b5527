//! # Generated Object Contract
//!
//! Generated object types implement [`DataObject`] and are identified
//! by a [`TypeTag`] the code generator assigns. The codec never
//! introspects values to find a type's schema identity; the tag is
//! looked up in the statically built binding table.

use std::any::Any;
use std::fmt;

use arbor_core::ScalarValue;

/// Stable identifier of a generated object type.
///
/// Assigned by the code generator and registered with the binding
/// table; the tag, not runtime type introspection, is what ties an
/// object to its schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag(&'static str);

impl TypeTag {
    pub const fn new(tag: &'static str) -> Self {
        Self(tag)
    }

    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Contract implemented by generated object types.
///
/// `field` exposes only the fields actually present on the instance,
/// keyed by the schema child's local name; an absent optional field
/// returns `None` and therefore never produces a tree node.
pub trait DataObject: Any + fmt::Debug {
    /// The tag registered for this type in the binding table.
    fn type_tag(&self) -> TypeTag;

    /// Look up a present field by schema local name.
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// A present field as exposed by a [`DataObject`].
///
/// Collection variants preserve the instance's encounter order; the
/// codec never reorders them.
pub enum FieldValue<'a> {
    Leaf(ScalarValue),
    LeafList(Vec<ScalarValue>),
    Container(&'a dyn DataObject),
    List(Vec<&'a dyn DataObject>),
}

impl FieldValue<'_> {
    /// Human-readable shape name for error reports.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Leaf(_) => "leaf",
            Self::LeafList(_) => "leaf-list",
            Self::Container(_) => "container",
            Self::List(_) => "list",
        }
    }
}

/// A field decoded from a normalized tree, on its way into an object
/// factory.
#[derive(Debug)]
pub enum DecodedField {
    Leaf(ScalarValue),
    LeafList(Vec<ScalarValue>),
    Container(Box<dyn DataObject>),
    List(Vec<Box<dyn DataObject>>),
}

/// The decoded fields of one tree node, handed to the registered
/// object factory. Field order is the tree's encounter order.
///
/// A field absent from the map was absent from the tree; factories
/// must leave the corresponding object field unset rather than
/// defaulting it.
#[derive(Debug, Default)]
pub struct FieldMap {
    fields: Vec<(String, DecodedField)>,
}

impl FieldMap {
    pub fn insert(&mut self, name: impl Into<String>, field: DecodedField) {
        self.fields.push((name.into(), field));
    }

    /// Remove and return a field by local name.
    pub fn take(&mut self, name: &str) -> Option<DecodedField> {
        let idx = self.fields.iter().position(|(n, _)| n == name)?;
        Some(self.fields.remove(idx).1)
    }

    /// Remove a leaf field's scalar.
    pub fn take_leaf(&mut self, name: &str) -> Option<ScalarValue> {
        match self.take(name)? {
            DecodedField::Leaf(value) => Some(value),
            _ => None,
        }
    }

    /// Remove a leaf-list field's scalars.
    pub fn take_leaf_list(&mut self, name: &str) -> Option<Vec<ScalarValue>> {
        match self.take(name)? {
            DecodedField::LeafList(values) => Some(values),
            _ => None,
        }
    }

    /// Remove a container field and downcast it to its generated type.
    pub fn take_object<T: DataObject>(&mut self, name: &str) -> Option<T> {
        match self.take(name)? {
            DecodedField::Container(obj) => obj.into_any().downcast::<T>().ok().map(|b| *b),
            _ => None,
        }
    }

    /// Remove a list field and downcast every entry.
    pub fn take_list<T: DataObject>(&mut self, name: &str) -> Option<Vec<T>> {
        match self.take(name)? {
            DecodedField::List(objs) => objs
                .into_iter()
                .map(|obj| obj.into_any().downcast::<T>().ok().map(|b| *b))
                .collect(),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Remaining field names, in encounter order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Probe {
        id: i64,
    }

    impl DataObject for Probe {
        fn type_tag(&self) -> TypeTag {
            TypeTag::new("probe")
        }

        fn field(&self, name: &str) -> Option<FieldValue<'_>> {
            match name {
                "id" => Some(FieldValue::Leaf(ScalarValue::Int64(self.id))),
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

    #[test]
    fn take_removes_in_any_order() {
        let mut map = FieldMap::default();
        map.insert("a", DecodedField::Leaf(ScalarValue::Int64(1)));
        map.insert("b", DecodedField::Leaf(ScalarValue::Boolean(true)));

        assert_eq!(map.take_leaf("b"), Some(ScalarValue::Boolean(true)));
        assert_eq!(map.take_leaf("a"), Some(ScalarValue::Int64(1)));
        assert_eq!(map.take_leaf("a"), None);
        assert!(map.is_empty());
    }

    #[test]
    fn take_object_downcasts() {
        let mut map = FieldMap::default();
        map.insert("probe", DecodedField::Container(Box::new(Probe { id: 7 })));
        let probe: Probe = map.take_object("probe").unwrap();
        assert_eq!(probe, Probe { id: 7 });
    }

    #[test]
    fn take_list_downcasts_entries() {
        let mut map = FieldMap::default();
        map.insert(
            "probes",
            DecodedField::List(vec![
                Box::new(Probe { id: 1 }) as Box<dyn DataObject>,
                Box::new(Probe { id: 2 }),
            ]),
        );
        let probes: Vec<Probe> = map.take_list("probes").unwrap();
        assert_eq!(probes, [Probe { id: 1 }, Probe { id: 2 }]);
    }
}
