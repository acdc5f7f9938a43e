use super::{
    application::{ElementId, RelationEnd},
    value::{Validity, Value},
};
use std::collections::{BTreeMap, BTreeSet};

/// Identifies an instance: owning application element plus instance id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceRef {
    pub element: ElementId,
    pub id: u64,
}

/// A stored attribute value with its validity.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeValue {
    pub value: Value,
    pub validity: Validity,
}

#[derive(Debug, Clone)]
pub struct InstanceElement {
    pub id: u64,
    pub name: String,
    pub(super) values: BTreeMap<String, AttributeValue>,
    /// Related instance ids per relation end, both directions.
    pub(super) edges: BTreeMap<RelationEnd, BTreeSet<u64>>,
}

impl InstanceElement {
    pub(super) fn new(id: u64, name: String) -> Self {
        Self {
            id,
            name,
            values: BTreeMap::new(),
            edges: BTreeMap::new(),
        }
    }

    pub fn value(&self, attribute: &str) -> Option<&AttributeValue> {
        self.values.get(attribute)
    }

    /// Attribute names that hold a value, in name order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub(super) fn related(&self, end: RelationEnd) -> impl Iterator<Item = u64> + '_ {
        self.edges.get(&end).into_iter().flatten().copied()
    }

    pub(super) fn related_count(&self, end: RelationEnd) -> usize {
        self.edges.get(&end).map_or(0, BTreeSet::len)
    }

    pub(super) fn link(&mut self, end: RelationEnd, id: u64) -> bool {
        self.edges.entry(end).or_default().insert(id)
    }

    pub(super) fn unlink(&mut self, end: RelationEnd, id: u64) -> bool {
        let Some(set) = self.edges.get_mut(&end) else {
            return false;
        };
        let removed = set.remove(&id);
        if set.is_empty() {
            self.edges.remove(&end);
        }
        removed
    }
}
