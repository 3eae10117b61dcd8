//! Working set of one export, keyed by `(type, id)`.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::object::{ObjectRef, SavedObject};

/// Objects gathered so far, in insertion order.
///
/// Owned by a single export and never shared.
#[derive(Debug, Default)]
pub struct DiscoveredSet {
    objects: Vec<SavedObject>,
    index: HashMap<ObjectRef, usize>,
}

impl DiscoveredSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an object. Returns `false` and keeps the first copy if its
    /// identity is already present.
    pub fn insert(&mut self, obj: SavedObject) -> bool {
        let key = obj.object_ref();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.objects.len());
        self.objects.push(obj);
        true
    }

    pub fn contains(&self, key: &ObjectRef) -> bool {
        self.index.contains_key(key)
    }

    /// Insertion position of an object.
    pub fn position(&self, key: &ObjectRef) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[SavedObject] {
        &self.objects
    }

    pub fn into_objects(self) -> Vec<SavedObject> {
        self.objects
    }

    /// Reference targets that are not members of the set, skipping `exclude`.
    ///
    /// Returned once each, in the order they are first named.
    pub fn unresolved_references(&self, exclude: &BTreeSet<ObjectRef>) -> Vec<ObjectRef> {
        let mut seen = HashSet::new();
        self.objects
            .iter()
            .flat_map(|o| o.references.iter())
            .map(|r| r.target())
            .filter(|t| !self.contains(t) && !exclude.contains(t))
            .filter(|t| seen.insert(t.clone()))
            .collect()
    }
}
