//! In-memory saved-objects store.
//!
//! Holds objects in insertion order behind a lock. Can be seeded from an
//! NDJSON export file, in which case summary lines are skipped, so the output
//! of one export can serve as the store of the next.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::{BulkGetOptions, BulkGetResponse, FindOptions, FindResponse, SavedObjectsStore};
use crate::object::{ObjectRef, SavedObject};
use crate::store::Result;

/// Namespace assumed for objects that do not list any.
pub const DEFAULT_NAMESPACE: &str = "default";

#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<Vec<SavedObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_objects(objects: impl IntoIterator<Item = SavedObject>) -> Self {
        let store = Self::new();
        for obj in objects {
            store.insert(obj);
        }
        store
    }

    /// Load objects from NDJSON, one saved object per line.
    ///
    /// Blank lines and export summary lines are ignored.
    pub fn from_ndjson_reader<R: BufRead>(reader: R) -> Result<Self> {
        let store = Self::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(&line)?;
            if value.get("exportedCount").is_some() {
                continue;
            }
            store.insert(serde_json::from_value(value)?);
        }
        tracing::debug!("Loaded {} saved objects", store.len());
        Ok(store)
    }

    pub fn from_ndjson_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_ndjson_reader(BufReader::new(file))
    }

    /// Insert an object, replacing any existing object with the same identity.
    pub fn insert(&self, obj: SavedObject) {
        let mut objects = self.objects.write();
        match objects
            .iter_mut()
            .find(|o| o.object_type == obj.object_type && o.id == obj.id)
        {
            Some(existing) => *existing = obj,
            None => objects.push(obj),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Distinct object types held, sorted.
    pub fn types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .objects
            .read()
            .iter()
            .map(|o| o.object_type.clone())
            .collect();
        types.sort();
        types.dedup();
        types
    }
}

fn in_namespace(obj: &SavedObject, namespace: &str) -> bool {
    match &obj.namespaces {
        Some(namespaces) => namespaces.iter().any(|ns| ns == namespace || ns == "*"),
        None => namespace == DEFAULT_NAMESPACE,
    }
}

/// Objects without workspaces are global and visible from every workspace.
fn in_workspaces(obj: &SavedObject, workspaces: &[String]) -> bool {
    match obj.workspaces() {
        Some(assigned) => assigned
            .iter()
            .any(|ws| workspaces.iter().any(|w| w == ws)),
        None => true,
    }
}

/// Case-insensitive word match of every search term against string attributes.
///
/// A term ending in `*` matches word prefixes; `*` alone matches everything.
fn matches_search(obj: &SavedObject, search: &str) -> bool {
    let terms: Vec<String> = search
        .split_whitespace()
        .filter(|t| *t != "*")
        .map(str::to_lowercase)
        .collect();
    if terms.is_empty() {
        return true;
    }

    let mut words = Vec::new();
    for value in obj.attributes.values() {
        collect_words(value, &mut words);
    }

    terms.iter().all(|term| match term.strip_suffix('*') {
        Some(prefix) => words.iter().any(|w| w.starts_with(prefix)),
        None => words.iter().any(|w| w == term),
    })
}

fn collect_words(value: &Value, words: &mut Vec<String>) {
    match value {
        Value::String(s) => words.extend(
            s.split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty())
                .map(str::to_lowercase),
        ),
        Value::Array(items) => items.iter().for_each(|v| collect_words(v, words)),
        _ => {}
    }
}

#[async_trait]
impl SavedObjectsStore for MemoryStore {
    async fn find(&self, options: &FindOptions) -> Result<FindResponse> {
        let objects = self.objects.read();
        let matching: Vec<&SavedObject> = objects
            .iter()
            .filter(|o| options.types.iter().any(|t| *t == o.object_type))
            .filter(|o| match &options.namespaces {
                Some(namespaces) => namespaces.iter().any(|ns| in_namespace(o, ns)),
                None => true,
            })
            .filter(|o| match &options.search {
                Some(search) => matches_search(o, search),
                None => true,
            })
            .collect();

        Ok(FindResponse {
            total: matching.len(),
            saved_objects: matching
                .into_iter()
                .take(options.per_page)
                .cloned()
                .collect(),
        })
    }

    async fn bulk_get(
        &self,
        requested: &[ObjectRef],
        options: &BulkGetOptions,
    ) -> Result<BulkGetResponse> {
        let objects = self.objects.read();
        let saved_objects = requested
            .iter()
            .filter_map(|r| {
                objects
                    .iter()
                    .find(|o| o.object_type == r.object_type && o.id == r.id)
            })
            .filter(|o| match &options.namespace {
                Some(ns) => in_namespace(o, ns),
                None => true,
            })
            .filter(|o| match &options.workspaces {
                Some(ws) => in_workspaces(o, ws),
                None => true,
            })
            .cloned()
            .collect();

        Ok(BulkGetResponse { saved_objects })
    }

    fn name(&self) -> &str {
        "memory"
    }
}
