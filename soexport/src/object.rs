//! Saved object data model.
//!
//! A saved object is identified by its `(type, id)` pair. Attributes are kept
//! as an opaque, order-preserving JSON map; the engine only looks inside them
//! for the credential sub-structure handled by the redactor.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Identity of a saved object: the `(type, id)` pair.
///
/// Ordering is by type first, then id, which is the order used for the
/// missing-reference list in the export summary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectRef {
    #[serde(rename = "type")]
    pub object_type: String,
    pub id: String,
}

impl ObjectRef {
    pub fn new(object_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.object_type, self.id)
    }
}

impl FromStr for ObjectRef {
    type Err = String;

    /// Parses `type:id`. The id may itself contain colons.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((object_type, id)) if !object_type.is_empty() && !id.is_empty() => {
                Ok(ObjectRef::new(object_type, id))
            }
            _ => Err(format!(
                "Invalid object reference '{}'. Expected TYPE:ID",
                s
            )),
        }
    }
}

/// A named, typed edge from one saved object to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedObjectReference {
    pub name: String,
    #[serde(rename = "type")]
    pub ref_type: String,
    pub id: String,
}

impl SavedObjectReference {
    pub fn new(name: impl Into<String>, ref_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ref_type: ref_type.into(),
            id: id.into(),
        }
    }

    /// The object this edge points at.
    pub fn target(&self) -> ObjectRef {
        ObjectRef::new(self.ref_type.clone(), self.id.clone())
    }
}

/// One exportable unit.
///
/// Fields the engine does not know about (`updated_at`, `version`,
/// `migrationVersion`, ...) are carried in `extra` and written back out
/// unchanged after the known fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedObject {
    #[serde(rename = "type")]
    pub object_type: String,
    pub id: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub references: Vec<SavedObjectReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespaces: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SavedObject {
    pub fn new(object_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            id: id.into(),
            attributes: Map::new(),
            references: Vec::new(),
            namespaces: None,
            extra: Map::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn with_reference(
        mut self,
        name: impl Into<String>,
        ref_type: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        self.references
            .push(SavedObjectReference::new(name, ref_type, id));
        self
    }

    pub fn with_namespaces(mut self, namespaces: &[&str]) -> Self {
        self.namespaces = Some(namespaces.iter().map(|ns| ns.to_string()).collect());
        self
    }

    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.object_type.clone(), self.id.clone())
    }

    /// Workspaces the object is assigned to, if any.
    pub fn workspaces(&self) -> Option<Vec<&str>> {
        self.extra
            .get("workspaces")
            .and_then(Value::as_array)
            .map(|ws| ws.iter().filter_map(Value::as_str).collect())
    }
}
