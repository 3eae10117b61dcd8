//! Export request options and their validation.
//!
//! [`ExportOptions`] mirrors the loosely-typed request body callers send.
//! [`ExportOptions::validate`] checks it without touching the store and turns
//! it into an [`ExportRequest`] holding exactly one [`ExportCriterion`].

use serde::Deserialize;
use std::collections::HashSet;

use super::limit::SizeLimit;
use crate::error::{Error, Result};
use crate::object::ObjectRef;
use crate::store::BulkGetOptions;

/// Raw export request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    #[serde(default, rename = "type")]
    pub types: Option<Vec<String>>,
    #[serde(default)]
    pub objects: Option<Vec<ObjectRef>>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub include_references_deep: bool,
    #[serde(default)]
    pub workspaces: Option<Vec<String>>,
    #[serde(default)]
    pub exclude_export_details: bool,
    /// Signed so that non-positive values can be rejected with a clear message.
    #[serde(default)]
    pub export_size_limit: Option<i64>,
}

/// What to export.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportCriterion {
    /// Every object of `types` matching the optional search and namespace.
    Query {
        types: Vec<String>,
        search: Option<String>,
        namespace: Option<String>,
    },
    /// Exactly these objects, optionally with everything they reference.
    Objects {
        objects: Vec<ObjectRef>,
        include_references_deep: bool,
        namespace: Option<String>,
        workspaces: Option<Vec<String>>,
    },
}

impl ExportCriterion {
    pub fn mode(&self) -> &'static str {
        match self {
            ExportCriterion::Query { .. } => "query",
            ExportCriterion::Objects { .. } => "objects",
        }
    }

    /// Scope of every batch get issued for this criterion, roots and
    /// references alike. Query mode issues none and gets the default.
    pub(crate) fn bulk_get_options(&self) -> BulkGetOptions {
        match self {
            ExportCriterion::Query { .. } => BulkGetOptions::default(),
            ExportCriterion::Objects {
                namespace,
                workspaces,
                ..
            } => BulkGetOptions {
                namespace: namespace.clone(),
                workspaces: workspaces.clone(),
            },
        }
    }
}

/// A validated export request.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub criterion: ExportCriterion,
    pub size_limit: SizeLimit,
    pub exclude_export_details: bool,
}

/// Deduplicate preserving first occurrence.
fn dedup<T: Clone + Eq + std::hash::Hash>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

impl ExportOptions {
    pub fn for_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: Some(types.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn for_objects(objects: impl IntoIterator<Item = ObjectRef>) -> Self {
        Self {
            objects: Some(objects.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn with_size_limit(mut self, limit: i64) -> Self {
        self.export_size_limit = Some(limit);
        self
    }

    /// Check option combinations. Performs no I/O.
    pub fn validate(self) -> Result<ExportRequest> {
        let criterion = match (self.objects, self.types) {
            (None, None) => {
                return Err(Error::Validation(
                    "Either `type` or `objects` are required.".to_string(),
                ))
            }
            (Some(_), _) if self.search.is_some() => {
                return Err(Error::Validation(
                    "Can't specify both \"search\" and \"objects\" properties when exporting"
                        .to_string(),
                ))
            }
            (Some(objects), types) => {
                if types.is_some() {
                    tracing::debug!("Both `type` and `objects` given, exporting by objects");
                }
                ExportCriterion::Objects {
                    objects: dedup(objects),
                    include_references_deep: self.include_references_deep,
                    namespace: self.namespace,
                    workspaces: self.workspaces,
                }
            }
            (None, Some(types)) => ExportCriterion::Query {
                types: dedup(types),
                search: self.search,
                namespace: self.namespace,
            },
        };

        let size_limit = match self.export_size_limit {
            Some(limit) => SizeLimit::new(limit)?,
            None => {
                return Err(Error::Validation(
                    "exportSizeLimit must be a positive integer".to_string(),
                ))
            }
        };

        Ok(ExportRequest {
            criterion,
            size_limit,
            exclude_export_details: self.exclude_export_details,
        })
    }
}
