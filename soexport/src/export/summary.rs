//! Export summary, the terminal line of an export.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::object::ObjectRef;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub exported_count: usize,
    pub missing_ref_count: usize,
    /// Referenced objects that could not be exported, sorted by (type, id)
    pub missing_references: Vec<ObjectRef>,
}

impl ExportSummary {
    pub fn new(exported_count: usize, missing: BTreeSet<ObjectRef>) -> Self {
        Self {
            exported_count,
            missing_ref_count: missing.len(),
            missing_references: missing.into_iter().collect(),
        }
    }
}
