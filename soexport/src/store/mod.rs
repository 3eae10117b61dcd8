//! Saved-objects store collaborators.
//!
//! The export engine talks to its backing store only through
//! [`SavedObjectsStore`]: one filtered search and a batch get by identifier.
//! Implementations:
//!
//! - [`MemoryStore`]: in-process store, optionally loaded from an NDJSON file
//! - [`RemoteStore`]: HTTP client for a remote dashboards saved-objects API

mod error;
pub mod memory;
pub mod remote;
mod sigv4;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use remote::RemoteStore;

use async_trait::async_trait;

use crate::object::{ObjectRef, SavedObject};

/// Parameters of a filtered search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// Object types to include
    pub types: Vec<String>,
    /// Free-text search over object attributes
    pub search: Option<String>,
    /// Restrict to these namespaces
    pub namespaces: Option<Vec<String>>,
    /// Maximum number of objects to return
    pub per_page: usize,
}

/// Result of a filtered search.
#[derive(Debug, Clone, Default)]
pub struct FindResponse {
    /// Number of matching objects, which may exceed `saved_objects.len()`
    pub total: usize,
    pub saved_objects: Vec<SavedObject>,
}

/// Scoping for a batch get.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkGetOptions {
    pub namespace: Option<String>,
    pub workspaces: Option<Vec<String>>,
}

/// Result of a batch get. Objects that were not found are simply absent.
#[derive(Debug, Clone, Default)]
pub struct BulkGetResponse {
    pub saved_objects: Vec<SavedObject>,
}

/// Read-only access to a saved-objects store.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; concurrent exports share one store.
#[async_trait]
pub trait SavedObjectsStore: Send + Sync {
    /// Search objects of the given types.
    async fn find(&self, options: &FindOptions) -> Result<FindResponse>;

    /// Fetch objects by identity. Missing objects are omitted from the response.
    async fn bulk_get(
        &self,
        objects: &[ObjectRef],
        options: &BulkGetOptions,
    ) -> Result<BulkGetResponse>;

    /// Human-readable store name for logs.
    fn name(&self) -> &str;
}
