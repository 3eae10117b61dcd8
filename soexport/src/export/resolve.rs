//! Root object resolution.
//!
//! Turns an [`ExportCriterion`] into the initial discovered set, either with
//! one filtered search (query mode) or a batch get by identity (objects mode).

use std::collections::HashSet;

use super::discovered::DiscoveredSet;
use super::limit::SizeLimit;
use super::options::ExportCriterion;
use crate::error::{Error, Result};
use crate::object::{ObjectRef, SavedObject};
use crate::store::{BulkGetOptions, FindOptions, SavedObjectsStore};

/// Batch get split into sequential chunks of `batch_size` (0 = one request).
///
/// Chunks are awaited one after another; the store never sees concurrent
/// requests from a single export.
pub(crate) async fn bulk_get_batched<S: SavedObjectsStore + ?Sized>(
    store: &S,
    objects: &[ObjectRef],
    options: &BulkGetOptions,
    batch_size: usize,
) -> Result<Vec<SavedObject>> {
    if objects.is_empty() {
        return Ok(Vec::new());
    }
    let chunk_size = if batch_size == 0 {
        objects.len()
    } else {
        batch_size
    };

    let mut fetched = Vec::with_capacity(objects.len());
    for chunk in objects.chunks(chunk_size) {
        metrics::counter!("soexport_store_requests_total", "op" => "bulk_get").increment(1);
        tracing::debug!("bulk_get of {} objects from {}", chunk.len(), store.name());
        let response = store.bulk_get(chunk, options).await?;
        fetched.extend(response.saved_objects);
    }
    Ok(fetched)
}

/// Fetch the root objects selected by `criterion`.
pub(crate) async fn resolve_roots<S: SavedObjectsStore + ?Sized>(
    store: &S,
    criterion: &ExportCriterion,
    limit: SizeLimit,
    batch_size: usize,
) -> Result<DiscoveredSet> {
    match criterion {
        ExportCriterion::Query {
            types,
            search,
            namespace,
        } => {
            let options = FindOptions {
                types: types.clone(),
                search: search.clone(),
                namespaces: namespace.as_ref().map(|ns| vec![ns.clone()]),
                per_page: limit.search_page_size(),
            };
            metrics::counter!("soexport_store_requests_total", "op" => "find").increment(1);
            let response = store.find(&options).await?;
            tracing::debug!(
                "find over {:?} returned {} of {} objects",
                types,
                response.saved_objects.len(),
                response.total
            );
            limit.check_total(response.total.max(response.saved_objects.len()))?;

            let mut set = DiscoveredSet::new();
            for mut obj in response.saved_objects {
                // Search relevance is not part of the exported object.
                obj.extra.remove("score");
                set.insert(obj);
            }
            Ok(set)
        }
        ExportCriterion::Objects { objects, .. } => {
            limit.check_total(objects.len())?;

            let options = criterion.bulk_get_options();
            let fetched = bulk_get_batched(store, objects, &options, batch_size).await?;

            let mut set = DiscoveredSet::new();
            for obj in fetched {
                set.insert(obj);
            }

            let mut missing: Vec<ObjectRef> = objects
                .iter()
                .filter(|o| !set.contains(o))
                .cloned()
                .collect::<HashSet<_>>()
                .into_iter()
                .collect();
            if !missing.is_empty() {
                missing.sort();
                return Err(Error::ObjectsNotFound(missing));
            }
            Ok(set)
        }
    }
}
