//! Breadth-first reference expansion.
//!
//! Each round fetches every reference target not yet in the discovered set,
//! in one (possibly chunked) batch get. Targets the store does not return are
//! marked unresolvable and never requested again, so every identity is asked
//! for at most once and the loop ends after as many rounds as the reference
//! graph is deep.

use std::collections::{BTreeSet, HashSet};

use super::discovered::DiscoveredSet;
use super::limit::SizeLimit;
use super::resolve::bulk_get_batched;
use crate::error::Result;
use crate::object::ObjectRef;
use crate::store::{BulkGetOptions, SavedObjectsStore};

/// What an expansion did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExpansionStats {
    /// Batch-get rounds issued
    pub rounds: usize,
    /// Objects added to the set
    pub fetched: usize,
    /// Targets the store could not return
    pub unresolvable: BTreeSet<ObjectRef>,
}

/// Grow `set` until it is closed under references.
///
/// Fails with `SizeLimitExceeded` as soon as a round would push the set over
/// `limit`; nothing from that round is inserted.
pub(crate) async fn expand_references<S: SavedObjectsStore + ?Sized>(
    store: &S,
    set: &mut DiscoveredSet,
    limit: SizeLimit,
    options: &BulkGetOptions,
    batch_size: usize,
) -> Result<ExpansionStats> {
    let mut stats = ExpansionStats::default();

    loop {
        let frontier = set.unresolved_references(&stats.unresolvable);
        if frontier.is_empty() {
            break;
        }
        stats.rounds += 1;
        tracing::debug!(
            "Expansion round {}: fetching {} referenced objects",
            stats.rounds,
            frontier.len()
        );

        let fetched = bulk_get_batched(store, &frontier, options, batch_size).await?;

        let mut returned = HashSet::new();
        let mut incoming = Vec::with_capacity(fetched.len());
        for obj in fetched {
            let key = obj.object_ref();
            if set.contains(&key) || !returned.insert(key) {
                continue;
            }
            incoming.push(obj);
        }

        limit.check_growth(set.len(), incoming.len())?;

        for target in frontier {
            if !returned.contains(&target) {
                tracing::warn!("Referenced object {} not found", target);
                stats.unresolvable.insert(target);
            }
        }

        stats.fetched += incoming.len();
        for obj in incoming {
            set.insert(obj);
        }
    }

    Ok(stats)
}
