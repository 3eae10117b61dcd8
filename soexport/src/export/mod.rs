//! Saved-object export engine.
//!
//! Pipeline, run once per [`Exporter::export`] call:
//!
//! ```text
//! ExportOptions ──validate──▶ ExportRequest
//!        │
//!        ▼
//!  resolve roots (find | bulk_get) ──▶ DiscoveredSet
//!        │
//!        ▼
//!  expand references (objects mode + includeReferencesDeep)
//!        │
//!        ▼
//!  dependency order ──▶ redact per object ──▶ ExportStream (+ summary)
//! ```
//!
//! Every failure (validation, size limit, store) happens before the stream is
//! returned; a returned stream always yields the complete export.

mod discovered;
mod expand;
mod limit;
mod options;
mod order;
mod redact;
mod resolve;
mod stream;
mod summary;

pub use discovered::DiscoveredSet;
pub use expand::ExpansionStats;
pub use limit::SizeLimit;
pub use options::{ExportCriterion, ExportOptions, ExportRequest};
pub use redact::Redactor;
pub use stream::{write_ndjson, ExportLine, ExportStream, WriteReport};
pub use summary::ExportSummary;

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::object::ObjectRef;
use crate::store::SavedObjectsStore;

/// Runs exports against one store.
///
/// Holds no per-export state; concurrent exports through the same
/// `Exporter` each build their own discovered set.
pub struct Exporter {
    store: Arc<dyn SavedObjectsStore>,
    redactor: Redactor,
    batch_size: usize,
}

impl Exporter {
    pub fn new(store: Arc<dyn SavedObjectsStore>) -> Self {
        Self {
            store,
            redactor: Redactor::default(),
            batch_size: 0,
        }
    }

    pub fn from_config(store: Arc<dyn SavedObjectsStore>, config: &Config) -> Self {
        Self {
            store,
            redactor: Redactor::new(&config.redaction),
            batch_size: config.export.batch_size,
        }
    }

    /// Identities per bulk-get request (0 = unchunked).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Validate `options` and run the export.
    #[tracing::instrument(skip_all, fields(store = %self.store.name()))]
    pub async fn export(&self, options: ExportOptions) -> Result<ExportStream> {
        let request = options.validate()?;
        self.export_request(request).await
    }

    /// Run an already validated export.
    pub async fn export_request(&self, request: ExportRequest) -> Result<ExportStream> {
        let store = self.store.as_ref();
        let limit = request.size_limit;

        let mut set =
            resolve::resolve_roots(store, &request.criterion, limit, self.batch_size).await?;

        if let ExportCriterion::Objects {
            include_references_deep: true,
            ..
        } = &request.criterion
        {
            let options = request.criterion.bulk_get_options();
            let stats =
                expand::expand_references(store, &mut set, limit, &options, self.batch_size)
                    .await?;
            tracing::debug!(
                "Reference expansion took {} rounds, added {} objects, {} unresolvable",
                stats.rounds,
                stats.fetched,
                stats.unresolvable.len()
            );
        }

        let missing: BTreeSet<ObjectRef> = set
            .unresolved_references(&BTreeSet::new())
            .into_iter()
            .collect();
        if !missing.is_empty() {
            metrics::counter!("soexport_missing_references_total")
                .increment(missing.len() as u64);
        }

        let exported_count = set.len();
        tracing::info!(
            "Exporting {} objects ({} missing references)",
            exported_count,
            missing.len()
        );
        metrics::counter!("soexport_exports_total", "mode" => request.criterion.mode())
            .increment(1);

        let objects = order::sort_objects(set);
        let summary = (!request.exclude_export_details)
            .then(|| ExportSummary::new(exported_count, missing));

        Ok(stream::emit(objects, self.redactor.clone(), summary))
    }
}
