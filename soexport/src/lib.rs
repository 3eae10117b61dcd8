//! soexport: dependency-ordered export of saved objects.
//!
//! Given a selection (explicit ids, or types plus a search filter) the engine
//! fetches the matching saved objects, follows their references until the set
//! is self-contained, orders it so every reference precedes its referrer,
//! redacts credentials and streams the result followed by an export summary.

pub mod config;
pub mod error;
pub mod export;
pub mod object;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use export::{ExportLine, ExportOptions, ExportStream, ExportSummary, Exporter};
pub use object::{ObjectRef, SavedObject, SavedObjectReference};
pub use store::{MemoryStore, RemoteStore, SavedObjectsStore, StoreError};
