use thiserror::Error;

use crate::object::ObjectRef;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("Can't export more than {limit} objects")]
    SizeLimitExceeded { limit: usize },

    #[error("Error fetching objects to export: {} not found", format_refs(.0))]
    ObjectsNotFound(Vec<ObjectRef>),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

fn format_refs(refs: &[ObjectRef]) -> String {
    refs.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Errors caused by the request itself rather than by the store.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::SizeLimitExceeded { .. } | Error::ObjectsNotFound(_)
        )
    }
}
