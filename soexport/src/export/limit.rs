//! Export size guard.
//!
//! Consulted before any object enters the discovered set, so an oversized
//! export fails before anything is emitted instead of being truncated.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimit {
    limit: usize,
}

impl SizeLimit {
    pub fn new(limit: i64) -> Result<Self> {
        if limit <= 0 {
            return Err(Error::Validation(format!(
                "exportSizeLimit must be a positive integer, got {}",
                limit
            )));
        }
        Ok(Self {
            limit: limit as usize,
        })
    }

    pub fn get(&self) -> usize {
        self.limit
    }

    /// Page size for a filtered search: one more than the limit, so overflow
    /// shows up in the results even when the store under-reports `total`.
    pub fn search_page_size(&self) -> usize {
        self.limit.saturating_add(1)
    }

    /// Fail if a set of `total` objects would exceed the limit.
    pub fn check_total(&self, total: usize) -> Result<()> {
        if total > self.limit {
            metrics::counter!("soexport_size_limit_rejections_total").increment(1);
            tracing::debug!("Export of {} objects rejected, limit is {}", total, self.limit);
            return Err(Error::SizeLimitExceeded { limit: self.limit });
        }
        Ok(())
    }

    /// Fail if adding `incoming` objects to `current` would exceed the limit.
    pub fn check_growth(&self, current: usize, incoming: usize) -> Result<()> {
        self.check_total(current.saturating_add(incoming))
    }
}
