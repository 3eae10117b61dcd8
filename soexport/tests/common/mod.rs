//! Shared test helpers: a store wrapper that records every call.

#![allow(dead_code)]

use async_trait::async_trait;
use futures::StreamExt;
use parking_lot::Mutex;
use soexport::store::{
    BulkGetOptions, BulkGetResponse, FindOptions, FindResponse, Result as StoreResult,
};
use soexport::{ExportLine, ExportStream, MemoryStore, ObjectRef, SavedObjectsStore, StoreError};
use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Find(FindOptions),
    BulkGet(Vec<ObjectRef>, BulkGetOptions),
}

/// Wraps a [`MemoryStore`], recording calls and optionally scripting responses.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStore,
    calls: Mutex<Vec<StoreCall>>,
    find_responses: Mutex<VecDeque<FindResponse>>,
    fail_bulk_get_after: Mutex<Option<usize>>,
}

impl RecordingStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    /// Return `response` from the next `find` instead of querying the inner store.
    pub fn push_find_response(&self, response: FindResponse) {
        self.find_responses.lock().push_back(response);
    }

    /// Let `n` bulk gets succeed, then fail every following one.
    pub fn fail_bulk_get_after(&self, n: usize) {
        *self.fail_bulk_get_after.lock() = Some(n);
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    pub fn bulk_get_calls(&self) -> Vec<Vec<ObjectRef>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                StoreCall::BulkGet(refs, _) => Some(refs),
                StoreCall::Find(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl SavedObjectsStore for RecordingStore {
    async fn find(&self, options: &FindOptions) -> StoreResult<FindResponse> {
        self.calls.lock().push(StoreCall::Find(options.clone()));
        let scripted = self.find_responses.lock().pop_front();
        match scripted {
            Some(response) => Ok(response),
            None => self.inner.find(options).await,
        }
    }

    async fn bulk_get(
        &self,
        objects: &[ObjectRef],
        options: &BulkGetOptions,
    ) -> StoreResult<BulkGetResponse> {
        let call_index = {
            let mut calls = self.calls.lock();
            calls.push(StoreCall::BulkGet(objects.to_vec(), options.clone()));
            calls
                .iter()
                .filter(|c| matches!(c, StoreCall::BulkGet(..)))
                .count()
        };
        let fail_after = *self.fail_bulk_get_after.lock();
        if let Some(n) = fail_after {
            if call_index > n {
                return Err(StoreError::Unavailable("store went away".to_string()));
            }
        }
        self.inner.bulk_get(objects, options).await
    }

    fn name(&self) -> &str {
        "recording"
    }
}

pub async fn collect(stream: ExportStream) -> Vec<ExportLine> {
    stream.collect().await
}

/// Serialize each line as the NDJSON writer would.
pub fn as_json(lines: &[ExportLine]) -> Vec<serde_json::Value> {
    lines
        .iter()
        .map(|l| serde_json::to_value(l).unwrap())
        .collect()
}
