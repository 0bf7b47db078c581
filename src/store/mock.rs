use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, PoisonError},
};

use bson::Document as BsonDocument;
use serde::{Serialize, de::DeserializeOwned};

use super::{BatchResult, DocumentStore, IndexSpec};
use crate::{
    context::CallContext,
    document::Pagination,
    error::{Error, Result},
};

/// A store operation as the mock saw it.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Find {
        collection: String,
        fields: Vec<String>,
        query: String,
        pagination: Pagination,
    },
    CreateIndex {
        collection: String,
        spec: IndexSpec,
    },
    UpsertBatch {
        collection: String,
        documents: Vec<BsonDocument>,
    },
    Close,
}

/// Canned answer for the next `find`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindResponse {
    /// Match count reported to the caller's pagination.
    pub total: u64,
    pub documents: Vec<BsonDocument>,
}

/// Test double that records every call and replays queued results.
///
/// Each operation pops its own queue; an empty queue answers with an empty
/// success.
#[derive(Debug, Default)]
pub struct MockStore {
    calls: Mutex<Vec<Call>>,
    find: Mutex<VecDeque<Result<FindResponse>>>,
    create_index: Mutex<VecDeque<Result<()>>>,
    upsert_batch: Mutex<VecDeque<Result<BatchResult>>>,
    close: Mutex<VecDeque<Result<()>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_find(&self, response: Result<FindResponse>) -> &Self {
        lock(&self.find).push_back(response);
        self
    }

    pub fn on_create_index(&self, response: Result<()>) -> &Self {
        lock(&self.create_index).push_back(response);
        self
    }

    pub fn on_upsert_batch(&self, response: Result<BatchResult>) -> &Self {
        lock(&self.upsert_batch).push_back(response);
        self
    }

    pub fn on_close(&self, response: Result<()>) -> &Self {
        lock(&self.close).push_back(response);
        self
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        lock(&self.calls).clone()
    }

    fn record(&self, call: Call) {
        lock(&self.calls).push(call);
    }
}

impl DocumentStore for MockStore {
    async fn find<T>(
        &self,
        _ctx: &CallContext,
        collection: &str,
        fields: &[&str],
        query: &str,
        pagination: &mut Pagination,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + Sync + Unpin + 'static,
    {
        self.record(Call::Find {
            collection: collection.to_string(),
            fields: fields.iter().map(|f| (*f).to_string()).collect(),
            query: query.to_string(),
            pagination: *pagination,
        });

        let response = lock(&self.find)
            .pop_front()
            .unwrap_or_else(|| Ok(FindResponse::default()))?;
        pagination.settle(response.total);

        response
            .documents
            .into_iter()
            .map(|doc| bson::from_document(doc).map_err(Error::from))
            .collect()
    }

    async fn create_index(
        &self,
        _ctx: &CallContext,
        collection: &str,
        spec: &IndexSpec,
    ) -> Result<()> {
        self.record(Call::CreateIndex {
            collection: collection.to_string(),
            spec: spec.clone(),
        });
        lock(&self.create_index).pop_front().unwrap_or(Ok(()))
    }

    async fn upsert_batch<D>(
        &self,
        _ctx: &CallContext,
        collection: &str,
        documents: &[D],
    ) -> Result<BatchResult>
    where
        D: Serialize + Sync,
    {
        let documents = documents
            .iter()
            .map(bson::to_document)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.record(Call::UpsertBatch {
            collection: collection.to_string(),
            documents,
        });
        lock(&self.upsert_batch)
            .pop_front()
            .unwrap_or(Ok(BatchResult::default()))
    }

    async fn close(&self, _ctx: &CallContext) -> Result<()> {
        self.record(Call::Close);
        lock(&self.close).pop_front().unwrap_or(Ok(()))
    }
}
