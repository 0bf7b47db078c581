//! Document store capability and its implementations.
//!
//! [`DocumentStore`] is the seam the rest of the crate talks to.
//! [`MongoStore`] is the live client, [`MemoryStore`] evaluates the same
//! contract in process, and [`MockStore`] records calls for tests.

pub mod memory;
pub mod mock;
pub mod mongo;

use std::future::Future;

use bson::{Bson, Document as BsonDocument, doc};
use serde::{Serialize, de::DeserializeOwned};

pub use memory::MemoryStore;
pub use mock::{Call, FindResponse, MockStore};
pub use mongo::MongoStore;

use crate::{
    context::CallContext,
    document::Pagination,
    error::{Error, Result},
};

/// Name of the identity field every upserted document must carry.
pub const ID_FIELD: &str = "id";

/// Aggregate counts reported by a batch upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub matched: u64,
    pub modified: u64,
    pub upserted: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexDirection {
    Ascending,
    Descending,
}

impl IndexDirection {
    fn as_i32(self) -> i32 {
        match self {
            Self::Ascending => 1,
            Self::Descending => -1,
        }
    }
}

/// Ordered key specification plus options for a secondary index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSpec {
    pub keys: Vec<(String, IndexDirection)>,
    pub unique: Option<bool>,
    pub name: Option<String>,
}

impl IndexSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(
        mut self,
        field: impl Into<String>,
        dir: IndexDirection,
    ) -> Self {
        self.keys.push((field.into(), dir));
        self
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = Some(unique);
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn keys_document(&self) -> BsonDocument {
        let mut keys = BsonDocument::new();
        for (field, dir) in &self.keys {
            keys.insert(field.as_str(), dir.as_i32());
        }
        keys
    }

    /// The explicit name, or the one MongoDB derives from the keys
    /// (`title_1_keywords_-1`).
    pub fn resolved_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        self.keys
            .iter()
            .map(|(field, dir)| format!("{field}_{}", dir.as_i32()))
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// Paginated text search and batch maintenance over named collections.
pub trait DocumentStore: Send + Sync {
    /// Match `query` as a case-insensitive regex against any of `fields`.
    ///
    /// `pagination.total_documents` receives the match count, and
    /// `pagination.page` folds back to 1 when the requested window starts
    /// past the last match.
    fn find<T>(
        &self,
        ctx: &CallContext,
        collection: &str,
        fields: &[&str],
        query: &str,
        pagination: &mut Pagination,
    ) -> impl Future<Output = Result<Vec<T>>> + Send
    where
        T: DeserializeOwned + Send + Sync + Unpin + 'static;

    fn create_index(
        &self,
        ctx: &CallContext,
        collection: &str,
        spec: &IndexSpec,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Replace-or-insert every document by its `id`, as one unordered batch.
    fn upsert_batch<D>(
        &self,
        ctx: &CallContext,
        collection: &str,
        documents: &[D],
    ) -> impl Future<Output = Result<BatchResult>> + Send
    where
        D: Serialize + Sync;

    fn close(
        &self,
        ctx: &CallContext,
    ) -> impl Future<Output = Result<()>> + Send;
}

pub(crate) fn ensure_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(Error::QueryEmpty);
    }
    Ok(())
}

pub(crate) fn ensure_fields(fields: &[&str]) -> Result<()> {
    if fields.is_empty() {
        return Err(Error::FieldsEmpty);
    }
    Ok(())
}

/// `{"$or": [{field: {"$regex": query, "$options": "i"}}, ...]}`.
///
/// The query is used as a pattern verbatim; metacharacters are live.
pub(crate) fn search_filter(fields: &[&str], query: &str) -> BsonDocument {
    let predicates: Vec<Bson> = fields
        .iter()
        .map(|field| {
            let mut predicate = BsonDocument::new();
            predicate
                .insert(*field, doc! { "$regex": query, "$options": "i" });
            Bson::Document(predicate)
        })
        .collect();
    doc! { "$or": predicates }
}

/// Serialize every document and pull out its `id`.
///
/// Fails on the first document without one, before anything is written.
pub(crate) fn prepare_batch<D: Serialize>(
    documents: &[D],
) -> Result<Vec<(Bson, BsonDocument)>> {
    if documents.is_empty() {
        return Err(Error::EmptyBatch);
    }

    documents
        .iter()
        .map(|doc| {
            let doc = bson::to_document(doc)?;
            let id = doc
                .get(ID_FIELD)
                .cloned()
                .ok_or(Error::DocumentMissingId)?;
            Ok((id, doc))
        })
        .collect()
}
