use std::collections::HashMap;

use bson::{Bson, Document as BsonDocument};
use regex::{Regex, RegexBuilder};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;

use super::{
    BatchResult,
    DocumentStore,
    ID_FIELD,
    IndexSpec,
    ensure_fields,
    ensure_query,
    prepare_batch,
};
use crate::{
    context::CallContext,
    document::Pagination,
    error::{Error, Result},
};

/// In-process store honoring the same search and upsert contract as
/// [`MongoStore`](super::MongoStore).
///
/// Documents keep insertion order, which is the order searches return.
/// Patterns use the `regex` crate's syntax, which has no backreferences or
/// lookaround.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    collections: HashMap<String, Vec<BsonDocument>>,
    indexes: HashMap<String, Vec<IndexSpec>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a collection in natural order.
    pub async fn documents(&self, collection: &str) -> Vec<BsonDocument> {
        let state = self.state.read().await;
        state.collections.get(collection).cloned().unwrap_or_default()
    }

    pub async fn indexes(&self, collection: &str) -> Vec<IndexSpec> {
        let state = self.state.read().await;
        state.indexes.get(collection).cloned().unwrap_or_default()
    }
}

fn compile(query: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(query).case_insensitive(true).build()?)
}

/// A string field matches directly; an array matches through any string
/// element. Other types never match a regex.
fn field_matches(value: Option<&Bson>, pattern: &Regex) -> bool {
    match value {
        Some(Bson::String(s)) => pattern.is_match(s),
        Some(Bson::Array(items)) => items.iter().any(|item| {
            matches!(item, Bson::String(s) if pattern.is_match(s))
        }),
        _ => false,
    }
}

fn same_id(a: &Bson, b: &Bson) -> bool {
    let numeric = |v: &Bson| match v {
        Bson::Int32(n) => Some(i64::from(*n)),
        Bson::Int64(n) => Some(*n),
        _ => None,
    };
    match (numeric(a), numeric(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

impl DocumentStore for MemoryStore {
    async fn find<T>(
        &self,
        ctx: &CallContext,
        collection: &str,
        fields: &[&str],
        query: &str,
        pagination: &mut Pagination,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send + Sync + Unpin + 'static,
    {
        ensure_query(query)?;
        ensure_fields(fields)?;
        let pattern = compile(query)?;

        ctx.run(async {
            let state = self.state.read().await;
            let matched: Vec<&BsonDocument> = state
                .collections
                .get(collection)
                .map(|docs| {
                    docs.iter()
                        .filter(|doc| {
                            fields.iter().any(|field| {
                                field_matches(doc.get(*field), &pattern)
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();

            let total = matched.len() as u64;
            let offset = pagination.settle(total);
            let skip = usize::try_from(offset).unwrap_or(usize::MAX);
            let take = match pagination.page_size {
                0 => usize::MAX,
                n => usize::try_from(n).unwrap_or(usize::MAX),
            };

            tracing::debug!(collection, total, offset, "memory find");

            matched
                .into_iter()
                .skip(skip)
                .take(take)
                .map(|doc| {
                    bson::from_document(doc.clone()).map_err(Error::from)
                })
                .collect::<Result<Vec<T>>>()
        })
        .await
    }

    async fn create_index(
        &self,
        ctx: &CallContext,
        collection: &str,
        spec: &IndexSpec,
    ) -> Result<()> {
        ctx.run(async {
            let mut state = self.state.write().await;
            let indexes =
                state.indexes.entry(collection.to_string()).or_default();
            let name = spec.resolved_name();

            let clashes = indexes
                .iter()
                .find(|idx| idx.resolved_name() == name)
                .map(|existing| existing.keys != spec.keys);

            match clashes {
                Some(true) => Err(Error::IndexConflict(name)),
                Some(false) => Ok(()),
                None => {
                    indexes.push(spec.clone());
                    Ok(())
                }
            }
        })
        .await
    }

    async fn upsert_batch<D>(
        &self,
        ctx: &CallContext,
        collection: &str,
        documents: &[D],
    ) -> Result<BatchResult>
    where
        D: Serialize + Sync,
    {
        let prepared = prepare_batch(documents)?;

        ctx.run(async {
            let mut state = self.state.write().await;
            let docs =
                state.collections.entry(collection.to_string()).or_default();
            let mut result = BatchResult::default();

            for (id, replacement) in prepared {
                let existing = docs.iter_mut().find(|doc| {
                    doc.get(ID_FIELD).is_some_and(|v| same_id(v, &id))
                });
                match existing {
                    Some(doc) => {
                        result.matched += 1;
                        if *doc != replacement {
                            result.modified += 1;
                            *doc = replacement;
                        }
                    }
                    None => {
                        result.upserted += 1;
                        docs.push(replacement);
                    }
                }
            }

            tracing::debug!(collection, ?result, "memory upsert batch");
            Ok(result)
        })
        .await
    }

    async fn close(&self, _ctx: &CallContext) -> Result<()> {
        Ok(())
    }
}
