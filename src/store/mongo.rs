use bson::{Bson, Document as BsonDocument, doc};
use futures::TryStreamExt;
use mongodb::{Client, Database, IndexModel, options::IndexOptions};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use super::{
    BatchResult,
    DocumentStore,
    ID_FIELD,
    IndexSpec,
    ensure_fields,
    ensure_query,
    prepare_batch,
    search_filter,
};
use crate::{
    config::MongoConfig,
    context::CallContext,
    document::Pagination,
    error::{Error, Result},
    verifier::Verifier,
};

/// Reply of the `update` command, reduced to what a batch reports.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateReply {
    #[serde(default)]
    n: i64,
    #[serde(default)]
    n_modified: i64,
    #[serde(default)]
    upserted: Vec<BsonDocument>,
    #[serde(default)]
    write_errors: Vec<WriteFailure>,
}

#[derive(Debug, Deserialize)]
struct WriteFailure {
    index: i64,
    code: i32,
    errmsg: String,
}

impl UpdateReply {
    fn into_result(self) -> Result<BatchResult> {
        if !self.write_errors.is_empty() {
            let detail = self
                .write_errors
                .iter()
                .map(|e| format!("#{} ({}): {}", e.index, e.code, e.errmsg))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::WriteFailed(detail));
        }

        let upserted = self.upserted.len() as u64;
        Ok(BatchResult {
            matched: as_count(self.n).saturating_sub(upserted),
            modified: as_count(self.n_modified),
            upserted,
        })
    }
}

/// Live store backed by a MongoDB database.
///
/// The driver's `Client` is a shared handle over its own connection pool,
/// so a `MongoStore` can be used from many tasks at once.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    db: Database,
}

impl MongoStore {
    /// Connect to `cfg.uri`, ping the deployment, and select `cfg.database`.
    ///
    /// Any failure aborts construction; no half-initialized store escapes.
    pub async fn connect(
        ctx: &CallContext,
        cfg: &MongoConfig,
        verifier: &Verifier,
    ) -> Result<Self> {
        verifier.check(cfg)?;

        let client = ctx
            .run(async { Ok(Client::with_uri_str(&cfg.uri).await?) })
            .await?;

        ctx.run(async {
            client
                .database("admin")
                .run_command(doc! { "ping": 1 })
                .await?;
            Ok(())
        })
        .await?;

        tracing::info!(database = %cfg.database, "connected to mongo db");
        Ok(Self::from_client(client, &cfg.database))
    }

    pub(crate) fn from_client(client: Client, database: &str) -> Self {
        let db = client.database(database);
        Self { client, db }
    }

    pub fn database_name(&self) -> &str {
        self.db.name()
    }
}

impl DocumentStore for MongoStore {
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

        let filter = search_filter(fields, query);
        let coll = self.db.collection::<T>(collection);

        ctx.run(async {
            let total = coll.count_documents(filter.clone()).await?;
            let offset = pagination.settle(total);

            tracing::debug!(
                collection,
                fields = fields.len(),
                total,
                offset,
                page = pagination.page,
                "find"
            );

            let mut find = coll.find(filter).skip(offset);
            if pagination.page_size > 0 {
                let limit =
                    i64::try_from(pagination.page_size).unwrap_or(i64::MAX);
                find = find.limit(limit);
            }

            let cursor = find.await?;
            let documents: Vec<T> = cursor.try_collect().await?;
            Ok(documents)
        })
        .await
    }

    async fn create_index(
        &self,
        ctx: &CallContext,
        collection: &str,
        spec: &IndexSpec,
    ) -> Result<()> {
        let options = IndexOptions::builder()
            .unique(spec.unique)
            .name(spec.name.clone())
            .build();
        let model = IndexModel::builder()
            .keys(spec.keys_document())
            .options(Some(options))
            .build();

        ctx.run(async {
            let created = self
                .db
                .collection::<BsonDocument>(collection)
                .create_index(model)
                .await?;
            tracing::debug!(
                collection,
                index = %created.index_name,
                "index created"
            );
            Ok(())
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
        let updates: Vec<Bson> = prepare_batch(documents)?
            .into_iter()
            .map(|(id, replacement)| {
                Bson::Document(doc! {
                    "q": { ID_FIELD: id },
                    "u": replacement,
                    "upsert": true
                })
            })
            .collect();
        let count = updates.len();

        // One unordered `update` command: every write is attempted and the
        // server reports failures per statement.
        let command = doc! {
            "update": collection,
            "updates": updates,
            "ordered": false
        };
        let reply = ctx
            .run(async { Ok(self.db.run_command(command).await?) })
            .await?;

        let reply: UpdateReply = bson::from_document(reply)?;
        let result = reply.into_result()?;
        tracing::debug!(collection, count, ?result, "upsert batch");
        Ok(result)
    }

    async fn close(&self, ctx: &CallContext) -> Result<()> {
        ctx.run(async {
            self.client.clone().shutdown().await;
            Ok(())
        })
        .await?;
        tracing::info!("mongo db connection closed");
        Ok(())
    }
}

fn as_count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or_default()
}
